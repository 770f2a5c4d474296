use thiserror::Error;

use crate::ConnectionId;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("peer {0} not found")]
    PeerNotFound(ConnectionId),

    #[error("peer {0} is not connected")]
    NotConnected(ConnectionId),

    #[error("invalid peer address: {0}")]
    InvalidAddress(String),
}
