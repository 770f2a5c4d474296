use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(#[from] peerchain_network::NetworkError),
}
