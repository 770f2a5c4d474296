//! The seam between the network core and byte-level connections.

use std::fmt;
use std::net::SocketAddr;

use peerchain_messages::{Message, VersionMessage};

/// Handle identifying one connection for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that happened on a connection, delivered to the single owner.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    /// Handshake finished; the peer announced `version`.
    Connected { id: ConnectionId, version: VersionMessage },
    /// Dial, handshake or session failed, or the peer went away.
    Disconnected { id: ConnectionId, error: Option<String> },
    MessageReceived { id: ConnectionId, message: Message },
}

impl TransportEvent {
    pub fn id(&self) -> ConnectionId {
        match self {
            Self::Connected { id, .. }
            | Self::Disconnected { id, .. }
            | Self::MessageReceived { id, .. } => *id,
        }
    }
}

/// Connection transport consumed by the pool.
///
/// None of these calls block on the network or fail: errors surface later
/// as [`TransportEvent::Disconnected`].
pub trait Transport {
    /// Start dialing `addr` and performing the handshake with `version`.
    fn connect(&self, addr: SocketAddr, version: &VersionMessage) -> ConnectionId;

    fn send(&self, id: ConnectionId, message: Message);

    /// Close the connection. Unknown ids are ignored.
    fn disconnect(&self, id: ConnectionId);
}
