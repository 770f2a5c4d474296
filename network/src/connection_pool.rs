//! Ownership and lifecycle tracking of peer connections.

use std::net::SocketAddr;

use peerchain_messages::{Message, PeerAddress, VersionMessage};
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::{ConnectionId, NetworkError, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    NotConnected,
    Connecting,
    Connected,
}

/// A connection owned by the pool.
#[derive(Clone, Debug)]
pub struct PeerConnection {
    pub id: ConnectionId,
    pub address: SocketAddr,
    pub state: ConnectionState,
    /// The peer's `Version`, known once the handshake completes.
    pub version: Option<VersionMessage>,
}

/// The set of connections plus the transport used to drive them.
///
/// Peer counts are expected in the tens, so lookups are linear scans.
pub struct ConnectionPool<T: Transport> {
    transport: T,
    connections: Vec<PeerConnection>,
}

impl<T: Transport> ConnectionPool<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            connections: Vec::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start connecting to `address`. Returns at once; the handshake
    /// completes later as a transport event.
    pub fn connect(&mut self, address: SocketAddr, handshake: &VersionMessage) -> ConnectionId {
        let mut version = handshake.clone();
        version.receiver = PeerAddress::from(address);
        let id = self.transport.connect(address, &version);
        debug!(peer = %id, %address, "connecting");
        self.connections.push(PeerConnection {
            id,
            address,
            state: ConnectionState::Connecting,
            version: None,
        });
        id
    }

    pub fn get(&self, id: ConnectionId) -> Option<&PeerConnection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn with_state(&self, state: ConnectionState) -> Vec<&PeerConnection> {
        self.connections.iter().filter(|c| c.state == state).collect()
    }

    pub fn connected(&self) -> Vec<&PeerConnection> {
        self.with_state(ConnectionState::Connected)
    }

    pub fn connected_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|c| c.state == ConnectionState::Connected)
            .count()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Record a completed handshake. Only a `Connecting` connection can
    /// become `Connected`.
    pub fn mark_connected(
        &mut self,
        id: ConnectionId,
        version: VersionMessage,
    ) -> Result<(), NetworkError> {
        let conn = self
            .connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(NetworkError::PeerNotFound(id))?;
        if conn.state != ConnectionState::Connecting {
            return Err(NetworkError::NotConnected(id));
        }
        conn.state = ConnectionState::Connected;
        conn.version = Some(version);
        Ok(())
    }

    /// Close a connection through the transport and mark it `NotConnected`.
    /// The entry stays until [`prune_disconnected`](Self::prune_disconnected)
    /// or [`remove`](Self::remove).
    pub fn disconnect(&mut self, id: ConnectionId) {
        let Some(conn) = self.connections.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if conn.state == ConnectionState::NotConnected {
            return;
        }
        conn.state = ConnectionState::NotConnected;
        self.transport.disconnect(id);
        debug!(peer = %id, "disconnected");
    }

    pub fn disconnect_all(&mut self) {
        let ids: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|c| c.state != ConnectionState::NotConnected)
            .map(|c| c.id)
            .collect();
        for id in ids {
            self.disconnect(id);
        }
    }

    /// Drop ownership of a connection. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: ConnectionId) -> Option<PeerConnection> {
        let index = self.connections.iter().position(|c| c.id == id)?;
        Some(self.connections.remove(index))
    }

    /// Remove every `NotConnected` entry, returning their ids.
    pub fn prune_disconnected(&mut self) -> Vec<ConnectionId> {
        let mut pruned = Vec::new();
        self.connections.retain(|c| {
            let dead = c.state == ConnectionState::NotConnected;
            if dead {
                pruned.push(c.id);
            }
            !dead
        });
        pruned
    }

    /// Send to one connected peer.
    pub fn send(&self, id: ConnectionId, message: Message) -> Result<(), NetworkError> {
        let conn = self.get(id).ok_or(NetworkError::PeerNotFound(id))?;
        if conn.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected(id));
        }
        trace!(peer = %id, kind = message.kind(), "send");
        self.transport.send(id, message);
        Ok(())
    }

    /// Send `message` to every connected peer except `excluding`. Returns the
    /// number of peers it was handed to.
    pub fn broadcast(&self, message: &Message, excluding: Option<ConnectionId>) -> usize {
        let mut sent = 0;
        for conn in self
            .connections
            .iter()
            .filter(|c| c.state == ConnectionState::Connected && Some(c.id) != excluding)
        {
            self.transport.send(conn.id, message.clone());
            sent += 1;
        }
        trace!(kind = message.kind(), sent, "broadcast");
        sent
    }

    /// A connected peer chosen uniformly at random.
    pub fn random_connected(&self) -> Option<ConnectionId> {
        let connected = self.connected();
        connected.choose(&mut rand::thread_rng()).map(|c| c.id)
    }
}
