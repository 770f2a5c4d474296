//! Nullable transport: records connects, sends and disconnects.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use peerchain_messages::{Message, VersionMessage};
use peerchain_network::{ConnectionId, Transport};

#[derive(Default)]
struct Inner {
    next_id: u64,
    connects: Vec<(ConnectionId, SocketAddr, VersionMessage)>,
    sent: Vec<(ConnectionId, Message)>,
    disconnects: Vec<ConnectionId>,
}

/// A transport that never opens a socket.
///
/// Clones share state, so a test can keep one handle after giving another
/// to the pool.
#[derive(Clone, Default)]
pub struct NullTransport {
    inner: Arc<Mutex<Inner>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Every dial, in order.
    pub fn connects(&self) -> Vec<(ConnectionId, SocketAddr, VersionMessage)> {
        self.lock().connects.clone()
    }

    pub fn sent(&self) -> Vec<(ConnectionId, Message)> {
        self.lock().sent.clone()
    }

    /// Messages sent to one connection.
    pub fn sent_to(&self, id: ConnectionId) -> Vec<Message> {
        self.lock()
            .sent
            .iter()
            .filter(|(to, _)| *to == id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Drain the send log.
    pub fn take_sent(&self) -> Vec<(ConnectionId, Message)> {
        std::mem::take(&mut self.lock().sent)
    }

    pub fn disconnects(&self) -> Vec<ConnectionId> {
        self.lock().disconnects.clone()
    }

    /// Clear all logs. Ids keep counting.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.connects.clear();
        inner.sent.clear();
        inner.disconnects.clear();
    }
}

impl Transport for NullTransport {
    fn connect(&self, addr: SocketAddr, version: &VersionMessage) -> ConnectionId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = ConnectionId::new(inner.next_id);
        inner.connects.push((id, addr, version.clone()));
        id
    }

    fn send(&self, id: ConnectionId, message: Message) {
        self.lock().sent.push((id, message));
    }

    fn disconnect(&self, id: ConnectionId) {
        self.lock().disconnects.push(id);
    }
}
