use std::sync::{Arc, Mutex};

use peerchain_messages::TransactionMessage;
use peerchain_network::{ConnectionId, TransactionObserver};

/// Records every transaction it is shown. Clones share the record.
#[derive(Clone, Default)]
pub struct NullObserver {
    seen: Arc<Mutex<Vec<(ConnectionId, TransactionMessage)>>>,
}

impl NullObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> Vec<(ConnectionId, TransactionMessage)> {
        self.seen.lock().unwrap().clone()
    }
}

impl TransactionObserver for NullObserver {
    fn on_transaction(&self, from: ConnectionId, transaction: &TransactionMessage) {
        self.seen.lock().unwrap().push((from, transaction.clone()));
    }
}
