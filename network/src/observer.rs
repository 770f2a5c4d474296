use peerchain_messages::TransactionMessage;

use crate::ConnectionId;

/// Receives every transaction a peer sends. The core does nothing else with them.
pub trait TransactionObserver {
    fn on_transaction(&self, from: ConnectionId, transaction: &TransactionMessage);
}
