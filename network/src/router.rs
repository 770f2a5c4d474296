//! Inbound message dispatch.

use peerchain_messages::{Message, MAX_ADDR_PER_MESSAGE};
use peerchain_store::ChainStore;
use tracing::{debug, trace, warn};

use crate::{ConnectionId, PeerNetwork, Transport};

impl<S: ChainStore, T: Transport> PeerNetwork<S, T> {
    /// Hand `message` to its handler. The returned message, if any, goes
    /// back to `from` only; relays are sent by the handlers themselves.
    pub fn route(&mut self, from: ConnectionId, message: Message) -> Option<Message> {
        trace!(peer = %from, kind = message.kind(), "received");
        match message {
            Message::Ping(nonce) => Some(Message::Pong(nonce)),
            Message::Pong(nonce) => {
                self.liveness.on_pong(nonce);
                None
            }
            Message::GetAddr => {
                let mut addresses = self.address_book.ordered();
                addresses.truncate(MAX_ADDR_PER_MESSAGE);
                Some(Message::Addr(addresses))
            }
            Message::Addr(addresses) => {
                debug!(peer = %from, count = addresses.len(), "addresses received");
                for address in addresses {
                    self.address_book.record(address);
                }
                None
            }
            Message::Inventory(vectors) => self.sync.on_inventory(&vectors, self.observer.is_some()),
            Message::Headers(headers) => {
                let report = self.sync.on_headers_batch(&headers, &self.pool);
                debug!(peer = %from, received = headers.len(), accepted = report.accepted, "headers");
                None
            }
            Message::Block(block) => self.sync.on_block(&block, from, &self.pool),
            Message::Transaction(transaction) => {
                if let Some(observer) = &self.observer {
                    observer.on_transaction(from, &transaction);
                }
                None
            }
            Message::Reject(reject) => {
                debug!(
                    peer = %from,
                    message = %reject.message,
                    code = reject.code.as_u8(),
                    reason = %reject.reason,
                    "peer rejected our message"
                );
                None
            }
            Message::Alert(alert) => {
                warn!(peer = %from, bytes = alert.payload.len(), "alert received");
                None
            }
            Message::Version(_)
            | Message::Verack
            | Message::GetData(_)
            | Message::NotFound(_)
            | Message::GetBlocks(_)
            | Message::GetHeaders(_)
            | Message::MemPool
            | Message::FilterClear => None,
        }
    }
}
