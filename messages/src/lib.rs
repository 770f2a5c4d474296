//! Typed wire messages exchanged between peers.
//!
//! Payload encoding is left to the transport; everything here is a plain
//! serde value. The network core matches on [`Message`] exhaustively.

pub mod address;
pub mod inventory;
pub mod reject;

use peerchain_types::hash::sha256d;
use peerchain_types::{BlockHash, BlockHeader, Timestamp, TxHash};
use serde::{Deserialize, Serialize};

pub use address::{PeerAddress, ServiceFlags};
pub use inventory::{InventoryKind, InventoryVector};
pub use reject::{RejectCode, RejectMessage};

/// Protocol version advertised in `Version` and locator requests.
pub const PROTOCOL_VERSION: u32 = 70002;

/// Most addresses a single `Addr` message may carry.
pub const MAX_ADDR_PER_MESSAGE: usize = 1000;

/// Every message a peer can send or receive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Version(VersionMessage),
    Verack,
    Ping(u64),
    Pong(u64),
    GetAddr,
    Addr(Vec<PeerAddress>),
    Inventory(Vec<InventoryVector>),
    GetData(Vec<InventoryVector>),
    NotFound(Vec<InventoryVector>),
    GetBlocks(LocatorMessage),
    GetHeaders(LocatorMessage),
    Headers(Vec<BlockHeader>),
    Block(BlockMessage),
    Transaction(TransactionMessage),
    Reject(RejectMessage),
    Alert(AlertMessage),
    MemPool,
    FilterClear,
}

impl Message {
    /// Command name, used in logs and reject messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Version(_) => "version",
            Self::Verack => "verack",
            Self::Ping(_) => "ping",
            Self::Pong(_) => "pong",
            Self::GetAddr => "getaddr",
            Self::Addr(_) => "addr",
            Self::Inventory(_) => "inv",
            Self::GetData(_) => "getdata",
            Self::NotFound(_) => "notfound",
            Self::GetBlocks(_) => "getblocks",
            Self::GetHeaders(_) => "getheaders",
            Self::Headers(_) => "headers",
            Self::Block(_) => "block",
            Self::Transaction(_) => "tx",
            Self::Reject(_) => "reject",
            Self::Alert(_) => "alert",
            Self::MemPool => "mempool",
            Self::FilterClear => "filterclear",
        }
    }
}

/// Opening handshake message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMessage {
    pub protocol_version: u32,
    pub services: ServiceFlags,
    pub timestamp: Timestamp,
    pub receiver: PeerAddress,
    pub sender: PeerAddress,
    /// Random per-connection value used to detect self-connections.
    pub nonce: u64,
    pub user_agent: String,
    pub start_height: u32,
    pub relay: bool,
}

/// `getheaders` / `getblocks` body: a block locator and an optional stop hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorMessage {
    pub protocol_version: u32,
    pub locator_hashes: Vec<BlockHash>,
    /// `BlockHash::ZERO` asks for as many as the peer will send.
    pub stop_hash: BlockHash,
}

impl LocatorMessage {
    /// Locator anchored at a single hash, no stop hash.
    pub fn from_hash(hash: BlockHash) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            locator_hashes: vec![hash],
            stop_hash: BlockHash::ZERO,
        }
    }
}

/// A full block. Transactions stay opaque.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMessage {
    pub header: BlockHeader,
    pub transactions: Vec<TransactionMessage>,
}

/// An opaque serialized transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMessage {
    pub payload: Vec<u8>,
}

impl TransactionMessage {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    pub fn hash(&self) -> TxHash {
        TxHash::new(sha256d(&self.payload))
    }
}

/// Signed network alert, carried but never acted upon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}
