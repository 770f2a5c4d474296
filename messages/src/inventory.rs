use peerchain_types::BlockHash;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryKind {
    Error,
    Transaction,
    Block,
}

/// One advertised or requested object. Transaction hashes share the 32-byte
/// representation of block hashes on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryVector {
    pub kind: InventoryKind,
    pub hash: BlockHash,
}

impl InventoryVector {
    pub fn block(hash: BlockHash) -> Self {
        Self {
            kind: InventoryKind::Block,
            hash,
        }
    }

    pub fn transaction(hash: BlockHash) -> Self {
        Self {
            kind: InventoryKind::Transaction,
            hash,
        }
    }
}
