//! Block header as received from peers.

use serde::{Deserialize, Serialize};

use crate::hash::sha256d;
use crate::{BlockHash, Work};

/// Serialized size of a header on the wire.
pub const HEADER_SIZE: usize = 80;

/// An 80-byte block header. Immutable once received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub previous_hash: BlockHash,
    pub merkle_root: BlockHash,
    pub timestamp: u32,
    /// Compact difficulty target.
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Little-endian 80-byte serialization that the header hash commits to.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(self.previous_hash.as_bytes());
        out[36..68].copy_from_slice(self.merkle_root.as_bytes());
        out[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    pub fn hash(&self) -> BlockHash {
        BlockHash::new(sha256d(&self.to_bytes()))
    }

    /// Work contributed by this header alone.
    pub fn work(&self) -> Work {
        Work::from_compact(self.bits)
    }
}
