//! Reject messages sent back to a peer whose message was refused.

use peerchain_types::BlockHash;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectCode {
    Malformed,
    Invalid,
    Obsolete,
    Duplicate,
    NonStandard,
    Dust,
    InsufficientFee,
    Checkpoint,
}

impl RejectCode {
    /// Numeric code used by the reference protocol.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Malformed => 0x01,
            Self::Invalid => 0x10,
            Self::Obsolete => 0x11,
            Self::Duplicate => 0x12,
            Self::NonStandard => 0x40,
            Self::Dust => 0x41,
            Self::InsufficientFee => 0x42,
            Self::Checkpoint => 0x43,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectMessage {
    /// Command name of the refused message.
    pub message: String,
    pub code: RejectCode,
    pub reason: String,
    pub hash: Option<BlockHash>,
}

impl RejectMessage {
    pub fn new(message: &str, code: RejectCode, reason: &str, hash: Option<BlockHash>) -> Self {
        Self {
            message: message.to_string(),
            code,
            reason: reason.to_string(),
            hash,
        }
    }
}
