use thiserror::Error;

/// Failure to parse a hex-encoded 32-byte hash.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseHashError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}
