//! Fundamental types for the peerchain network layer.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! hashes, block headers, work, stored chain records, network identifiers and timestamps.

pub mod chain_header;
pub mod error;
pub mod hash;
pub mod header;
pub mod network;
pub mod params;
pub mod time;
pub mod work;

pub use chain_header::BlockChainHeader;
pub use error::ParseHashError;
pub use hash::{BlockHash, TxHash};
pub use header::BlockHeader;
pub use network::NetworkId;
pub use params::ChainParams;
pub use time::Timestamp;
pub use work::Work;
