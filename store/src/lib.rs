//! Storage of the header chain.
//!
//! The network layer depends only on the [`ChainStore`] trait. Every backend
//! (the in-memory one here, or an on-disk one elsewhere) implements it.

pub mod chain;
pub mod error;
pub mod memory;

pub use chain::ChainStore;
pub use error::StoreError;
pub use memory::MemoryChainStore;
