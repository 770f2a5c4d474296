//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the network core sits behind a trait.
//! This crate provides test-friendly implementations that:
//! - record what the core asked of them
//! - can be told to fail
//! - never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod network;
pub mod observer;
pub mod store;

pub use network::NullTransport;
pub use observer::NullObserver;
pub use store::{NullChainStore, StoreOp};
