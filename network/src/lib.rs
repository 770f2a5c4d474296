//! P2P network core.
//!
//! Discovers peers, keeps a pool of live connections, probes them for
//! liveness and builds a single canonical header chain with a
//! cumulative-work fork-choice rule. All mutable state is owned by one
//! [`PeerNetwork`]; the transport hands it events and it answers with
//! outbound messages.

pub mod address_book;
pub mod chain_sync;
pub mod connection_pool;
pub mod error;
pub mod liveness;
pub mod maintenance;
pub mod observer;
pub mod peer_network;
pub mod router;
pub mod transport;

pub use address_book::AddressBook;
pub use chain_sync::{Acceptance, ChainSynchronizer, HeaderOutcome, Rejection};
pub use connection_pool::{ConnectionPool, ConnectionState, PeerConnection};
pub use error::NetworkError;
pub use liveness::LivenessMonitor;
pub use maintenance::{MaintenanceReport, MaintenanceScheduler};
pub use observer::TransactionObserver;
pub use peer_network::{NetworkConfig, PeerNetwork};
pub use transport::{ConnectionId, Transport, TransportEvent};
