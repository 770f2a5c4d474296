//! Peerchain node.
//!
//! Wires the network core to the outside world:
//! - TOML configuration and tracing setup
//! - a tokio TCP transport speaking length-prefixed bincode frames
//! - the single-owner loop that feeds timer ticks and transport events
//!   into [`peerchain_network::PeerNetwork`]

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod transport;
pub mod wire;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::Node;
pub use transport::TcpTransport;
