//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use peerchain_messages::ServiceFlags;
use peerchain_network::address_book::parse_seed;
use peerchain_network::NetworkConfig;
use peerchain_types::{ChainParams, NetworkId};

use crate::{LogFormat, NodeError};

/// Configuration for a peerchain node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Which chain to join.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Port for seeds given without one and advertised in `Version`.
    /// Falls back to the network's default port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Seed addresses, `"ip"` or `"ip:port"`.
    #[serde(default)]
    pub seed_peers: Vec<String>,

    /// Maintenance dials until at least this many peers are connected.
    #[serde(default = "default_min_connected")]
    pub min_connected: usize,

    /// Whether to download the header chain.
    #[serde(default = "default_true")]
    pub download_chain: bool,

    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,

    /// Liveness probes go out every this many maintenance passes.
    #[serde(default = "default_probe_every_ticks")]
    pub probe_every_ticks: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Bitcoin
}

fn default_min_connected() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_maintenance_interval_secs() -> u64 {
    30
}

fn default_probe_every_ticks() -> u32 {
    4
}

fn default_user_agent() -> String {
    format!("/peerchain:{}/", env!("CARGO_PKG_VERSION"))
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.network.default_port())
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse().map_err(NodeError::Config)
    }

    pub fn chain_params(&self) -> ChainParams {
        ChainParams::for_network(self.network)
    }

    /// Reject values the node cannot run with.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.maintenance_interval_secs == 0 {
            return Err(NodeError::Config(
                "maintenance_interval_secs must be positive".into(),
            ));
        }
        if self.probe_every_ticks == 0 {
            return Err(NodeError::Config("probe_every_ticks must be positive".into()));
        }
        self.log_format()?;
        for seed in &self.seed_peers {
            parse_seed(seed, self.port())?;
        }
        Ok(())
    }

    /// Resolve into the settings the network core runs with.
    pub fn network_config(&self) -> Result<NetworkConfig, NodeError> {
        let port = self.port();
        let seeds = self
            .seed_peers
            .iter()
            .map(|seed| parse_seed(seed, port))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NetworkConfig {
            seeds,
            port,
            genesis: self.chain_params().genesis,
            min_connected: self.min_connected,
            download_chain: self.download_chain,
            probe_every: self.probe_every_ticks,
            user_agent: self.user_agent.clone(),
            services: ServiceFlags::NONE,
        })
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            port: None,
            seed_peers: Vec::new(),
            min_connected: default_min_connected(),
            download_chain: default_true(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
            probe_every_ticks: default_probe_every_ticks(),
            user_agent: default_user_agent(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
