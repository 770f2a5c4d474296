//! Peerchain daemon: entry point for running a header-sync node.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use peerchain_node::{init_logging, Node, NodeConfig};
use peerchain_store::MemoryChainStore;
use peerchain_types::NetworkId;

#[derive(Parser)]
#[command(name = "peerchain", about = "Peer-to-peer header chain node")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "PEERCHAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Network to join: "bitcoin", "testnet", "regtest", "litecoin" or "vertcoin".
    #[arg(long, env = "PEERCHAIN_NETWORK")]
    network: Option<NetworkId>,

    /// Port for seeds given without one (defaults to network default).
    #[arg(long, env = "PEERCHAIN_PORT")]
    port: Option<u16>,

    /// Seed peer addresses (comma-separated: "1.2.3.4,5.6.7.8:8333").
    #[arg(long, env = "PEERCHAIN_SEED_PEERS", value_delimiter = ',')]
    seed_peers: Vec<String>,

    /// Keep dialing until this many peers are connected.
    #[arg(long, env = "PEERCHAIN_MIN_CONNECTED")]
    min_connected: Option<usize>,

    /// Keep peers alive without downloading the chain.
    #[arg(long, env = "PEERCHAIN_NO_DOWNLOAD")]
    no_download: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PEERCHAIN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "PEERCHAIN_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the node until SIGINT or SIGTERM.
    Run,
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    fn node_config(&self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => NodeConfig::default(),
        };
        if let Some(network) = self.network {
            config.network = network;
        }
        if self.port.is_some() {
            config.port = self.port;
        }
        if !self.seed_peers.is_empty() {
            config.seed_peers = self.seed_peers.clone();
        }
        if let Some(min_connected) = self.min_connected {
            config.min_connected = min_connected;
        }
        if self.no_download {
            config.download_chain = false;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Resolves with the name of the first SIGINT or SIGTERM received.
async fn shutdown_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    let terminate = {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        async move { sigterm.recv().await }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<Option<()>>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate => Ok("SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.node_config()?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run => {
            init_logging(config.log_format()?, &config.log_level);
            tracing::info!(
                network = %config.network,
                port = config.port(),
                seeds = %config.seed_peers.join(", "),
                min_connected = config.min_connected,
                "starting peerchain node"
            );

            let store = config
                .download_chain
                .then(|| Arc::new(MemoryChainStore::new()));
            let node = Node::new(config, store);

            node.run(async {
                match shutdown_signal().await {
                    Ok(signal) => tracing::info!(signal, "shutdown requested"),
                    Err(e) => tracing::error!(error = %e, "signal handler failed, stopping"),
                }
            })
            .await?;
            tracing::info!("peerchain daemon exited cleanly");
        }
    }

    Ok(())
}
