//! The node: owns the [`PeerNetwork`] and serializes everything into it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use peerchain_network::{PeerNetwork, TransactionObserver};
use peerchain_store::ChainStore;
use peerchain_types::ChainParams;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::transport::TcpTransport;

/// Channel capacity for transport events waiting on the node loop.
const EVENT_CHANNEL_CAPACITY: usize = 4096;

pub struct Node<S: ChainStore> {
    config: NodeConfig,
    params: ChainParams,
    store: Option<Arc<S>>,
    observer: Option<Box<dyn TransactionObserver + Send>>,
}

impl<S: ChainStore> Node<S> {
    /// A node without a store still keeps peers alive and answers them,
    /// but never downloads the chain.
    pub fn new(config: NodeConfig, store: Option<Arc<S>>) -> Self {
        let params = config.chain_params();
        Self {
            config,
            params,
            store,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn TransactionObserver + Send>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Run until `shutdown` resolves, then disconnect every peer.
    ///
    /// Maintenance runs immediately and then every
    /// `maintenance_interval_secs`; a slow pass delays the next one rather
    /// than bunching ticks up.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<(), NodeError> {
        self.config.validate()?;
        let network_config = self.config.network_config()?;

        let (events_tx, mut events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let transport = TcpTransport::new(self.params.magic, events_tx, Handle::current());
        let mut network = PeerNetwork::new(network_config, transport, self.store);
        if let Some(observer) = self.observer {
            network = network.with_observer(observer);
        }

        tracing::info!(
            network = %self.params.network,
            genesis = %self.params.genesis_hash(),
            seeds = self.config.seed_peers.len(),
            download = network.synchronizer().downloads_chain(),
            "node started"
        );

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.maintenance_interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!("node shutting down");
                    break;
                }
                Some(event) = events_rx.recv() => network.handle_event(event),
                _ = interval.tick() => {
                    network.run_maintenance();
                }
            }
        }

        network.shutdown();
        Ok(())
    }
}
