//! The single owner of all network state.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use peerchain_messages::{
    Message, PeerAddress, ServiceFlags, TransactionMessage, VersionMessage, PROTOCOL_VERSION,
};
use peerchain_store::ChainStore;
use peerchain_types::{BlockHeader, Timestamp};
use tracing::{debug, info, warn};

use crate::{
    AddressBook, ChainSynchronizer, ConnectionId, ConnectionPool, LivenessMonitor,
    MaintenanceReport, MaintenanceScheduler, TransactionObserver, Transport, TransportEvent,
};

/// Settings the core needs, already resolved from user configuration.
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    pub seeds: Vec<PeerAddress>,
    /// Port advertised in our `Version`.
    pub port: u16,
    pub genesis: BlockHeader,
    pub min_connected: usize,
    pub download_chain: bool,
    pub probe_every: u32,
    pub user_agent: String,
    pub services: ServiceFlags,
}

/// Address book, connection pool, liveness monitor, maintenance scheduler
/// and chain synchronizer behind one `&mut self`.
///
/// Timer ticks and transport events must both be fed through this value so
/// that every mutation is serialized.
pub struct PeerNetwork<S: ChainStore, T: Transport> {
    pub(crate) config: NetworkConfig,
    pub(crate) address_book: AddressBook,
    pub(crate) pool: ConnectionPool<T>,
    pub(crate) liveness: LivenessMonitor,
    pub(crate) maintenance: MaintenanceScheduler,
    pub(crate) sync: ChainSynchronizer<S>,
    pub(crate) observer: Option<Box<dyn TransactionObserver + Send>>,
}

impl<S: ChainStore, T: Transport> PeerNetwork<S, T> {
    pub fn new(config: NetworkConfig, transport: T, store: Option<Arc<S>>) -> Self {
        let mut address_book = AddressBook::new();
        for seed in &config.seeds {
            address_book.record(seed.clone());
        }
        let sync = ChainSynchronizer::new(store, config.genesis.clone(), config.download_chain);
        Self {
            address_book,
            pool: ConnectionPool::new(transport),
            liveness: LivenessMonitor::new(config.probe_every),
            maintenance: MaintenanceScheduler::new(config.min_connected),
            sync,
            observer: None,
            config,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn TransactionObserver + Send>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn address_book(&self) -> &AddressBook {
        &self.address_book
    }

    pub fn pool(&self) -> &ConnectionPool<T> {
        &self.pool
    }

    pub fn synchronizer(&self) -> &ChainSynchronizer<S> {
        &self.sync
    }

    pub fn maintenance(&self) -> &MaintenanceScheduler {
        &self.maintenance
    }

    pub fn connected_peer_count(&self) -> usize {
        self.pool.connected_count()
    }

    /// Last measured ping round trip for a peer.
    pub fn round_trip(&self, peer: ConnectionId) -> Option<Duration> {
        self.liveness.round_trip(peer)
    }

    /// One maintenance pass. Call once at start and then on every interval.
    pub fn run_maintenance(&mut self) -> MaintenanceReport {
        let handshake = self.version_message();
        let report = self.maintenance.run(
            &mut self.address_book,
            &mut self.pool,
            &mut self.liveness,
            &handshake,
        );
        debug!(
            connected = self.pool.connected_count(),
            known = self.address_book.len(),
            dialed = ?report.dialed,
            unresponsive = report.unresponsive.len(),
            pruned = report.pruned.len(),
            "maintenance done"
        );
        report
    }

    pub fn begin_sync(&self) -> Option<ConnectionId> {
        self.sync.begin_sync(&self.pool)
    }

    /// Send a transaction to every connected peer. `false` when there are none.
    pub fn broadcast_transaction(&self, transaction: TransactionMessage) -> bool {
        if self.pool.connected_count() == 0 {
            return false;
        }
        let hash = transaction.hash();
        let sent = self.pool.broadcast(&Message::Transaction(transaction), None);
        info!(%hash, sent, "transaction broadcast");
        true
    }

    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected { id, version } => {
                let agent = version.user_agent.clone();
                let height = version.start_height;
                if let Err(e) = self.pool.mark_connected(id, version) {
                    debug!(peer = %id, error = %e, "ignoring late handshake");
                    return;
                }
                info!(peer = %id, user_agent = %agent, start_height = height, "peer connected");
                if self.pool.connected_count() == 1 {
                    self.begin_sync();
                }
            }
            TransportEvent::Disconnected { id, error } => {
                if let Some(conn) = self.pool.remove(id) {
                    match error {
                        Some(error) => info!(peer = %id, address = %conn.address, %error, "peer lost"),
                        None => info!(peer = %id, address = %conn.address, "peer disconnected"),
                    }
                }
                self.liveness.forget(id);
            }
            TransportEvent::MessageReceived { id, message } => {
                if self.pool.get(id).is_none() {
                    debug!(peer = %id, kind = message.kind(), "message from unknown connection");
                    return;
                }
                if let Some(response) = self.route(id, message) {
                    if let Err(e) = self.pool.send(id, response) {
                        warn!(peer = %id, error = %e, "could not send response");
                    }
                }
            }
        }
    }

    /// Disconnect every peer.
    pub fn shutdown(&mut self) {
        let peers = self.pool.len();
        self.pool.disconnect_all();
        info!(peers, "network stopped");
    }

    fn version_message(&self) -> VersionMessage {
        let start_height = self.sync.height().ok().flatten().unwrap_or(0);
        let unspecified = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
        VersionMessage {
            protocol_version: PROTOCOL_VERSION,
            services: self.config.services,
            timestamp: Timestamp::now(),
            receiver: PeerAddress::from(SocketAddr::new(unspecified, 0)),
            sender: PeerAddress::new(unspecified, self.config.port),
            nonce: rand::random(),
            user_agent: self.config.user_agent.clone(),
            start_height,
            relay: true,
        }
    }
}
