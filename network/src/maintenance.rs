//! Periodic maintenance pass.

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use peerchain_messages::{Message, VersionMessage};
use tracing::{debug, info, warn};

use crate::{AddressBook, ConnectionId, ConnectionPool, LivenessMonitor, Transport};

/// Default minimum number of connected peers.
pub const DEFAULT_MIN_CONNECTED: usize = 3;

/// Everything one maintenance pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub dialed: Option<SocketAddr>,
    /// Peer asked for more addresses because no candidate was left.
    pub address_request: Option<ConnectionId>,
    pub unresponsive: Vec<ConnectionId>,
    pub probed: usize,
    pub pruned: Vec<ConnectionId>,
}

pub struct MaintenanceScheduler {
    min_connected: usize,
    /// IPs dialed this session. Never shrinks.
    ignored: HashSet<IpAddr>,
}

impl MaintenanceScheduler {
    pub fn new(min_connected: usize) -> Self {
        Self {
            min_connected,
            ignored: HashSet::new(),
        }
    }

    pub fn min_connected(&self) -> usize {
        self.min_connected
    }

    pub fn is_ignored(&self, ip: &IpAddr) -> bool {
        self.ignored.contains(ip)
    }

    /// Mark an IP as already attempted.
    pub fn ignore(&mut self, ip: IpAddr) {
        self.ignored.insert(ip);
    }

    /// One pass: top up connections, drive liveness, prune dead connections.
    pub fn run<T: Transport>(
        &mut self,
        book: &mut AddressBook,
        pool: &mut ConnectionPool<T>,
        liveness: &mut LivenessMonitor,
        handshake: &VersionMessage,
    ) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        let connected = pool.connected_count();
        if connected < self.min_connected {
            match book.next_candidate(&self.ignored) {
                Some(candidate) => {
                    let addr = candidate.socket_addr();
                    pool.connect(addr, handshake);
                    self.ignored.insert(candidate.ip);
                    book.remove(&addr);
                    report.dialed = Some(addr);
                }
                None => {
                    warn!(connected, "no more known addresses to dial");
                    report.address_request = request_addresses(pool);
                }
            }
        } else {
            debug!(connected, "enough peers connected");
        }

        let liveness_report = liveness.tick(pool);
        report.unresponsive = liveness_report.unresponsive;
        report.probed = liveness_report.probed;

        report.pruned = pool.prune_disconnected();
        for id in &report.pruned {
            liveness.forget(*id);
        }

        report
    }
}

impl Default for MaintenanceScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONNECTED)
    }
}

fn request_addresses<T: Transport>(pool: &ConnectionPool<T>) -> Option<ConnectionId> {
    let Some(peer) = pool.random_connected() else {
        warn!("no candidates and no connected peers, stalled until next tick");
        return None;
    };
    match pool.send(peer, Message::GetAddr) {
        Ok(()) => {
            info!(%peer, "requested addresses");
            Some(peer)
        }
        Err(e) => {
            warn!(%peer, error = %e, "address request failed");
            None
        }
    }
}
