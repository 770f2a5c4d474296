//! Ping/pong liveness probing.
//!
//! A probe left unanswered when the next maintenance tick runs gets its
//! peer disconnected.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use peerchain_messages::Message;
use tracing::{debug, info};

use crate::{ConnectionId, ConnectionPool, Transport};

/// Ticks between probe rounds.
pub const DEFAULT_PROBE_EVERY: u32 = 4;

#[derive(Clone, Copy, Debug)]
struct PendingPing {
    peer: ConnectionId,
    sent_at: Instant,
}

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LivenessReport {
    /// Peers disconnected for leaving a probe unanswered.
    pub unresponsive: Vec<ConnectionId>,
    /// Probes sent this tick.
    pub probed: usize,
}

pub struct LivenessMonitor {
    pending: HashMap<u64, PendingPing>,
    round_trips: HashMap<ConnectionId, Duration>,
    ticks: u32,
    probe_every: u32,
}

impl LivenessMonitor {
    pub fn new(probe_every: u32) -> Self {
        Self {
            pending: HashMap::new(),
            round_trips: HashMap::new(),
            ticks: 0,
            probe_every: probe_every.max(1),
        }
    }

    /// Disconnect every peer still owing a pong, then probe all connected
    /// peers if this is a probing tick.
    pub fn tick<T: Transport>(&mut self, pool: &mut ConnectionPool<T>) -> LivenessReport {
        let mut report = LivenessReport::default();

        let mut unanswered: Vec<ConnectionId> = self.pending.drain().map(|(_, p)| p.peer).collect();
        unanswered.sort();
        unanswered.dedup();
        for peer in unanswered {
            info!(%peer, "no pong before next tick, disconnecting");
            pool.disconnect(peer);
            self.round_trips.remove(&peer);
            report.unresponsive.push(peer);
        }

        self.ticks += 1;
        if self.ticks >= self.probe_every {
            self.ticks = 0;
            let now = Instant::now();
            let peers: Vec<ConnectionId> = pool.connected().iter().map(|c| c.id).collect();
            for peer in peers {
                let nonce = self.fresh_nonce();
                if pool.send(peer, Message::Ping(nonce)).is_ok() {
                    self.pending.insert(nonce, PendingPing { peer, sent_at: now });
                    report.probed += 1;
                }
            }
            debug!(probed = report.probed, "liveness probes sent");
        }

        report
    }

    /// Settle the probe carrying `nonce`. Returns the measured round trip, or
    /// `None` for a nonce that is not pending.
    pub fn on_pong(&mut self, nonce: u64) -> Option<Duration> {
        let ping = self.pending.remove(&nonce)?;
        let rtt = ping.sent_at.elapsed();
        self.round_trips.insert(ping.peer, rtt);
        debug!(peer = %ping.peer, rtt_ms = rtt.as_millis() as u64, "pong");
        Some(rtt)
    }

    /// Drop everything known about a peer that has gone away.
    pub fn forget(&mut self, peer: ConnectionId) {
        self.pending.retain(|_, p| p.peer != peer);
        self.round_trips.remove(&peer);
    }

    pub fn round_trip(&self, peer: ConnectionId) -> Option<Duration> {
        self.round_trips.get(&peer).copied()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn fresh_nonce(&self) -> u64 {
        loop {
            let nonce = rand::random::<u64>();
            if !self.pending.contains_key(&nonce) {
                return nonce;
            }
        }
    }
}

impl Default for LivenessMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_EVERY)
    }
}
