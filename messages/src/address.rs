//! Peer network addresses as advertised on the wire.

use std::net::{IpAddr, SocketAddr};
use std::ops::BitOr;

use peerchain_types::Timestamp;
use serde::{Deserialize, Serialize};

/// Services a node declares it offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceFlags(u64);

impl ServiceFlags {
    pub const NONE: Self = Self(0);
    /// Serves the full block chain.
    pub const NETWORK: Self = Self(1);

    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn contains(&self, other: ServiceFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ServiceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A known peer address. `timestamp` is the last time the address was seen
/// active, when the advertiser supplied one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAddress {
    pub services: ServiceFlags,
    pub ip: IpAddr,
    pub port: u16,
    pub timestamp: Option<Timestamp>,
}

impl PeerAddress {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self {
            services: ServiceFlags::NETWORK,
            ip,
            port,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl From<SocketAddr> for PeerAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}
