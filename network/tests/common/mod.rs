#![allow(dead_code)]

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use peerchain_messages::{PeerAddress, ServiceFlags, VersionMessage, PROTOCOL_VERSION};
use peerchain_network::{ChainSynchronizer, ConnectionId, ConnectionPool, NetworkConfig};
use peerchain_nullables::{NullChainStore, NullTransport};
use peerchain_types::{BlockHash, BlockHeader, Timestamp};

// Compact targets whose work is exactly the named value.
pub const WORK_1: u32 = 0x2100_8000;
pub const WORK_2: u32 = 0x207f_ffff;
pub const WORK_3: u32 = 0x2055_5555;
pub const WORK_4: u32 = 0x203f_ffff;
pub const WORK_8: u32 = 0x201f_ffff;

pub fn header(previous_hash: BlockHash, bits: u32, nonce: u32) -> BlockHeader {
    BlockHeader {
        version: 2,
        previous_hash,
        merkle_root: BlockHash::ZERO,
        timestamp: 1_400_000_000 + nonce,
        bits,
        nonce,
    }
}

pub fn genesis(bits: u32) -> BlockHeader {
    header(BlockHash::ZERO, bits, 0)
}

/// Headers extending `from` with the given per-header bits.
pub fn extend(from: &BlockHeader, bits: &[u32], nonce_base: u32) -> Vec<BlockHeader> {
    let mut previous = from.hash();
    let mut out = Vec::new();
    for (i, b) in bits.iter().enumerate() {
        let next = header(previous, *b, nonce_base + i as u32);
        previous = next.hash();
        out.push(next);
    }
    out
}

pub fn synchronizer(
    genesis: &BlockHeader,
) -> (Arc<NullChainStore>, ChainSynchronizer<NullChainStore>) {
    let store = Arc::new(NullChainStore::new());
    let sync = ChainSynchronizer::new(Some(store.clone()), genesis.clone(), true);
    (store, sync)
}

pub fn addr(n: u8) -> SocketAddr {
    SocketAddr::new(IpAddr::from([10, 0, 0, n]), 8333)
}

pub fn version() -> VersionMessage {
    let local = PeerAddress::new(IpAddr::from([127, 0, 0, 1]), 8333);
    VersionMessage {
        protocol_version: PROTOCOL_VERSION,
        services: ServiceFlags::NETWORK,
        timestamp: Timestamp::new(1_700_000_000),
        receiver: local.clone(),
        sender: local,
        nonce: 7,
        user_agent: "/peerchain-test:0.1/".into(),
        start_height: 0,
        relay: true,
    }
}

/// A pool whose `n` connections have all completed the handshake.
pub fn connected_pool(n: u8) -> (NullTransport, ConnectionPool<NullTransport>, Vec<ConnectionId>) {
    let transport = NullTransport::new();
    let mut pool = ConnectionPool::new(transport.clone());
    let ids = (1..=n)
        .map(|i| {
            let id = pool.connect(addr(i), &version());
            pool.mark_connected(id, version()).unwrap();
            id
        })
        .collect();
    (transport, pool, ids)
}

pub fn network_config(seeds: Vec<PeerAddress>) -> NetworkConfig {
    NetworkConfig {
        seeds,
        port: 18444,
        genesis: genesis(WORK_1),
        min_connected: 3,
        download_chain: true,
        probe_every: 4,
        user_agent: "/peerchain-test:0.1/".into(),
        services: ServiceFlags::NETWORK,
    }
}
