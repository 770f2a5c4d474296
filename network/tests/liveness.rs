mod common;

use common::*;
use peerchain_messages::Message;
use peerchain_network::{ConnectionId, ConnectionState, LivenessMonitor};
use peerchain_nullables::NullTransport;

fn ping_nonce(transport: &NullTransport, id: ConnectionId) -> u64 {
    transport
        .sent_to(id)
        .into_iter()
        .find_map(|m| match m {
            Message::Ping(nonce) => Some(nonce),
            _ => None,
        })
        .expect("ping sent")
}

#[test]
fn probes_only_every_fourth_tick() {
    let (transport, mut pool, ids) = connected_pool(2);
    let mut monitor = LivenessMonitor::new(4);

    for _ in 0..3 {
        assert_eq!(monitor.tick(&mut pool).probed, 0);
    }
    assert!(transport.sent().is_empty());

    let report = monitor.tick(&mut pool);
    assert_eq!(report.probed, 2);
    assert_eq!(monitor.pending_count(), 2);
    for id in &ids {
        assert!(matches!(transport.sent_to(*id)[..], [Message::Ping(_)]));
    }
}

#[test]
fn unanswered_probe_disconnects_exactly_once() {
    let (transport, mut pool, ids) = connected_pool(2);
    let mut monitor = LivenessMonitor::new(1);

    monitor.tick(&mut pool);
    let report = monitor.tick(&mut pool);

    let mut unresponsive = report.unresponsive.clone();
    unresponsive.sort();
    assert_eq!(unresponsive, ids);
    assert_eq!(pool.connected_count(), 0);

    let later = monitor.tick(&mut pool);
    assert!(later.unresponsive.is_empty());
    assert_eq!(later.probed, 0);

    let mut closed = transport.disconnects();
    closed.sort();
    assert_eq!(closed, ids);
}

#[test]
fn answered_probe_is_not_disconnected() {
    let (transport, mut pool, ids) = connected_pool(2);
    let mut monitor = LivenessMonitor::new(4);
    for _ in 0..4 {
        monitor.tick(&mut pool);
    }

    let nonce = ping_nonce(&transport, ids[0]);
    assert!(monitor.on_pong(nonce).is_some());
    assert!(monitor.round_trip(ids[0]).is_some());
    assert_eq!(monitor.on_pong(nonce), None);

    let report = monitor.tick(&mut pool);
    assert_eq!(report.unresponsive, vec![ids[1]]);
    assert_eq!(pool.get(ids[0]).unwrap().state, ConnectionState::Connected);
    assert_eq!(transport.disconnects(), vec![ids[1]]);
}

#[test]
fn forgotten_peer_is_not_disconnected_later() {
    let (transport, mut pool, ids) = connected_pool(1);
    let mut monitor = LivenessMonitor::new(1);
    monitor.tick(&mut pool);
    monitor.forget(ids[0]);
    assert_eq!(monitor.pending_count(), 0);

    pool.remove(ids[0]);
    let report = monitor.tick(&mut pool);
    assert!(report.unresponsive.is_empty());
    assert!(transport.disconnects().is_empty());
}
