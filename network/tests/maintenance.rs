mod common;

use std::net::IpAddr;

use common::*;
use peerchain_messages::{Message, PeerAddress};
use peerchain_network::{AddressBook, ConnectionPool, LivenessMonitor, MaintenanceScheduler};
use peerchain_nullables::NullTransport;
use peerchain_types::Timestamp;

fn book(entries: &[(u8, Option<u64>)]) -> AddressBook {
    let mut book = AddressBook::new();
    for (n, ts) in entries {
        let mut address = PeerAddress::from(addr(*n));
        address.timestamp = ts.map(Timestamp::new);
        book.record(address);
    }
    book
}

#[test]
fn dials_freshest_candidate_and_ignores_it() {
    let transport = NullTransport::new();
    let mut pool = ConnectionPool::new(transport.clone());
    let mut book = book(&[(1, Some(100)), (2, Some(500)), (3, None)]);
    let mut liveness = LivenessMonitor::default();
    let mut scheduler = MaintenanceScheduler::new(3);

    let report = scheduler.run(&mut book, &mut pool, &mut liveness, &version());

    assert_eq!(report.dialed, Some(addr(2)));
    assert!(scheduler.is_ignored(&addr(2).ip()));
    assert_eq!(book.len(), 2);
    assert_eq!(transport.connects()[0].1, addr(2));

    let second = scheduler.run(&mut book, &mut pool, &mut liveness, &version());
    assert_eq!(second.dialed, Some(addr(1)));
    assert_eq!(pool.len(), 2);
}

#[test]
fn one_dial_per_pass() {
    let (transport, mut pool, _) = connected_pool(0);
    let mut book = book(&[(1, None), (2, None), (3, None)]);
    let mut scheduler = MaintenanceScheduler::new(3);

    scheduler.run(&mut book, &mut pool, &mut LivenessMonitor::default(), &version());
    assert_eq!(transport.connects().len(), 1);
}

#[test]
fn stalled_without_candidates_or_peers() {
    let (transport, mut pool, _) = connected_pool(0);
    let mut book = book(&[(1, None), (2, None)]);
    let mut scheduler = MaintenanceScheduler::new(3);
    scheduler.ignore(addr(1).ip());
    scheduler.ignore(addr(2).ip());

    let report = scheduler.run(&mut book, &mut pool, &mut LivenessMonitor::default(), &version());

    assert_eq!(report.dialed, None);
    assert_eq!(report.address_request, None);
    assert!(transport.connects().is_empty());
    assert!(transport.sent().is_empty());
}

#[test]
fn asks_a_connected_peer_for_addresses() {
    let (transport, mut pool, ids) = connected_pool(1);
    let mut book = AddressBook::new();
    let mut scheduler = MaintenanceScheduler::new(3);

    let report = scheduler.run(&mut book, &mut pool, &mut LivenessMonitor::default(), &version());

    assert_eq!(report.address_request, Some(ids[0]));
    assert_eq!(transport.sent_to(ids[0]), vec![Message::GetAddr]);
}

#[test]
fn rests_when_enough_peers() {
    let (transport, mut pool, _) = connected_pool(3);
    let mut book = book(&[(9, None)]);
    let mut scheduler = MaintenanceScheduler::new(3);

    let report = scheduler.run(&mut book, &mut pool, &mut LivenessMonitor::default(), &version());
    assert_eq!(report.dialed, None);
    assert_eq!(report.address_request, None);
    assert_eq!(transport.connects().len(), 3);
    assert_eq!(book.len(), 1);
}

#[test]
fn prunes_disconnected_connections() {
    let (_transport, mut pool, ids) = connected_pool(3);
    pool.disconnect(ids[0]);
    let mut scheduler = MaintenanceScheduler::new(3);

    let report = scheduler.run(
        &mut AddressBook::new(),
        &mut pool,
        &mut LivenessMonitor::default(),
        &version(),
    );
    assert_eq!(report.pruned, vec![ids[0]]);
    assert_eq!(pool.len(), 2);
}

#[test]
fn unresponsive_peers_are_pruned_in_the_same_pass() {
    let (_transport, mut pool, ids) = connected_pool(3);
    let mut liveness = LivenessMonitor::new(1);
    let mut scheduler = MaintenanceScheduler::new(3);
    let mut book = AddressBook::new();

    let first = scheduler.run(&mut book, &mut pool, &mut liveness, &version());
    assert_eq!(first.probed, 3);

    let second = scheduler.run(&mut book, &mut pool, &mut liveness, &version());
    assert_eq!(second.unresponsive.len(), 3);
    let mut pruned = second.pruned.clone();
    pruned.sort();
    assert_eq!(pruned, ids);
    assert!(pool.is_empty());
}

#[test]
fn ignored_address_is_never_redialed() {
    let (transport, mut pool, _) = connected_pool(0);
    let mut book = book(&[(1, None)]);
    let mut scheduler = MaintenanceScheduler::new(3);
    let mut liveness = LivenessMonitor::default();

    scheduler.run(&mut book, &mut pool, &mut liveness, &version());
    assert_eq!(transport.connects().len(), 1);

    // Rediscovered later, still skipped for the rest of the session.
    book.record(PeerAddress::from(addr(1)).with_timestamp(Timestamp::now()));
    let report = scheduler.run(&mut book, &mut pool, &mut liveness, &version());
    assert_eq!(report.dialed, None);
    assert_eq!(transport.connects().len(), 1);
    assert!(scheduler.is_ignored(&IpAddr::from([10, 0, 0, 1])));
}
