//! End-to-end: a node dials a scripted peer over loopback TCP.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use peerchain_messages::{Message, PeerAddress, ServiceFlags, VersionMessage, PROTOCOL_VERSION};
use peerchain_node::wire::{read_frame, write_frame};
use peerchain_node::{Node, NodeConfig};
use peerchain_store::MemoryChainStore;
use peerchain_types::{ChainParams, NetworkId, Timestamp};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn remote_version() -> VersionMessage {
    let local = IpAddr::V4(Ipv4Addr::LOCALHOST);
    VersionMessage {
        protocol_version: PROTOCOL_VERSION,
        services: ServiceFlags::NETWORK,
        timestamp: Timestamp::new(1_700_000_000),
        receiver: PeerAddress::new(local, 0),
        sender: PeerAddress::new(local, 0),
        nonce: 7,
        user_agent: "/scripted:0.1/".to_string(),
        start_height: 0,
        relay: true,
    }
}

#[tokio::test]
async fn node_dials_seed_handshakes_and_requests_headers() {
    let params = ChainParams::for_network(NetworkId::BitcoinRegtest);
    let magic = params.magic;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let seed = listener.local_addr().unwrap();

    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, mut writer) = stream.into_split();

        let Message::Version(theirs) = read_frame(&mut reader, magic).await.unwrap() else {
            panic!("node must open with version");
        };
        write_frame(&mut writer, magic, &Message::Version(remote_version()))
            .await
            .unwrap();
        write_frame(&mut writer, magic, &Message::Verack).await.unwrap();

        loop {
            match read_frame(&mut reader, magic).await.unwrap() {
                Message::GetHeaders(locator) => return (theirs, locator),
                _ => continue,
            }
        }
    });

    let config = NodeConfig {
        network: NetworkId::BitcoinRegtest,
        seed_peers: vec![seed.to_string()],
        min_connected: 1,
        maintenance_interval_secs: 1,
        ..NodeConfig::default()
    };
    let store = Arc::new(MemoryChainStore::new());
    let node = Node::new(config, Some(store));

    let (stop, stopped) = oneshot::channel::<()>();
    let running = tokio::spawn(node.run(async move {
        let _ = stopped.await;
    }));

    let (theirs, locator) = tokio::time::timeout(Duration::from_secs(10), peer)
        .await
        .expect("peer finished in time")
        .unwrap();
    assert_eq!(theirs.receiver.socket_addr(), seed);
    assert_eq!(locator.locator_hashes, vec![params.genesis_hash()]);

    stop.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("node stopped in time")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn invalid_config_stops_before_networking() {
    let config = NodeConfig {
        seed_peers: vec!["nowhere".into()],
        ..NodeConfig::default()
    };
    let node: Node<MemoryChainStore> = Node::new(config, None);
    assert!(node.run(std::future::pending()).await.is_err());
}

#[tokio::test]
async fn resolved_shutdown_stops_an_idle_node() {
    let config = NodeConfig {
        network: NetworkId::BitcoinRegtest,
        maintenance_interval_secs: 1,
        ..NodeConfig::default()
    };
    let node: Node<MemoryChainStore> = Node::new(config, None);
    let result = tokio::time::timeout(Duration::from_secs(5), node.run(async {}))
        .await
        .expect("node stopped in time");
    assert!(result.is_ok());
}
