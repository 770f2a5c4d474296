//! TCP implementation of [`Transport`].
//!
//! Every connection runs in its own task: dial, exchange `version`/`verack`,
//! then pump frames both ways until either side stops. All outcomes are
//! reported on the event channel the node loop drains.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use peerchain_messages::{Message, VersionMessage};
use peerchain_network::{ConnectionId, Transport, TransportEvent};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::wire::{read_frame, write_frame};

/// Timeout for the initial TCP connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for completing the version/verack exchange.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// A session with no inbound frame for this long is dropped.
const IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

struct Link {
    outbound: mpsc::UnboundedSender<Message>,
    task: JoinHandle<()>,
}

type Links = Arc<Mutex<HashMap<ConnectionId, Link>>>;

pub struct TcpTransport {
    magic: u32,
    next_id: AtomicU64,
    links: Links,
    events: mpsc::Sender<TransportEvent>,
    handle: Handle,
}

impl TcpTransport {
    pub fn new(magic: u32, events: mpsc::Sender<TransportEvent>, handle: Handle) -> Self {
        Self {
            magic,
            next_id: AtomicU64::new(1),
            links: Arc::new(Mutex::new(HashMap::new())),
            events,
            handle,
        }
    }

    /// Connections whose task is still running.
    pub fn active(&self) -> usize {
        lock(&self.links).len()
    }
}

fn lock(links: &Links) -> MutexGuard<'_, HashMap<ConnectionId, Link>> {
    links.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Transport for TcpTransport {
    fn connect(&self, addr: SocketAddr, version: &VersionMessage) -> ConnectionId {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let session = Session {
            id,
            addr,
            magic: self.magic,
            version: version.clone(),
            events: self.events.clone(),
        };
        let links = Arc::clone(&self.links);
        let events = self.events.clone();

        // Held across the spawn so the task cannot finish and look for its
        // link before the link exists.
        let mut guard = lock(&self.links);
        let task = self.handle.spawn(async move {
            let result = session.run(outbound_rx).await;
            let owned = lock(&links).remove(&id).is_some();
            if !owned {
                return;
            }
            let error = match result {
                Ok(()) => None,
                Err(e) => {
                    tracing::debug!(peer = %id, %addr, error = %e, "session ended");
                    Some(e.to_string())
                }
            };
            let _ = events.send(TransportEvent::Disconnected { id, error }).await;
        });
        guard.insert(id, Link { outbound, task });
        id
    }

    fn send(&self, id: ConnectionId, message: Message) {
        let links = lock(&self.links);
        match links.get(&id) {
            Some(link) => {
                if link.outbound.send(message).is_err() {
                    tracing::debug!(peer = %id, "session already closed, message dropped");
                }
            }
            None => tracing::debug!(peer = %id, kind = message.kind(), "send to unknown connection"),
        }
    }

    fn disconnect(&self, id: ConnectionId) {
        let Some(link) = lock(&self.links).remove(&id) else {
            return;
        };
        link.task.abort();
        if let Err(e) = self
            .events
            .try_send(TransportEvent::Disconnected { id, error: None })
        {
            tracing::debug!(peer = %id, error = %e, "could not report disconnect");
        }
    }
}

struct Session {
    id: ConnectionId,
    addr: SocketAddr,
    magic: u32,
    version: VersionMessage,
    events: mpsc::Sender<TransportEvent>,
}

impl Session {
    async fn run(self, outbound: mpsc::UnboundedReceiver<Message>) -> io::Result<()> {
        let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(self.addr))
            .await
            .map_err(|_| timed_out("connection timed out"))??;
        let (mut reader, mut writer) = stream.into_split();

        let theirs = tokio::time::timeout(HANDSHAKE_TIMEOUT, self.handshake(&mut reader, &mut writer))
            .await
            .map_err(|_| timed_out("handshake timed out"))??;
        tracing::debug!(peer = %self.id, addr = %self.addr, user_agent = %theirs.user_agent, "handshake complete");
        self.emit(TransportEvent::Connected {
            id: self.id,
            version: theirs,
        })
        .await?;

        tokio::select! {
            result = write_loop(writer, self.magic, outbound) => result,
            result = self.read_loop(reader) => result,
        }
    }

    async fn read_loop(&self, mut reader: OwnedReadHalf) -> io::Result<()> {
        loop {
            let message = tokio::time::timeout(IDLE_TIMEOUT, read_frame(&mut reader, self.magic))
                .await
                .map_err(|_| timed_out("read timeout (idle)"))??;
            self.emit(TransportEvent::MessageReceived {
                id: self.id,
                message,
            })
            .await?;
        }
    }

    /// Send our `version`, answer theirs with `verack`, and finish once we
    /// hold both their `version` and their `verack`.
    async fn handshake(
        &self,
        reader: &mut OwnedReadHalf,
        writer: &mut OwnedWriteHalf,
    ) -> io::Result<VersionMessage> {
        write_frame(writer, self.magic, &Message::Version(self.version.clone())).await?;

        let mut theirs = None;
        let mut acknowledged = false;
        loop {
            match read_frame(reader, self.magic).await? {
                Message::Version(version) => {
                    write_frame(writer, self.magic, &Message::Verack).await?;
                    theirs = Some(version);
                }
                Message::Verack => acknowledged = true,
                other => {
                    tracing::trace!(peer = %self.id, kind = other.kind(), "ignored before handshake");
                }
            }
            if acknowledged {
                if let Some(version) = theirs.take() {
                    return Ok(version);
                }
            }
        }
    }

    async fn emit(&self, event: TransportEvent) -> io::Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "node loop stopped"))
    }
}

/// Ends cleanly once the link's sender is dropped.
async fn write_loop(
    mut writer: OwnedWriteHalf,
    magic: u32,
    mut outbound: mpsc::UnboundedReceiver<Message>,
) -> io::Result<()> {
    while let Some(message) = outbound.recv().await {
        write_frame(&mut writer, magic, &message).await?;
    }
    Ok(())
}

fn timed_out(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, what.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerchain_messages::{PeerAddress, ServiceFlags, PROTOCOL_VERSION};
    use peerchain_types::Timestamp;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::TcpListener;

    const MAGIC: u32 = 0xDAB5_BFFA;

    fn version(agent: &str) -> VersionMessage {
        let local = IpAddr::V4(Ipv4Addr::LOCALHOST);
        VersionMessage {
            protocol_version: PROTOCOL_VERSION,
            services: ServiceFlags::NONE,
            timestamp: Timestamp::new(1_700_000_000),
            receiver: PeerAddress::new(local, 0),
            sender: PeerAddress::new(local, 0),
            nonce: 42,
            user_agent: agent.to_string(),
            start_height: 0,
            relay: true,
        }
    }

    async fn next_event(rx: &mut mpsc::Receiver<TransportEvent>) -> TransportEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event in time")
            .expect("channel open")
    }

    #[tokio::test]
    async fn handshake_then_messages_flow_both_ways() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (mut reader, mut writer) = stream.into_split();
            let Message::Version(ours) = read_frame(&mut reader, MAGIC).await.unwrap() else {
                panic!("expected version first");
            };
            write_frame(&mut writer, MAGIC, &Message::Version(version("/remote/")))
                .await
                .unwrap();
            write_frame(&mut writer, MAGIC, &Message::Verack).await.unwrap();
            assert_eq!(read_frame(&mut reader, MAGIC).await.unwrap(), Message::Verack);
            write_frame(&mut writer, MAGIC, &Message::Ping(9)).await.unwrap();
            let reply = read_frame(&mut reader, MAGIC).await.unwrap();
            (ours, reply)
        });

        let (tx, mut rx) = mpsc::channel(16);
        let transport = TcpTransport::new(MAGIC, tx, Handle::current());
        let id = transport.connect(addr, &version("/local/"));

        match next_event(&mut rx).await {
            TransportEvent::Connected { id: got, version } => {
                assert_eq!(got, id);
                assert_eq!(version.user_agent, "/remote/");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            next_event(&mut rx).await,
            TransportEvent::MessageReceived {
                id,
                message: Message::Ping(9)
            }
        );
        transport.send(id, Message::Pong(9));

        let (ours, reply) = peer.await.unwrap();
        assert_eq!(ours.user_agent, "/local/");
        assert_eq!(reply, Message::Pong(9));
    }

    #[tokio::test]
    async fn refused_dial_reports_disconnect_with_error() {
        // Bind then drop to get a port nobody listens on.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let (tx, mut rx) = mpsc::channel(16);
        let transport = TcpTransport::new(MAGIC, tx, Handle::current());
        let id = transport.connect(addr, &version("/local/"));

        match next_event(&mut rx).await {
            TransportEvent::Disconnected { id: got, error } => {
                assert_eq!(got, id);
                assert!(error.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(transport.active(), 0);
    }

    #[tokio::test]
    async fn explicit_disconnect_reports_once() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let transport = TcpTransport::new(MAGIC, tx, Handle::current());
        let id = transport.connect(addr, &version("/local/"));
        let _held = listener.accept().await.unwrap();

        transport.disconnect(id);
        transport.disconnect(id);

        assert_eq!(
            next_event(&mut rx).await,
            TransportEvent::Disconnected { id, error: None }
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(transport.active(), 0);
    }

    #[test]
    fn ids_are_unique() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (tx, _rx) = mpsc::channel(16);
        let transport = TcpTransport::new(MAGIC, tx, runtime.handle().clone());
        let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let a = transport.connect(addr, &version("/a/"));
        let b = transport.connect(addr, &version("/b/"));
        assert_ne!(a, b);
    }
}
