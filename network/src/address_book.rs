//! Known peer addresses, ordered by recency.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use peerchain_messages::PeerAddress;

use crate::NetworkError;

#[derive(Clone, Debug, Default)]
pub struct AddressBook {
    entries: Vec<PeerAddress>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `address`, or refresh the stored entry for the same socket
    /// address. A rediscovery without a timestamp keeps the known one.
    pub fn record(&mut self, address: PeerAddress) {
        let key = address.socket_addr();
        match self.entries.iter_mut().find(|e| e.socket_addr() == key) {
            Some(existing) => {
                existing.services = address.services;
                if address.timestamp.is_some() {
                    existing.timestamp = address.timestamp;
                }
            }
            None => self.entries.push(address),
        }
    }

    /// Addresses sorted newest first. Entries without a timestamp come last.
    /// The sort is stable, so ties keep insertion order.
    pub fn ordered(&self) -> Vec<PeerAddress> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| match (a.timestamp, b.timestamp) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        sorted
    }

    /// First address of [`ordered`](Self::ordered) whose IP is not excluded.
    pub fn next_candidate(&self, excluding: &HashSet<IpAddr>) -> Option<PeerAddress> {
        self.ordered()
            .into_iter()
            .find(|address| !excluding.contains(&address.ip))
    }

    pub fn remove(&mut self, addr: &SocketAddr) -> Option<PeerAddress> {
        let index = self.entries.iter().position(|e| e.socket_addr() == *addr)?;
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a seed entry: either `"ip"` (uses `default_port`) or `"ip:port"`.
pub fn parse_seed(seed: &str, default_port: u16) -> Result<PeerAddress, NetworkError> {
    let seed = seed.trim();
    if let Ok(addr) = seed.parse::<SocketAddr>() {
        return Ok(PeerAddress::from(addr));
    }
    seed.parse::<IpAddr>()
        .map(|ip| PeerAddress::new(ip, default_port))
        .map_err(|_| NetworkError::InvalidAddress(seed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerchain_types::Timestamp;

    fn addr(last_octet: u8, timestamp: Option<u64>) -> PeerAddress {
        let address = PeerAddress::new(IpAddr::from([10, 0, 0, last_octet]), 8333);
        match timestamp {
            Some(secs) => address.with_timestamp(Timestamp::new(secs)),
            None => address,
        }
    }

    fn octets(addresses: &[PeerAddress]) -> Vec<u8> {
        addresses
            .iter()
            .map(|a| match a.ip {
                IpAddr::V4(v4) => v4.octets()[3],
                IpAddr::V6(_) => 0,
            })
            .collect()
    }

    #[test]
    fn ordered_newest_first_untimed_last() {
        let mut book = AddressBook::new();
        book.record(addr(1, None));
        book.record(addr(2, Some(100)));
        book.record(addr(3, None));
        book.record(addr(4, Some(300)));
        book.record(addr(5, Some(200)));

        assert_eq!(octets(&book.ordered()), vec![4, 5, 2, 1, 3]);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let mut book = AddressBook::new();
        book.record(addr(9, Some(50)));
        book.record(addr(7, Some(50)));
        book.record(addr(8, Some(50)));
        assert_eq!(octets(&book.ordered()), vec![9, 7, 8]);
    }

    #[test]
    fn record_refreshes_existing_entry() {
        let mut book = AddressBook::new();
        book.record(addr(1, Some(10)));
        book.record(addr(2, Some(20)));
        book.record(addr(1, Some(30)));
        assert_eq!(book.len(), 2);
        assert_eq!(octets(&book.ordered()), vec![1, 2]);

        book.record(addr(1, None));
        assert_eq!(book.ordered()[0].timestamp, Some(Timestamp::new(30)));
    }

    #[test]
    fn next_candidate_skips_ignored() {
        let mut book = AddressBook::new();
        book.record(addr(1, Some(300)));
        book.record(addr(2, Some(200)));

        let mut ignored = HashSet::new();
        assert_eq!(book.next_candidate(&ignored), Some(addr(1, Some(300))));

        ignored.insert(IpAddr::from([10, 0, 0, 1]));
        assert_eq!(book.next_candidate(&ignored), Some(addr(2, Some(200))));

        ignored.insert(IpAddr::from([10, 0, 0, 2]));
        assert_eq!(book.next_candidate(&ignored), None);
    }

    #[test]
    fn remove_by_socket_addr() {
        let mut book = AddressBook::new();
        book.record(addr(1, None));
        let removed = book.remove(&"10.0.0.1:8333".parse().unwrap());
        assert!(removed.is_some());
        assert!(book.is_empty());
        assert!(book.remove(&"10.0.0.1:8333".parse().unwrap()).is_none());
    }

    #[test]
    fn parse_seed_forms() {
        let with_port = parse_seed("192.168.1.5:18444", 8333).unwrap();
        assert_eq!(with_port.port, 18444);

        let bare = parse_seed(" 192.168.1.5 ", 8333).unwrap();
        assert_eq!(bare.port, 8333);

        let v6 = parse_seed("[::1]:9333", 8333).unwrap();
        assert_eq!(v6.port, 9333);

        assert!(matches!(
            parse_seed("seed.example.org", 8333),
            Err(NetworkError::InvalidAddress(_))
        ));
    }
}
