use std::net::IpAddr;

use peerchain_messages::PeerAddress;
use peerchain_network::AddressBook;
use peerchain_types::Timestamp;
use proptest::prelude::*;

proptest! {
    /// `ordered()` is newest first, untimed last, and stable among ties.
    #[test]
    fn ordered_is_sorted_and_stable(stamps in prop::collection::vec(prop::option::of(0u64..5), 0..40)) {
        let mut book = AddressBook::new();
        for (i, stamp) in stamps.iter().enumerate() {
            let ip = IpAddr::from([10, 1, (i / 256) as u8, (i % 256) as u8]);
            let mut address = PeerAddress::new(ip, 8333);
            address.timestamp = stamp.map(Timestamp::new);
            book.record(address);
        }

        let ordered = book.ordered();
        prop_assert_eq!(ordered.len(), stamps.len());

        let index_of = |a: &PeerAddress| match a.ip {
            IpAddr::V4(v4) => {
                let o = v4.octets();
                o[2] as usize * 256 + o[3] as usize
            }
            IpAddr::V6(_) => unreachable!(),
        };

        for pair in ordered.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            match (a.timestamp, b.timestamp) {
                (Some(x), Some(y)) => {
                    prop_assert!(x >= y);
                    if x == y {
                        prop_assert!(index_of(a) < index_of(b));
                    }
                }
                (None, Some(_)) => prop_assert!(false, "untimed before timed"),
                (None, None) => prop_assert!(index_of(a) < index_of(b)),
                (Some(_), None) => {}
            }
        }
    }
}
