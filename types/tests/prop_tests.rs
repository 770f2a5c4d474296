use proptest::prelude::*;

use peerchain_types::{BlockChainHeader, BlockHash, BlockHeader, Timestamp, TxHash, Work};

fn arb_header() -> impl Strategy<Value = BlockHeader> {
    (
        any::<u32>(),
        prop::array::uniform32(0u8..),
        prop::array::uniform32(0u8..),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
    )
        .prop_map(|(version, prev, merkle, timestamp, bits, nonce)| BlockHeader {
            version,
            previous_hash: BlockHash::new(prev),
            merkle_root: BlockHash::new(merkle),
            timestamp,
            bits,
            nonce,
        })
}

proptest! {
    /// Display then FromStr yields the same hash.
    #[test]
    fn block_hash_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        let parsed: BlockHash = hash.to_string().parse().unwrap();
        prop_assert_eq!(parsed, hash);
    }

    #[test]
    fn tx_hash_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        let parsed: TxHash = hash.to_string().parse().unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// BlockHash::is_zero is true only for all-zero bytes.
    #[test]
    fn block_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// A header survives bincode and keeps its hash.
    #[test]
    fn header_bincode_preserves_hash(header in arb_header()) {
        let encoded = bincode::serialize(&header).unwrap();
        let decoded: BlockHeader = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.hash(), header.hash());
    }

    /// Work is never negative and a child always carries at least its parent's work.
    #[test]
    fn child_work_is_monotonic(parent in arb_header(), child in arb_header()) {
        let parent = BlockChainHeader::genesis(parent);
        let child = BlockChainHeader::child_of(&parent, child);
        prop_assert!(child.cumulative_work >= parent.cumulative_work);
        prop_assert_eq!(child.height, parent.height + 1);
    }

    /// Summation is order independent.
    #[test]
    fn work_addition_commutes(a in any::<u64>(), b in any::<u64>()) {
        let (wa, wb) = (Work::from(a), Work::from(b));
        prop_assert_eq!(&wa + &wb, &wb + &wa);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
    }
}
