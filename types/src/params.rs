//! Per-network chain parameters.

use serde::{Deserialize, Serialize};

use crate::{BlockHash, BlockHeader, NetworkId};

/// Fixed parameters a node needs to join a network: message magic, default
/// port, the version stamped on new blocks and the genesis header that seeds
/// an empty chain store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    pub network: NetworkId,
    pub magic: u32,
    pub default_port: u16,
    pub block_version: u32,
    pub genesis: BlockHeader,
    /// File name a persistent chain store should use for this network.
    pub store_file_name: String,
}

impl ChainParams {
    pub fn for_network(network: NetworkId) -> Self {
        let genesis = match network {
            NetworkId::Bitcoin => genesis_header(
                BITCOIN_MERKLE_ROOT,
                1_231_006_505,
                0x1d00_ffff,
                2_083_236_893,
            ),
            NetworkId::BitcoinTestnet => {
                genesis_header(BITCOIN_MERKLE_ROOT, 1_296_688_602, 0x1d00_ffff, 414_098_458)
            }
            NetworkId::BitcoinRegtest => {
                genesis_header(BITCOIN_MERKLE_ROOT, 1_296_688_602, 0x207f_ffff, 2)
            }
            NetworkId::Litecoin => genesis_header(
                LITECOIN_MERKLE_ROOT,
                1_317_972_665,
                0x1e0f_fff0,
                2_084_524_493,
            ),
            NetworkId::Vertcoin => genesis_header(
                VERTCOIN_MERKLE_ROOT,
                1_389_311_371,
                0x1e0f_fff0,
                5_749_262,
            ),
        };
        Self {
            network,
            magic: network.magic(),
            default_port: network.default_port(),
            block_version: block_version(network),
            genesis,
            store_file_name: format!("{}-headers.db", network.as_str()),
        }
    }

    pub fn genesis_hash(&self) -> BlockHash {
        self.genesis.hash()
    }
}

/// Version stamped on new headers. Bitcoin networks still use 1.
fn block_version(network: NetworkId) -> u32 {
    match network {
        NetworkId::Bitcoin | NetworkId::BitcoinTestnet | NetworkId::BitcoinRegtest => 1,
        NetworkId::Litecoin | NetworkId::Vertcoin => 2,
    }
}

// Internal byte order of the well-known genesis merkle roots.
const BITCOIN_MERKLE_ROOT: [u8; 32] = [
    0x3b, 0xa3, 0xed, 0xfd, 0x7a, 0x7b, 0x12, 0xb2, 0x7a, 0xc7, 0x2c, 0x3e, 0x67, 0x76, 0x8f, 0x61,
    0x7f, 0xc8, 0x1b, 0xc3, 0x88, 0x8a, 0x51, 0x32, 0x3a, 0x9f, 0xb8, 0xaa, 0x4b, 0x1e, 0x5e, 0x4a,
];

const LITECOIN_MERKLE_ROOT: [u8; 32] = [
    0xd9, 0xce, 0xd4, 0xed, 0x11, 0x30, 0xf7, 0xb7, 0xfa, 0xad, 0x9b, 0xe2, 0x53, 0x23, 0xff, 0xaf,
    0xa3, 0x32, 0x32, 0xa1, 0x7c, 0x3e, 0xdf, 0x6c, 0xfd, 0x97, 0xbe, 0xe6, 0xba, 0xfb, 0xdd, 0x97,
];

const VERTCOIN_MERKLE_ROOT: [u8; 32] = [
    0xe7, 0x23, 0x01, 0xfc, 0x49, 0x32, 0x3e, 0xe1, 0x51, 0xcf, 0x10, 0x48, 0x23, 0x0f, 0x03, 0x2c,
    0xa5, 0x89, 0x75, 0x3b, 0xa7, 0x08, 0x62, 0x22, 0xa5, 0xc0, 0x23, 0xe3, 0xa0, 0x8c, 0xf3, 0x4a,
];

fn genesis_header(merkle_root: [u8; 32], timestamp: u32, bits: u32, nonce: u32) -> BlockHeader {
    BlockHeader {
        version: 1,
        previous_hash: BlockHash::ZERO,
        merkle_root: BlockHash::new(merkle_root),
        timestamp,
        bits,
        nonce,
    }
}
