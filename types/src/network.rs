//! Network identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which chain a node participates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Bitcoin,
    #[serde(rename = "testnet")]
    BitcoinTestnet,
    #[serde(rename = "regtest")]
    BitcoinRegtest,
    Litecoin,
    Vertcoin,
}

impl NetworkId {
    /// Four-byte message start, as a little-endian `u32`.
    pub fn magic(&self) -> u32 {
        match self {
            Self::Bitcoin => 0xD9B4_BEF9,
            Self::BitcoinTestnet => 0x0709_110B,
            Self::BitcoinRegtest => 0xDAB5_BFFA,
            Self::Litecoin => 0xDBB6_C0FB,
            Self::Vertcoin => 0xDAB5_BFFA,
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Self::Bitcoin => 8333,
            Self::BitcoinTestnet => 18333,
            Self::BitcoinRegtest => 18444,
            Self::Litecoin => 9333,
            Self::Vertcoin => 5889,
        }
    }

    /// Human-readable name, also accepted by `FromStr`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::BitcoinTestnet => "testnet",
            Self::BitcoinRegtest => "regtest",
            Self::Litecoin => "litecoin",
            Self::Vertcoin => "vertcoin",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bitcoin" | "mainnet" => Ok(Self::Bitcoin),
            "testnet" | "testnet3" => Ok(Self::BitcoinTestnet),
            "regtest" => Ok(Self::BitcoinRegtest),
            "litecoin" => Ok(Self::Litecoin),
            "vertcoin" => Ok(Self::Vertcoin),
            other => Err(format!("unknown network: {other}")),
        }
    }
}
