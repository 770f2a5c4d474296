//! Stored chain record: a header positioned in the chain.

use serde::{Deserialize, Serialize};

use crate::{BlockHash, BlockHeader, Work};

/// A header together with its height and the cumulative work of the chain
/// ending at it.
///
/// `height(child) == height(parent) + 1` and
/// `cumulative_work(child) == cumulative_work(parent) + child.work()`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockChainHeader {
    pub header: BlockHeader,
    pub height: u32,
    pub cumulative_work: Work,
}

impl BlockChainHeader {
    /// The root record: height 0, cumulative work equal to the header's own work.
    pub fn genesis(header: BlockHeader) -> Self {
        let cumulative_work = header.work();
        Self {
            header,
            height: 0,
            cumulative_work,
        }
    }

    /// Record for `header` placed directly on top of `parent`.
    ///
    /// The caller is responsible for `header.previous_hash == parent.hash()`.
    pub fn child_of(parent: &BlockChainHeader, header: BlockHeader) -> Self {
        let cumulative_work = &parent.cumulative_work + &header.work();
        Self {
            header,
            height: parent.height + 1,
            cumulative_work,
        }
    }

    pub fn hash(&self) -> BlockHash {
        self.header.hash()
    }

    pub fn previous_hash(&self) -> BlockHash {
        self.header.previous_hash
    }
}
