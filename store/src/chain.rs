//! Chain header storage trait.

use crate::StoreError;
use peerchain_types::{BlockChainHeader, BlockHash};

/// Persistent store of chain header records with a single designated head.
///
/// Calls arrive sequentially from one owner. Each mutating call either
/// completes or leaves the store as it was.
pub trait ChainStore {
    /// Height of the head record, `None` for an empty store.
    fn height(&self) -> Result<Option<u32>, StoreError>;

    fn head(&self) -> Result<Option<BlockChainHeader>, StoreError>;

    /// Append a record and make it the head.
    fn add_as_new_head(&self, record: &BlockChainHeader) -> Result<(), StoreError>;

    /// Remove a record. Removing the head repoints the head to the removed
    /// record's parent. Removing an absent hash is a no-op.
    fn delete_by_hash(&self, hash: &BlockHash) -> Result<(), StoreError>;

    fn by_hash(&self, hash: &BlockHash) -> Result<Option<BlockChainHeader>, StoreError>;

    /// Delete `unwound` in order, then append each of `connect` as the new
    /// head, as one unit. On error no part of the change is visible.
    fn reorganize(
        &self,
        unwound: &[BlockHash],
        connect: &[BlockChainHeader],
    ) -> Result<(), StoreError>;

    fn contains(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.by_hash(hash)?.is_some())
    }
}
