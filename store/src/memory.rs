//! In-memory chain store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use peerchain_types::{BlockChainHeader, BlockHash};
use tracing::trace;

use crate::{ChainStore, StoreError};

#[derive(Default)]
struct Inner {
    records: HashMap<BlockHash, BlockChainHeader>,
    head: Option<BlockHash>,
}

impl Inner {
    fn insert_head(&mut self, record: &BlockChainHeader) -> BlockHash {
        let hash = record.hash();
        self.records.insert(hash, record.clone());
        self.head = Some(hash);
        hash
    }

    fn remove(&mut self, hash: &BlockHash) -> Option<BlockChainHeader> {
        let removed = self.records.remove(hash)?;
        if self.head == Some(*hash) {
            let parent = removed.previous_hash();
            self.head = self.records.contains_key(&parent).then_some(parent);
        }
        Some(removed)
    }
}

/// A mutex-guarded map of records plus a head pointer. Nothing survives the
/// process.
#[derive(Default)]
pub struct MemoryChainStore {
    inner: Mutex<Inner>,
}

impl MemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, head included.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

impl ChainStore for MemoryChainStore {
    fn height(&self) -> Result<Option<u32>, StoreError> {
        Ok(self.head()?.map(|record| record.height))
    }

    fn head(&self) -> Result<Option<BlockChainHeader>, StoreError> {
        let inner = self.lock()?;
        match inner.head {
            None => Ok(None),
            Some(hash) => inner
                .records
                .get(&hash)
                .cloned()
                .map(Some)
                .ok_or_else(|| StoreError::Corruption(format!("head {hash} has no record"))),
        }
    }

    fn add_as_new_head(&self, record: &BlockChainHeader) -> Result<(), StoreError> {
        let hash = self.lock()?.insert_head(record);
        trace!(%hash, height = record.height, "new head");
        Ok(())
    }

    fn delete_by_hash(&self, hash: &BlockHash) -> Result<(), StoreError> {
        if let Some(removed) = self.lock()?.remove(hash) {
            trace!(%hash, height = removed.height, "record deleted");
        }
        Ok(())
    }

    fn by_hash(&self, hash: &BlockHash) -> Result<Option<BlockChainHeader>, StoreError> {
        Ok(self.lock()?.records.get(hash).cloned())
    }

    fn reorganize(
        &self,
        unwound: &[BlockHash],
        connect: &[BlockChainHeader],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for hash in unwound {
            inner.remove(hash);
        }
        for record in connect {
            inner.insert_head(record);
        }
        trace!(unwound = unwound.len(), connected = connect.len(), "head replaced");
        Ok(())
    }
}
