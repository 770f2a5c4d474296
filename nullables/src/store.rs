//! Nullable chain store: in-memory records with an operation log and
//! switchable failures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use peerchain_store::{ChainStore, MemoryChainStore, StoreError};
use peerchain_types::{BlockChainHeader, BlockHash};

/// A mutating call that reached the backing store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOp {
    Add { hash: BlockHash, height: u32 },
    Delete(BlockHash),
}

#[derive(Default)]
pub struct NullChainStore {
    backing: MemoryChainStore,
    ops: Mutex<Vec<StoreOp>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_adds: AtomicBool,
}

impl NullChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every successful add and delete, in call order.
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.backing.len().unwrap()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail only calls that append a record. Deletes still go through.
    pub fn set_fail_adds(&self, fail: bool) {
        self.fail_adds.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected read failure".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".into()));
        }
        Ok(())
    }

    fn check_add(&self) -> Result<(), StoreError> {
        self.check_write()?;
        if self.fail_adds.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected add failure".into()));
        }
        Ok(())
    }
}

impl ChainStore for NullChainStore {
    fn height(&self) -> Result<Option<u32>, StoreError> {
        self.check_read()?;
        self.backing.height()
    }

    fn head(&self) -> Result<Option<BlockChainHeader>, StoreError> {
        self.check_read()?;
        self.backing.head()
    }

    fn add_as_new_head(&self, record: &BlockChainHeader) -> Result<(), StoreError> {
        self.check_add()?;
        self.backing.add_as_new_head(record)?;
        self.ops.lock().unwrap().push(StoreOp::Add {
            hash: record.hash(),
            height: record.height,
        });
        Ok(())
    }

    fn delete_by_hash(&self, hash: &BlockHash) -> Result<(), StoreError> {
        self.check_write()?;
        self.backing.delete_by_hash(hash)?;
        self.ops.lock().unwrap().push(StoreOp::Delete(*hash));
        Ok(())
    }

    fn by_hash(&self, hash: &BlockHash) -> Result<Option<BlockChainHeader>, StoreError> {
        self.check_read()?;
        self.backing.by_hash(hash)
    }

    fn reorganize(
        &self,
        unwound: &[BlockHash],
        connect: &[BlockChainHeader],
    ) -> Result<(), StoreError> {
        self.check_write()?;
        if !connect.is_empty() {
            self.check_add()?;
        }
        self.backing.reorganize(unwound, connect)?;
        let mut ops = self.ops.lock().unwrap();
        ops.extend(unwound.iter().map(|hash| StoreOp::Delete(*hash)));
        ops.extend(connect.iter().map(|record| StoreOp::Add {
            hash: record.hash(),
            height: record.height,
        }));
        Ok(())
    }
}
