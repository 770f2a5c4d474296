//! Header chain selection and headers-first sync.
//!
//! The canonical chain is the one with the most cumulative work. A header
//! extending the head is appended; a header extending a stored ancestor
//! triggers a reorg only when its branch becomes strictly heavier.

use std::sync::Arc;

use peerchain_messages::{
    BlockMessage, InventoryKind, InventoryVector, LocatorMessage, Message, RejectCode,
    RejectMessage,
};
use peerchain_store::{ChainStore, StoreError};
use peerchain_types::{BlockChainHeader, BlockHash, BlockHeader};
use tracing::{debug, info, warn};

use crate::{ConnectionId, ConnectionPool, Transport};

/// How an accepted header changed the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acceptance {
    /// The store was empty; genesis was seeded and the header placed on it.
    Bootstrapped,
    /// The header extended the current head.
    Extended,
    /// A heavier branch replaced the head; `disconnected` records were unwound.
    Reorganized { disconnected: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The parent is known but its branch does not outweigh the head.
    LighterBranch,
    /// The parent is not in the store at all.
    UnknownParent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderOutcome {
    Accepted(Acceptance),
    Rejected(Rejection),
}

impl HeaderOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Result of applying one `headers` message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub accepted: usize,
    /// Why the batch stopped early, if it did.
    pub stopped: Option<Rejection>,
    /// Peer asked for the next batch.
    pub next_request: Option<ConnectionId>,
}

pub struct ChainSynchronizer<S: ChainStore> {
    store: Option<Arc<S>>,
    genesis: BlockHeader,
    download: bool,
}

impl<S: ChainStore> ChainSynchronizer<S> {
    /// Chain download only happens when both requested and a store is present.
    pub fn new(store: Option<Arc<S>>, genesis: BlockHeader, download: bool) -> Self {
        let download = download && store.is_some();
        Self {
            store,
            genesis,
            download,
        }
    }

    pub fn downloads_chain(&self) -> bool {
        self.download
    }

    pub fn genesis_hash(&self) -> BlockHash {
        self.genesis.hash()
    }

    pub fn store(&self) -> Option<&Arc<S>> {
        self.store.as_ref()
    }

    /// Current head height, `None` without a store or with an empty one.
    pub fn height(&self) -> Result<Option<u32>, StoreError> {
        match &self.store {
            Some(store) => store.height(),
            None => Ok(None),
        }
    }

    /// Apply one header under the cumulative-work rule.
    ///
    /// Every check runs before the single store mutation, so a failure at
    /// any step leaves the chain untouched. Refused outright while chain
    /// download is off.
    pub fn apply_header(&self, header: &BlockHeader) -> Result<HeaderOutcome, StoreError> {
        if !self.download {
            return Err(StoreError::Unavailable("chain download disabled".into()));
        }
        let store = self
            .store
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("no chain store configured".into()))?;

        let current = match store.head()? {
            Some(head) => head,
            None => return self.bootstrap(store, header),
        };
        let current_hash = current.hash();

        if header.previous_hash == current_hash {
            let record = BlockChainHeader::child_of(&current, header.clone());
            store.add_as_new_head(&record)?;
            debug!(height = record.height, work = %record.cumulative_work, "chain extended");
            return Ok(HeaderOutcome::Accepted(Acceptance::Extended));
        }

        let Some(parent) = store.by_hash(&header.previous_hash)? else {
            debug!(hash = %header.hash(), previous = %header.previous_hash, "unknown parent");
            return Ok(HeaderOutcome::Rejected(Rejection::UnknownParent));
        };

        let candidate = BlockChainHeader::child_of(&parent, header.clone());
        if candidate.cumulative_work <= current.cumulative_work {
            debug!(
                hash = %candidate.hash(),
                work = %candidate.cumulative_work,
                head_work = %current.cumulative_work,
                "branch not heavier than head"
            );
            return Ok(HeaderOutcome::Rejected(Rejection::LighterBranch));
        }

        let unwound = canonical_path_to(store, &current, &parent)?;
        store.reorganize(&unwound, std::slice::from_ref(&candidate))?;

        info!(
            fork_height = parent.height,
            disconnected = unwound.len(),
            height = candidate.height,
            work = %candidate.cumulative_work,
            "chain reorganized"
        );
        Ok(HeaderOutcome::Accepted(Acceptance::Reorganized {
            disconnected: unwound.len(),
        }))
    }

    /// Seed an empty store with genesis at height 0 and `header` at height 1
    /// in one store call. The header's parent is not checked. A header that
    /// is genesis itself seeds genesis alone.
    fn bootstrap(&self, store: &S, header: &BlockHeader) -> Result<HeaderOutcome, StoreError> {
        let genesis = BlockChainHeader::genesis(self.genesis.clone());
        let genesis_hash = genesis.hash();

        if header.hash() == genesis_hash {
            store.add_as_new_head(&genesis)?;
            info!(%genesis_hash, "chain seeded with genesis");
            return Ok(HeaderOutcome::Accepted(Acceptance::Bootstrapped));
        }
        if header.previous_hash != genesis_hash {
            debug!(hash = %header.hash(), previous = %header.previous_hash, "first header does not build on genesis");
        }

        let first = BlockChainHeader::child_of(&genesis, header.clone());
        store.reorganize(&[], &[genesis, first.clone()])?;
        info!(%genesis_hash, work = %first.cumulative_work, "chain seeded with genesis and first header");
        Ok(HeaderOutcome::Accepted(Acceptance::Bootstrapped))
    }

    /// Ask one random connected peer for headers after our head (or genesis).
    pub fn begin_sync<T: Transport>(&self, pool: &ConnectionPool<T>) -> Option<ConnectionId> {
        if !self.download {
            return None;
        }
        let peer = pool.random_connected()?;

        let anchor = match self.store.as_deref().map(|s| s.head()).transpose() {
            Ok(head) => head.flatten().map(|h| h.hash()).unwrap_or_else(|| self.genesis_hash()),
            Err(e) => {
                warn!(error = %e, "could not read head, sync postponed");
                return None;
            }
        };

        let request = Message::GetHeaders(LocatorMessage::from_hash(anchor));
        match pool.send(peer, request) {
            Ok(()) => {
                debug!(%peer, %anchor, "requested headers");
                Some(peer)
            }
            Err(e) => {
                warn!(%peer, error = %e, "header request failed");
                None
            }
        }
    }

    /// Apply a `headers` batch in order, stopping at the first header that
    /// is not accepted. Another batch is requested whenever this one moved
    /// the chain forward.
    pub fn on_headers_batch<T: Transport>(
        &self,
        headers: &[BlockHeader],
        pool: &ConnectionPool<T>,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for header in headers {
            match self.apply_header(header) {
                Ok(HeaderOutcome::Accepted(_)) => report.accepted += 1,
                Ok(HeaderOutcome::Rejected(reason)) => {
                    debug!(hash = %header.hash(), ?reason, "header batch stopped");
                    report.stopped = Some(reason);
                    break;
                }
                Err(e) => {
                    warn!(hash = %header.hash(), error = %e, "store error while applying headers");
                    break;
                }
            }
        }

        if report.accepted > 0 {
            if let Ok(Some(height)) = self.height() {
                info!(height, accepted = report.accepted, "headers applied");
            }
            report.next_request = self.begin_sync(pool);
        }
        report
    }

    /// Apply a block's header, reject it back to the sender when it loses
    /// fork choice, and relay it to every other connected peer. Without
    /// chain download the block is only relayed.
    pub fn on_block<T: Transport>(
        &self,
        block: &BlockMessage,
        from: ConnectionId,
        pool: &ConnectionPool<T>,
    ) -> Option<Message> {
        let hash = block.header.hash();
        if !self.download {
            let relayed = pool.broadcast(&Message::Block(block.clone()), Some(from));
            debug!(%hash, relayed, "block relayed without applying");
            return None;
        }
        let response = match self.apply_header(&block.header) {
            Ok(HeaderOutcome::Rejected(_)) => Some(Message::Reject(RejectMessage::new(
                "block",
                RejectCode::Invalid,
                "orphan block",
                Some(hash),
            ))),
            Ok(HeaderOutcome::Accepted(_)) => None,
            Err(e) => {
                warn!(%hash, error = %e, "store error while applying block");
                None
            }
        };

        let relayed = pool.broadcast(&Message::Block(block.clone()), Some(from));
        debug!(%hash, relayed, "block relayed");
        response
    }

    /// Build a `getdata` for the advertised items worth fetching.
    ///
    /// Blocks are fetched when downloading and not already stored.
    /// Transactions are fetched when downloading or when someone observes them.
    pub fn on_inventory(&self, vectors: &[InventoryVector], observing: bool) -> Option<Message> {
        let mut wanted = Vec::new();

        for vector in vectors {
            match vector.kind {
                InventoryKind::Block => {
                    if !self.download {
                        continue;
                    }
                    let known = match self.store.as_deref() {
                        Some(store) => store.contains(&vector.hash).unwrap_or_else(|e| {
                            warn!(hash = %vector.hash, error = %e, "store lookup failed");
                            false
                        }),
                        None => false,
                    };
                    if !known {
                        wanted.push(*vector);
                    }
                }
                InventoryKind::Transaction => {
                    if self.download || observing {
                        wanted.push(*vector);
                    }
                }
                InventoryKind::Error => {}
            }
        }

        (!wanted.is_empty()).then(|| Message::GetData(wanted))
    }
}

/// Hashes of the canonical chain from `head` down to, not including,
/// `ancestor`, head first. The walk is bounded by the height difference.
fn canonical_path_to<S: ChainStore>(
    store: &S,
    head: &BlockChainHeader,
    ancestor: &BlockChainHeader,
) -> Result<Vec<BlockHash>, StoreError> {
    let target = ancestor.hash();
    let steps = head.height.checked_sub(ancestor.height).ok_or_else(|| {
        StoreError::Corruption(format!(
            "fork point {target} at height {} is above head at {}",
            ancestor.height, head.height
        ))
    })?;

    let mut path = Vec::with_capacity(steps as usize);
    let mut cursor = head.clone();
    for _ in 0..steps {
        path.push(cursor.hash());
        let previous = cursor.previous_hash();
        cursor = store.by_hash(&previous)?.ok_or_else(|| {
            StoreError::Corruption(format!("canonical chain broken at {previous}"))
        })?;
    }

    if cursor.hash() != target {
        return Err(StoreError::Corruption(format!(
            "fork point {target} is not on the canonical chain"
        )));
    }
    Ok(path)
}
