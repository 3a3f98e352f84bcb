use std::collections::{HashSet, VecDeque};
use tokio::sync::{Mutex, MutexGuard};

/// Size above which the cache is trimmed
pub const SOFT_CAPACITY: usize = 200;
/// Number of most recent ids kept after a trim
pub const TRIM_TARGET: usize = 150;

/// Bounded set of provider photo ids served recently.
///
/// Only reduces immediate repeats; it is process-local and forgets
/// everything on restart.
#[derive(Debug, Default)]
pub struct RecencyCache {
    inner: Mutex<RecentIds>,
}

impl RecencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the cache for a check/insert/trim sequence
    pub async fn lock(&self) -> MutexGuard<'_, RecentIds> {
        self.inner.lock().await
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.inner.lock().await.contains(id)
    }

    pub async fn record<I: IntoIterator<Item = u64>>(&self, ids: I) {
        self.inner.lock().await.record(ids);
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }
}

/// Ids in insertion order, oldest first
#[derive(Debug, Default)]
pub struct RecentIds {
    order: VecDeque<u64>,
    members: HashSet<u64>,
}

impl RecentIds {
    pub fn contains(&self, id: u64) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Inserts ids as most recent, then trims to `TRIM_TARGET` once
    /// `SOFT_CAPACITY` is exceeded. Re-inserting an id refreshes it.
    pub fn record<I: IntoIterator<Item = u64>>(&mut self, ids: I) {
        for id in ids {
            if !self.members.insert(id) {
                self.order.retain(|existing| *existing != id);
            }
            self.order.push_back(id);
        }

        if self.order.len() > SOFT_CAPACITY {
            let excess = self.order.len() - TRIM_TARGET;
            for id in self.order.drain(..excess) {
                self.members.remove(&id);
            }
            tracing::debug!(evicted = excess, kept = self.order.len(), "Trimmed recency cache");
        }
    }
}
