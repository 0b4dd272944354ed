//! Memory Tier Module
//!
//! Process-lifetime key -> entry map. No capacity bound: entries leave only
//! through expiry or explicit clearing.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;

use crate::cache::{CacheEntry, CacheTier, TierKind};

// == Memory Tier ==
#[derive(Debug)]
pub struct MemoryTier<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T> MemoryTier<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for MemoryTier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CacheTier<T> for MemoryTier<T>
where
    T: Clone + Send + Sync,
{
    fn kind(&self) -> TierKind {
        TierKind::Memory
    }

    fn set(&self, key: &str, entry: CacheEntry<T>) {
        self.entries.write().insert(key.to_string(), entry);
    }

    fn get(&self, key: &str, now: u64) -> Option<CacheEntry<T>> {
        // Write lock: an expired hit is removed in place.
        let mut entries = self.entries.write();
        let expired = entries.get(key)?.is_expired_at(now);
        if expired {
            entries.remove(key);
            trace!(key = %key, "memory tier: dropped expired entry on read");
            return None;
        }
        entries.get(key).cloned()
    }

    fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn delete_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        count
    }

    fn sweep_expired(&self, now: u64) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    fn size(&self) -> usize {
        self.entries.read().len()
    }
}
