//! Cache Manager Module
//!
//! Facade over the two tiers: memory-first reads with promotion from the
//! persistent tier, write-through sets, and namespace or global clearing.
//!
//! The manager is a pure lookup/store layer. Fetching on a miss is the
//! caller's job:
//!
//! ```ignore
//! if let Some(list) = cache.get("appointments", "list", &params)? {
//!     return Ok(list);
//! }
//! let list = api.fetch_appointments(&params).await?;
//! cache.set("appointments", "list", list.clone(), &params, Ttl::SHORT)?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, trace};

use crate::cache::stats::RequestCounters;
use crate::cache::{
    CacheEntry, CacheStats, CacheTier, Clock, KeyBuilder, MemoryTier, PersistentTier, SystemClock,
    TierStats, DEFAULT_KEY_PREFIX,
};
use crate::error::Result;
use crate::storage::KvStore;

/// Entries removed from each tier by a bulk operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ClearOutcome {
    pub memory: usize,
    pub persistent: usize,
}

impl ClearOutcome {
    pub fn total(&self) -> usize {
        self.memory + self.persistent
    }
}

// == Cache Manager ==
pub struct CacheManager<T = Value> {
    keys: KeyBuilder,
    memory: Box<dyn CacheTier<T>>,
    persistent: Box<dyn CacheTier<T>>,
    clock: Arc<dyn Clock>,
    counters: RequestCounters,
}

impl<T> CacheManager<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // == Constructor ==
    /// Memory tier in front of a persistent tier over `store`, on wall-clock time.
    ///
    /// An empty `prefix` is replaced by [`DEFAULT_KEY_PREFIX`].
    pub fn new(prefix: impl Into<String>, store: Arc<dyn KvStore>) -> Self {
        let mut prefix = prefix.into();
        if prefix.is_empty() {
            prefix = DEFAULT_KEY_PREFIX.to_string();
        }
        Self::with_tiers(
            KeyBuilder::new(prefix.clone()),
            Box::new(MemoryTier::new()),
            Box::new(PersistentTier::new(store, prefix)),
            Arc::new(SystemClock),
        )
    }

    /// Assembles a manager from arbitrary tiers.
    ///
    /// `persistent` must only ever hold keys under `keys.prefix()`.
    pub fn with_tiers(
        keys: KeyBuilder,
        memory: Box<dyn CacheTier<T>>,
        persistent: Box<dyn CacheTier<T>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            keys,
            memory,
            persistent,
            clock,
            counters: RequestCounters::default(),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key_builder(&self) -> &KeyBuilder {
        &self.keys
    }

    /// Direct access to the memory tier, for inspection.
    pub fn memory(&self) -> &dyn CacheTier<T> {
        self.memory.as_ref()
    }

    /// Direct access to the persistent tier, for inspection.
    pub fn persistent(&self) -> &dyn CacheTier<T> {
        self.persistent.as_ref()
    }

    // == Get ==
    /// Looks up `(namespace, key, params)`.
    ///
    /// Memory is consulted strictly before the persistent tier. A persistent
    /// hit is copied into memory with its original `expires_at`.
    pub fn get<P>(&self, namespace: &str, key: &str, params: &P) -> Result<Option<T>>
    where
        P: Serialize + ?Sized,
    {
        let cache_key = self.keys.build(namespace, key, params)?;
        let now = self.clock.now_ms();

        if let Some(entry) = self.memory.get(&cache_key, now) {
            self.counters.record_memory_hit();
            trace!(
                tier = %self.memory.kind(),
                key = %cache_key,
                ttl_remaining_ms = entry.ttl_remaining_ms(now),
                "cache hit"
            );
            return Ok(Some(entry.data));
        }

        if let Some(entry) = self.persistent.get(&cache_key, now) {
            self.counters.record_persistent_hit();
            debug!(
                tier = %self.persistent.kind(),
                key = %cache_key,
                ttl_remaining_ms = entry.ttl_remaining_ms(now),
                "cache hit, promoting to {}",
                self.memory.kind()
            );
            let data = entry.data.clone();
            self.memory.set(&cache_key, entry);
            return Ok(Some(data));
        }

        self.counters.record_miss();
        trace!(key = %cache_key, "cache miss");
        Ok(None)
    }

    // == Set ==
    /// Stores `data` in both tiers, expiring `ttl` from now.
    ///
    /// Memory is written first; a failed persistent write leaves the memory
    /// entry in place.
    pub fn set<P>(&self, namespace: &str, key: &str, data: T, params: &P, ttl: Duration) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        let cache_key = self.keys.build(namespace, key, params)?;
        let entry = CacheEntry::new(data, self.clock.now_ms(), ttl);
        trace!(key = %cache_key, expires_at = entry.expires_at, "cache set");

        self.memory.set(&cache_key, entry.clone());
        self.persistent.set(&cache_key, entry);
        Ok(())
    }

    // == Delete ==
    /// Removes the key from both tiers. Missing keys are fine.
    pub fn delete<P>(&self, namespace: &str, key: &str, params: &P) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        let cache_key = self.keys.build(namespace, key, params)?;
        self.memory.delete(&cache_key);
        self.persistent.delete(&cache_key);
        Ok(())
    }

    // == Clear Namespace ==
    /// Removes every key built with `namespace` from both tiers.
    pub fn clear_namespace(&self, namespace: &str) -> Result<ClearOutcome> {
        let prefix = self.keys.namespace_prefix(namespace)?;
        let outcome = ClearOutcome {
            memory: self.memory.delete_prefix(&prefix),
            persistent: self.persistent.delete_prefix(&prefix),
        };
        info!(
            namespace = %namespace,
            memory = outcome.memory,
            persistent = outcome.persistent,
            "cleared cache namespace"
        );
        Ok(outcome)
    }

    // == Clear All ==
    /// Empties both tiers across all namespaces.
    pub fn clear_all(&self) -> ClearOutcome {
        let outcome = ClearOutcome {
            memory: self.memory.clear(),
            persistent: self.persistent.clear(),
        };
        info!(
            memory = outcome.memory,
            persistent = outcome.persistent,
            "cleared all cache entries"
        );
        outcome
    }

    // == Clear Expired ==
    /// Sweeps expired entries out of both tiers.
    pub fn clear_expired(&self) -> ClearOutcome {
        let now = self.clock.now_ms();
        let outcome = ClearOutcome {
            memory: self.memory.sweep_expired(now),
            persistent: self.persistent.sweep_expired(now),
        };
        if outcome.total() > 0 {
            info!(
                memory = outcome.memory,
                persistent = outcome.persistent,
                "swept expired cache entries"
            );
        } else {
            debug!("expiry sweep: nothing to remove");
        }
        outcome
    }

    // == Stats ==
    /// Raw per-tier entry counts plus request counters.
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            memory: TierStats {
                entries: self.memory.size(),
            },
            persistent: TierStats {
                entries: self.persistent.size(),
            },
            requests: self.counters.snapshot(),
        }
    }
}
