//! Cache Statistics Module
//!
//! Per-tier entry counts, request counters, and the report that merges them
//! with the external query cache's own numbers.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{CacheManager, QueryCache, QueryCacheStats};

// == Tier Stats ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierStats {
    /// Raw stored entries, including expired entries not yet read or swept
    pub entries: usize,
}

// == Request Stats ==
/// Outcome counts of `get` calls since the manager was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    /// Served from the memory tier
    pub memory_hits: u64,
    /// Served from the persistent tier and promoted to memory
    pub persistent_hits: u64,
    /// Found in neither tier
    pub misses: u64,
}

impl RequestStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.persistent_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

// == Cache Stats ==
/// Snapshot returned by [`CacheManager::get_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub memory: TierStats,
    pub persistent: TierStats,
    pub requests: RequestStats,
}

// == Request Counters ==
/// Lock-free counters the manager bumps on every `get`.
#[derive(Debug, Default)]
pub(crate) struct RequestCounters {
    memory_hits: AtomicU64,
    persistent_hits: AtomicU64,
    misses: AtomicU64,
}

impl RequestCounters {
    pub(crate) fn record_memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_persistent_hit(&self) {
        self.persistent_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RequestStats {
        RequestStats {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            persistent_hits: self.persistent_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

// == Cache Report ==
/// Display-only aggregate of both cache layers.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    pub memory: TierStats,
    pub persistent: TierStats,
    pub requests: RequestStats,
    pub hit_rate: f64,
    /// `None` when no query cache is attached
    pub query_cache: Option<QueryCacheStats>,
    pub generated_at: DateTime<Utc>,
}

/// Builds [`CacheReport`]s. Never mutates either cache.
pub struct StatsReporter;

impl StatsReporter {
    pub fn report<T>(manager: &CacheManager<T>, query_cache: Option<&dyn QueryCache>) -> CacheReport
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let stats = manager.get_stats();
        CacheReport {
            memory: stats.memory,
            persistent: stats.persistent,
            requests: stats.requests,
            hit_rate: stats.requests.hit_rate(),
            query_cache: query_cache.map(|qc| qc.stats()),
            generated_at: Utc::now(),
        }
    }
}
