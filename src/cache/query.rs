//! Query Cache Module
//!
//! Boundary to the state-management store's own per-endpoint result cache.
//! The cache manager never reads or writes that store's entries; it only
//! asks it for counts and tells it to reset.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::cache::{CacheManager, ClearOutcome};

/// Counts reported by the external query cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryCacheStats {
    /// Cached or in-flight queries
    pub queries: usize,
    /// Registered mutations
    pub mutations: usize,
    /// Cached queries per remote endpoint
    pub endpoints: BTreeMap<String, usize>,
}

/// External per-endpoint result cache.
pub trait QueryCache: Send + Sync {
    fn stats(&self) -> QueryCacheStats;

    /// Drops every cached endpoint result.
    fn reset(&self);
}

// == Clear All Api Cache ==
/// The "clear everything" action: empties both cache tiers, then resets
/// the external query cache.
pub fn clear_all_api_cache<T>(manager: &CacheManager<T>, query_cache: &dyn QueryCache) -> ClearOutcome
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let outcome = manager.clear_all();
    query_cache.reset();
    info!(
        memory = outcome.memory,
        persistent = outcome.persistent,
        "cleared all cached API data"
    );
    outcome
}
