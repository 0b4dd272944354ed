//! Cache Module
//!
//! Dual-tier cache: an in-memory tier in front of a persistent tier, with
//! namespaced keys, absolute-expiry TTLs and lazy expiry on read.

mod entry;
mod key;
mod manager;
mod memory;
mod namespaces;
mod persistent;
mod query;
mod stats;
mod tier;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, Clock, ManualClock, SystemClock};
pub use key::{build_key, KeyBuilder, KEY_SEPARATOR};
pub use manager::{CacheManager, ClearOutcome};
pub use memory::MemoryTier;
pub use namespaces::{names, BlogCache, NamespaceCache, Ttl};
pub use persistent::PersistentTier;
pub use query::{clear_all_api_cache, QueryCache, QueryCacheStats};
pub use stats::{CacheReport, CacheStats, RequestStats, StatsReporter, TierStats};
pub use tier::{CacheTier, TierKind};

// == Public Constants ==
/// Reserved key prefix used when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "portal_";
