//! Cache Tier Module
//!
//! Common interface for the memory (L1) and persistent (L2) tiers, so the
//! manager's promotion and write-through logic never depends on a concrete
//! storage medium.

use std::fmt;

use serde::Serialize;

use crate::cache::CacheEntry;

/// Which tier an operation or statistic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Memory,
    Persistent,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierKind::Memory => write!(f, "memory"),
            TierKind::Persistent => write!(f, "persistent"),
        }
    }
}

// == Cache Tier ==
/// A key -> [`CacheEntry`] store with lazy expiry.
///
/// Implementations never return an entry at or past its `expires_at`, and
/// never fail: faults are absorbed inside the tier.
pub trait CacheTier<T>: Send + Sync {
    fn kind(&self) -> TierKind;

    /// Stores or overwrites `key`.
    fn set(&self, key: &str, entry: CacheEntry<T>);

    /// Returns the entry if live at `now`, otherwise removes it and returns `None`.
    fn get(&self, key: &str, now: u64) -> Option<CacheEntry<T>>;

    /// Removes `key` if present.
    fn delete(&self, key: &str);

    /// Removes every key starting with `prefix`, returning how many went.
    fn delete_prefix(&self, prefix: &str) -> usize;

    /// Removes every entry this tier owns.
    fn clear(&self) -> usize;

    /// Removes every entry expired at `now`.
    fn sweep_expired(&self, now: u64) -> usize;

    /// Raw number of stored entries, expired-but-unswept ones included.
    fn size(&self) -> usize;
}
