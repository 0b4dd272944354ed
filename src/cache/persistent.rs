//! Persistent Tier Module
//!
//! Best-effort durable tier over a [`KvStore`]. Every storage or
//! serialization fault is logged and absorbed here: writes and deletes
//! degrade to no-ops, reads to misses, counts to zero.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{trace, warn};

use crate::cache::{CacheEntry, CacheTier, TierKind, DEFAULT_KEY_PREFIX};
use crate::storage::KvStore;

// == Persistent Tier ==
pub struct PersistentTier<T> {
    store: Arc<dyn KvStore>,
    /// Reserved prefix; keys outside it belong to someone else.
    prefix: String,
    _payload: PhantomData<fn() -> T>,
}

impl<T> PersistentTier<T> {
    /// An empty `prefix` would claim every key in the medium, so it falls
    /// back to [`DEFAULT_KEY_PREFIX`].
    pub fn new(store: Arc<dyn KvStore>, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if prefix.is_empty() {
            warn!(
                fallback = DEFAULT_KEY_PREFIX,
                "persistent tier: empty key prefix, using default"
            );
            prefix = DEFAULT_KEY_PREFIX.to_string();
        }
        Self {
            store,
            prefix,
            _payload: PhantomData,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Keys under `prefix` (itself always inside the reserved prefix).
    fn owned_keys(&self, op: &'static str, prefix: &str) -> Vec<String> {
        match self.store.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|key| key.starts_with(&self.prefix) && key.starts_with(prefix))
                .collect(),
            Err(err) => {
                warn!(op = op, prefix = %prefix, error = %err, "persistent tier: failed to list keys");
                Vec::new()
            }
        }
    }

    /// Removes `keys` in one batch. A failed batch removes nothing.
    fn remove_all(&self, op: &'static str, keys: Vec<String>) -> usize {
        if keys.is_empty() {
            return 0;
        }
        match self.store.remove_items(&keys) {
            Ok(removed) => removed,
            Err(err) => {
                warn!(op = op, count = keys.len(), error = %err, "persistent tier: failed to remove entries");
                0
            }
        }
    }
}

impl<T> CacheTier<T> for PersistentTier<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn kind(&self) -> TierKind {
        TierKind::Persistent
    }

    fn set(&self, key: &str, entry: CacheEntry<T>) {
        let serialized = match serde_json::to_string(&entry) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(op = "set", key = %key, error = %err, "persistent tier: failed to serialize entry");
                return;
            }
        };
        if let Err(err) = self.store.set_item(key, &serialized) {
            warn!(op = "set", key = %key, error = %err, "persistent tier: write failed");
        }
    }

    fn get(&self, key: &str, now: u64) -> Option<CacheEntry<T>> {
        let raw = match self.store.get_item(key) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(op = "get", key = %key, error = %err, "persistent tier: read failed");
                return None;
            }
        };
        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(op = "get", key = %key, error = %err, "persistent tier: failed to deserialize entry");
                return None;
            }
        };
        if entry.is_expired_at(now) {
            trace!(key = %key, "persistent tier: dropped expired entry on read");
            self.delete(key);
            return None;
        }
        Some(entry)
    }

    fn delete(&self, key: &str) {
        if let Err(err) = self.store.remove_item(key) {
            warn!(op = "delete", key = %key, error = %err, "persistent tier: delete failed");
        }
    }

    fn delete_prefix(&self, prefix: &str) -> usize {
        let keys = self.owned_keys("delete_prefix", prefix);
        self.remove_all("delete_prefix", keys)
    }

    fn clear(&self) -> usize {
        let keys = self.owned_keys("clear", &self.prefix);
        self.remove_all("clear", keys)
    }

    fn sweep_expired(&self, now: u64) -> usize {
        let expired: Vec<String> = self
            .owned_keys("sweep_expired", &self.prefix)
            .into_iter()
            .filter(|key| {
                let raw = match self.store.get_item(key) {
                    Ok(Some(raw)) => raw,
                    Ok(None) => return false,
                    Err(err) => {
                        warn!(op = "sweep_expired", key = %key, error = %err, "persistent tier: read failed");
                        return false;
                    }
                };
                // Only the expiry stamp matters here; the payload stays opaque.
                match serde_json::from_str::<CacheEntry<serde::de::IgnoredAny>>(&raw) {
                    Ok(entry) => entry.is_expired_at(now),
                    Err(err) => {
                        warn!(op = "sweep_expired", key = %key, error = %err, "persistent tier: failed to deserialize entry");
                        false
                    }
                }
            })
            .collect();
        self.remove_all("sweep_expired", expired)
    }

    fn size(&self) -> usize {
        self.owned_keys("size", &self.prefix).len()
    }
}
