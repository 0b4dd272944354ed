//! Storage Media Module
//!
//! Durable string key/value stores that back the persistent cache tier.
//! A medium may be shared with unrelated data, so callers are expected to
//! scope their own keys by prefix.

mod file;
mod memory;

pub use file::FileKvStore;
pub use memory::InMemoryKvStore;

use crate::error::StorageError;

// == Kv Store ==
/// A fallible string key/value medium.
pub trait KvStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Removes every key in `keys` as one operation, returning how many were
    /// present. Media with costly writes override this to write once.
    fn remove_items(&self, keys: &[String]) -> Result<usize, StorageError> {
        let mut removed = 0;
        for key in keys {
            if self.get_item(key)?.is_some() {
                self.remove_item(key)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Every key currently held, including keys written by other users.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Bytes a document of `items` occupies against a quota.
pub(crate) fn usage_bytes<'a>(items: impl Iterator<Item = (&'a String, &'a String)>) -> usize {
    items.map(|(k, v)| k.len() + v.len()).sum()
}

/// Fails with `QuotaExceeded` if replacing `key`'s value with `value` would
/// push `current` usage past `quota`.
pub(crate) fn check_quota(
    quota: Option<usize>,
    current: usize,
    existing: Option<&String>,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let freed = existing.map(|old| key.len() + old.len()).unwrap_or(0);
    let needed = current - freed + key.len() + value.len();
    if needed > quota {
        return Err(StorageError::QuotaExceeded { needed, quota });
    }
    Ok(())
}
