//! In-process storage medium with quota and availability controls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::{check_quota, usage_bytes, KvStore};
use crate::error::StorageError;

/// Map-backed [`KvStore`].
///
/// A byte quota makes writes fail with `QuotaExceeded` once the stored
/// keys and values would exceed it; [`set_available`](Self::set_available)
/// makes every operation fail with `Unavailable`.
#[derive(Debug)]
pub struct InMemoryKvStore {
    items: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
    available: AtomicBool,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            quota: None,
            available: AtomicBool::new(true),
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota: Some(quota_bytes),
            ..Self::new()
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable(
                "in-memory store is switched off".to_string(),
            ))
        }
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryKvStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.ensure_available()?;
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        let mut items = self.items.write();
        let current = usage_bytes(items.iter());
        check_quota(self.quota, current, items.get(key), key, value)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        self.items.write().remove(key);
        Ok(())
    }

    fn remove_items(&self, keys: &[String]) -> Result<usize, StorageError> {
        self.ensure_available()?;
        let mut items = self.items.write();
        Ok(keys.iter().filter(|key| items.remove(*key).is_some()).count())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.ensure_available()?;
        Ok(self.items.read().keys().cloned().collect())
    }
}
