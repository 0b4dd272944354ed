//! File-backed storage medium.
//!
//! Holds the whole store as one JSON object on disk. The document is read
//! once at open and rewritten after every mutation through a temp file and
//! rename, so a crash mid-write leaves the previous document intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{check_quota, usage_bytes, KvStore};
use crate::error::StorageError;

#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl FileKvStore {
    // == Open ==
    /// Opens the store at `path`, starting empty if the file does not exist.
    ///
    /// A `quota` of `None` means unlimited.
    pub fn open(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), items = items.len(), "opened file store");

        Ok(Self {
            path,
            items: Mutex::new(items),
            quota,
        })
    }

    // == Open Or Recover ==
    /// Like [`open`](Self::open), but never fails.
    ///
    /// An unreadable or corrupt document is moved aside to `<path>.corrupt`
    /// and the store starts empty. If it cannot be moved, later writes
    /// overwrite it.
    pub fn open_or_recover(path: impl AsRef<Path>, quota: Option<usize>) -> Self {
        let path = path.as_ref();
        match Self::open(path, quota) {
            Ok(store) => store,
            Err(err) => {
                let aside = path.with_extension("corrupt");
                warn!(
                    path = %path.display(),
                    error = %err,
                    "file store unreadable, starting empty"
                );
                if let Err(err) = fs::rename(path, &aside) {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to move unreadable file store aside"
                    );
                } else {
                    warn!(path = %aside.display(), "moved unreadable file store aside");
                }
                Self {
                    path: path.to_path_buf(),
                    items: Mutex::new(BTreeMap::new()),
                    quota,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec(items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KvStore for FileKvStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock();
        let current = usage_bytes(items.iter());
        check_quota(self.quota, current, items.get(key), key, value)?;

        let previous = items.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush(&items) {
            // Keep memory in step with what is on disk.
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock();
        let Some(previous) = items.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.flush(&items) {
            items.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[String]) -> Result<usize, StorageError> {
        let mut items = self.items.lock();
        let removed: Vec<(String, String)> = keys
            .iter()
            .filter_map(|key| items.remove_entry(key))
            .collect();
        if removed.is_empty() {
            return Ok(0);
        }
        if let Err(err) = self.flush(&items) {
            items.extend(removed);
            return Err(err);
        }
        debug!(path = %self.path.display(), removed = removed.len(), "removed batch from file store");
        Ok(removed.len())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.items.lock().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileKvStore::open(&path, None).unwrap();
            store.set_item("portal_blog_post_{}", "{\"data\":1}").unwrap();
            store.set_item("other_app", "x").unwrap();
            store.remove_item("other_app").unwrap();
        }

        let reopened = FileKvStore::open(&path, None).unwrap();
        assert_eq!(
            reopened.get_item("portal_blog_post_{}").unwrap().as_deref(),
            Some("{\"data\":1}")
        );
        assert_eq!(reopened.keys().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::open(dir.path().join("nested/dir/store.json"), None).unwrap();
        assert!(store.keys().unwrap().is_empty());

        // First write creates the parent directories.
        store.set_item("k", "v").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_corrupt_file_fails_to_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, b"not json").unwrap();

        let result = FileKvStore::open(&path, None);
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_corrupt_file_is_recovered_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, b"not json").unwrap();

        let store = FileKvStore::open_or_recover(&path, None);
        assert!(store.keys().unwrap().is_empty());
        assert_eq!(fs::read(path.with_extension("corrupt")).unwrap(), b"not json");

        store.set_item("portal_user_me_{}", "{}").unwrap();
        let reopened = FileKvStore::open(&path, None).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["portal_user_me_{}".to_string()]);
    }

    #[test]
    fn test_open_or_recover_keeps_valid_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        FileKvStore::open(&path, None).unwrap().set_item("k", "v").unwrap();

        let store = FileKvStore::open_or_recover(&path, None);
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));
        assert!(!path.with_extension("corrupt").exists());
    }

    #[test]
    fn test_remove_items_writes_one_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileKvStore::open(&path, None).unwrap();
        for i in 0..5 {
            store.set_item(&format!("portal_blog_{}_{{}}", i), "{}").unwrap();
        }
        store.set_item("theme", "dark").unwrap();

        let keys: Vec<String> = (0..5)
            .map(|i| format!("portal_blog_{}_{{}}", i))
            .chain(std::iter::once("missing".to_string()))
            .collect();
        assert_eq!(store.remove_items(&keys).unwrap(), 5);

        let reopened = FileKvStore::open(&path, None).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["theme".to_string()]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_remove_items_without_matches_skips_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileKvStore::open(&path, None).unwrap();

        assert_eq!(store.remove_items(&["missing".to_string()]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_quota_exceeded_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileKvStore::open(&path, Some(8)).unwrap();

        store.set_item("k", "1234").unwrap();
        let result = store.set_item("k2", "123456");
        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));

        let reopened = FileKvStore::open(&path, None).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["k".to_string()]);
    }
}
