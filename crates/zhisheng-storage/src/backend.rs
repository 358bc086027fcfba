//! Key-value backend abstraction.
//!
//! The [`KeyValueStore`] trait is the minimal surface of a browser-style
//! local storage: string keys, string values, enumeration. JSON handling and
//! namespacing live one layer up in [`crate::Storage`].

use std::collections::BTreeMap;

use crate::error::{StorageError, StorageResult};

/// A flat string-to-string persistent store.
///
/// # Implementations
///
/// - [`MemoryStore`]: in-process map with an optional byte quota
/// - [`crate::JsonFileStore`]: one JSON object file on disk
pub trait KeyValueStore: Send {
    /// Returns the value under `key`, `Ok(None)` when absent.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the write (quota, I/O).
    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes `key`. Deleting an absent key is not an error.
    fn remove_item(&mut self, key: &str) -> StorageResult<()>;

    /// Every key currently stored.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// In-memory store.
///
/// With a quota set, usage is counted as the byte length of every key plus
/// value, the same budget a browser applies to local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store refusing writes that would take usage past `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        MemoryStore {
            entries: BTreeMap::new(),
            quota: Some(bytes),
        }
    }

    /// Bytes currently used (keys + values).
    pub fn usage(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(limit) = self.quota {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = self.usage() - replaced + key.len() + value.len();
            if needed > limit {
                tracing::warn!(key, needed, limit, "memory store quota exceeded");
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}
