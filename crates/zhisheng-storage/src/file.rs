//! JSON file-based key-value store.
//!
//! The whole map lives in memory and is rewritten to disk after every
//! mutation using an atomic write (write-to-temp + rename), so a crash never
//! leaves a half-written file behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "zhisheng_cart": "[{\"id\":1001,\"name\":\"布洛芬缓释胶囊\",...}]",
//!   "zhisheng_auth_token": "\"abc123\""
//! }
//! ```
//!
//! Values are the already-encoded strings handed to
//! [`KeyValueStore::set_item`], exactly as a browser's local storage holds
//! them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::backend::KeyValueStore;
use crate::error::{StorageError, StorageResult};

/// File-backed key-value store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store; it is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the file cannot
    /// be read, or its contents are not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        tracing::debug!(path = ?path, "opening JSON file store");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let entries = if path.exists() {
            Self::load(&path)?
        } else {
            tracing::debug!("store file not found, starting empty");
            BTreeMap::new()
        };

        tracing::debug!(entries = entries.len(), "JSON file store ready");
        Ok(JsonFileStore { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> StorageResult<BTreeMap<String, String>> {
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents)
            .map_err(|e| StorageError::CorruptFile(format!("{}: {}", path.display(), e)))
    }

    fn save(&self) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StorageError::Serialization {
                key: self.path.display().to_string(),
                source,
            }
        })?;

        let tmp_path = self.path.with_extension("tmp");
        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        tracing::trace!(path = ?self.path, "store file saved");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save() {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.save() {
            self.entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.set_item("zhisheng_cart", "[]").unwrap();
            store.set_item("other", "x").unwrap();
            store.remove_item("other").unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_item("zhisheng_cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get_item("other").unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_failed_write_keeps_memory_in_sync() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("nested");
        let path = folder.join("storage.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_item("zhisheng_cart", "[1]").unwrap();
        std::fs::remove_dir_all(&folder).unwrap();

        assert!(store.remove_item("zhisheng_cart").is_err());
        assert_eq!(store.get_item("zhisheng_cart").unwrap().as_deref(), Some("[1]"));

        assert!(store.set_item("zhisheng_cart", "[2]").is_err());
        assert_eq!(store.get_item("zhisheng_cart").unwrap().as_deref(), Some("[1]"));

        assert!(store.set_item("fresh", "x").is_err());
        assert_eq!(store.get_item("fresh").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::CorruptFile(_)));
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
