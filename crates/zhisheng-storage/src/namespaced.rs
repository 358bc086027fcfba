//! # Namespaced Storage
//!
//! JSON values under `prefix + key` in a shared [`KeyValueStore`].
//!
//! ## Read Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stored text            get(key)                                        │
//! │  ───────────            ────────                                        │
//! │  (absent) or ""    ──►  None                                            │
//! │  '{"token":"t"}'   ──►  Some(Json({"token": "t"}))                      │
//! │  'legacy-token'    ──►  Some(Raw("legacy-token"))   malformed JSON      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The backend sits behind `Arc<Mutex<S>>` so the cart manager and session
//! can hold clones of the same `Storage`. A poisoned lock surfaces as
//! [`StorageError::Poisoned`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::KeyValueStore;
use crate::error::{StorageError, StorageResult};

/// A value read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// The stored text parsed as JSON.
    Json(serde_json::Value),
    /// The stored text did not parse; returned verbatim.
    Raw(String),
}

impl StoredValue {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            StoredValue::Json(value) => Some(value),
            StoredValue::Raw(_) => None,
        }
    }

    /// String content: a JSON string's value, or the raw text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StoredValue::Json(value) => value.as_str(),
            StoredValue::Raw(raw) => Some(raw),
        }
    }

    /// Decodes into `T`. Raw values decode as a JSON string.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        match self {
            StoredValue::Json(value) => serde_json::from_value(value),
            StoredValue::Raw(raw) => serde_json::from_value(serde_json::Value::String(raw)),
        }
    }
}

/// Namespaced JSON storage over a shared backend.
pub struct Storage<S> {
    backend: Arc<Mutex<S>>,
    prefix: String,
}

impl<S> Clone for Storage<S> {
    fn clone(&self) -> Self {
        Storage {
            backend: Arc::clone(&self.backend),
            prefix: self.prefix.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Storage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(backend: S, prefix: impl Into<String>) -> Self {
        Storage::shared(Arc::new(Mutex::new(backend)), prefix)
    }

    /// Wraps a backend that other code also holds.
    pub fn shared(backend: Arc<Mutex<S>>, prefix: impl Into<String>) -> Self {
        Storage {
            backend,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The backend key for `key`.
    pub fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Runs `f` with the locked backend.
    pub fn with_backend<F, R>(&self, f: F) -> StorageResult<R>
    where
        F: FnOnce(&mut S) -> R,
    {
        let mut backend = self.lock()?;
        Ok(f(&mut backend))
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, S>> {
        self.backend.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Serializes `value` as JSON and stores it under the namespaced key.
    ///
    /// # Errors
    ///
    /// Serialization failures and backend write failures (quota, I/O).
    pub fn set<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let full_key = self.full_key(key);
        let json = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
            key: full_key.clone(),
            source,
        })?;

        self.lock()?.set_item(&full_key, &json)?;
        tracing::debug!(key = %full_key, bytes = json.len(), "stored value");
        Ok(())
    }

    /// Reads the value under the namespaced key.
    ///
    /// Absent (or empty) → `None`; malformed JSON → [`StoredValue::Raw`].
    pub fn get(&self, key: &str) -> StorageResult<Option<StoredValue>> {
        let full_key = self.full_key(key);
        let raw = match self.lock()?.get_item(&full_key)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        Ok(Some(match serde_json::from_str(&raw) {
            Ok(value) => StoredValue::Json(value),
            Err(_) => {
                tracing::debug!(key = %full_key, "stored value is not JSON, returning raw text");
                StoredValue::Raw(raw)
            }
        }))
    }

    /// Typed read. Absent values and values that do not decode as `T` both
    /// give `None`; the latter is logged.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };

        match value.decode() {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                tracing::warn!(
                    key = %self.full_key(key),
                    error = %e,
                    "stored value has unexpected shape"
                );
                Ok(None)
            }
        }
    }

    pub fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.lock()?.get_item(&self.full_key(key))?.is_some())
    }

    /// Deletes one namespaced entry.
    pub fn remove(&self, key: &str) -> StorageResult<()> {
        let full_key = self.full_key(key);
        self.lock()?.remove_item(&full_key)?;
        tracing::debug!(key = %full_key, "removed value");
        Ok(())
    }

    /// Deletes every entry under the prefix, leaving other keys alone.
    /// Returns how many entries were removed.
    pub fn clear(&self) -> StorageResult<usize> {
        let mut backend = self.lock()?;
        let keys: Vec<String> = backend
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&self.prefix))
            .collect();

        for key in &keys {
            backend.remove_item(key)?;
        }

        tracing::debug!(prefix = %self.prefix, removed = keys.len(), "cleared namespace");
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use serde::Deserialize;
    use serde_json::json;

    fn storage() -> Storage<MemoryStore> {
        Storage::new(MemoryStore::new(), "zhisheng_")
    }

    #[test]
    fn test_round_trip_json_values() {
        let storage = storage();
        let values = [
            json!(null),
            json!(true),
            json!(42),
            json!(3.5),
            json!("文本"),
            json!([1, "two", {"three": 3}]),
            json!({"nested": {"list": [1, 2], "flag": false}}),
        ];

        for (i, value) in values.iter().enumerate() {
            let key = format!("k{}", i);
            storage.set(&key, value).unwrap();
            assert_eq!(storage.get(&key).unwrap(), Some(StoredValue::Json(value.clone())));
        }
    }

    #[test]
    fn test_missing_key_is_none() {
        assert_eq!(storage().get("never").unwrap(), None);
    }

    #[test]
    fn test_keys_are_namespaced() {
        let storage = storage();
        storage.set("cart", &json!([])).unwrap();

        let keys = storage.with_backend(|b| b.keys()).unwrap().unwrap();
        assert_eq!(keys, vec!["zhisheng_cart"]);
        assert_eq!(storage.full_key("cart"), "zhisheng_cart");
    }

    #[test]
    fn test_malformed_json_returns_raw_text() {
        let storage = storage();
        storage
            .with_backend(|b| b.set_item("zhisheng_auth_token", "legacy-token"))
            .unwrap()
            .unwrap();

        let value = storage.get("auth_token").unwrap().unwrap();
        assert_eq!(value, StoredValue::Raw("legacy-token".to_string()));
        assert_eq!(value.as_str(), Some("legacy-token"));

        let token: Option<String> = storage.get_as("auth_token").unwrap();
        assert_eq!(token.as_deref(), Some("legacy-token"));
    }

    #[test]
    fn test_empty_string_reads_as_absent() {
        let storage = storage();
        storage
            .with_backend(|b| b.set_item("zhisheng_x", ""))
            .unwrap()
            .unwrap();
        assert_eq!(storage.get("x").unwrap(), None);
    }

    #[test]
    fn test_get_as_wrong_shape_is_none() {
        #[derive(Debug, Deserialize)]
        struct User {
            #[allow(dead_code)]
            token: String,
        }

        let storage = storage();
        storage.set("user_info", &json!([1, 2, 3])).unwrap();
        let user: Option<User> = storage.get_as("user_info").unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_clear_only_touches_prefix() {
        let storage = storage();
        storage.set("cart", &json!([])).unwrap();
        storage.set("auth_token", &"t").unwrap();
        storage
            .with_backend(|b| b.set_item("other_app_key", "keep"))
            .unwrap()
            .unwrap();

        assert_eq!(storage.clear().unwrap(), 2);
        assert_eq!(storage.get("cart").unwrap(), None);
        let remaining = storage.with_backend(|b| b.keys()).unwrap().unwrap();
        assert_eq!(remaining, vec!["other_app_key"]);
    }

    #[test]
    fn test_remove() {
        let storage = storage();
        storage.set("cart", &json!([1])).unwrap();
        assert!(storage.contains("cart").unwrap());
        storage.remove("cart").unwrap();
        assert!(!storage.contains("cart").unwrap());
    }

    #[test]
    fn test_clones_share_backend() {
        let a = storage();
        let b = a.clone();
        a.set("cart", &json!(["x"])).unwrap();
        assert_eq!(b.get("cart").unwrap(), Some(StoredValue::Json(json!(["x"]))));
    }

    #[test]
    fn test_quota_failure_surfaces() {
        let storage = Storage::new(MemoryStore::with_quota(16), "zhisheng_");
        let err = storage.set("cart", &"a long value that does not fit").unwrap_err();
        assert!(err.is_quota());
    }
}
