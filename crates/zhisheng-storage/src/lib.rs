//! # zhisheng-storage: Keyed Storage for the Zhisheng Storefront
//!
//! Namespaced JSON persistence over a pluggable key-value backend: the Rust
//! counterpart of the browser's local storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   storefront (cart manager, session)                                   │
//! │          │  set("cart", &items) / get("user_info")                      │
//! │          ▼                                                              │
//! │   Storage<S>  ── prefix "zhisheng_" + key, JSON encode/decode          │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   S: KeyValueStore ── MemoryStore (tests, quota emulation)             │
//! │                     └─ JsonFileStore (one JSON file on disk)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - `KeyValueStore` trait and `MemoryStore`
//! - [`file`] - `JsonFileStore`
//! - [`namespaced`] - `Storage`, the namespaced JSON layer
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust
//! use zhisheng_storage::{MemoryStore, Storage, StoredValue};
//!
//! let storage = Storage::new(MemoryStore::new(), "zhisheng_");
//! storage.set("auth_token", &"abc123").unwrap();
//!
//! let token = storage.get("auth_token").unwrap();
//! assert_eq!(token, Some(StoredValue::Json(serde_json::json!("abc123"))));
//! assert_eq!(storage.get("missing").unwrap(), None);
//! ```

pub mod backend;
pub mod error;
pub mod file;
pub mod namespaced;

pub use backend::{KeyValueStore, MemoryStore};
pub use error::{StorageError, StorageResult};
pub use file::JsonFileStore;
pub use namespaced::{Storage, StoredValue};

/// Namespace prefix applied to every key the storefront writes.
pub const DEFAULT_PREFIX: &str = "zhisheng_";
