//! # Storage Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io::Error / serde_json::Error / quota check                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError (this module) ← Adds context and categorization          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in storefront) ← code + message for page scripts            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads that hit malformed JSON are NOT errors: they come back as
//! [`crate::StoredValue::Raw`]. Everything on the write path is.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing would exceed the backend's byte budget.
    ///
    /// ## When This Occurs
    /// - A cart grows past the quota of a [`crate::MemoryStore`] configured
    ///   to emulate the browser's local storage limit
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, limit {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// A value could not be encoded as JSON.
    #[error("Serialization failed for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backing file exists but does not hold a JSON object of strings.
    #[error("Storage file is corrupt: {0}")]
    CorruptFile(String),

    /// Filesystem failure in a file-backed store.
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Another holder of the shared backend panicked mid-write.
    #[error("Storage backend lock poisoned")]
    Poisoned,
}

impl StorageError {
    /// Whether the failure came from the size budget (the caller may free
    /// space and retry).
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
