//! # Storefront Error Type
//!
//! Unified error type for everything a page script can call.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Page script                 Rust runtime                               │
//! │  ───────────                 ────────────                               │
//! │                                                                         │
//! │  app.add_to_cart(item)                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  App method: AppResult<T>                                        │  │
//! │  │         │                                                        │  │
//! │  │  Storage full? ─── StorageError::QuotaExceeded ──┐               │  │
//! │  │         │                                        ▼               │  │
//! │  │  Bad price?   ─── CoreError::NegativePrice ──── AppError ──────► │  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  err.report() → {"code": "STORAGE_FULL", "message": "..."}             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form validation failures and missing DOM targets never reach this type.

use serde::Serialize;
use thiserror::Error;
use zhisheng_core::CoreError;
use zhisheng_storage::StorageError;

/// Errors surfaced by the storefront runtime.
#[derive(Debug, Error)]
pub enum AppError {
    /// Persisting or reading state failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Rejected by core logic (bad amount, bad timestamp).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration values are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    ConfigLoadFailed(String),

    /// Filesystem failure outside the storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigLoadFailed(err.to_string())
    }
}

/// Machine-readable error codes for page scripts.
///
/// ```text
/// switch (e.code) {
///   case 'STORAGE_FULL':  toast('存储空间不足'); break;
///   case 'INVALID_INPUT': toast(e.message);      break;
///   default:              toast('操作失败');
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Backend byte budget exhausted
    StorageFull,

    /// Any other storage failure
    StorageError,

    /// Input rejected by core logic
    InvalidInput,

    /// Configuration could not be loaded or validated
    ConfigError,

    /// Everything else
    Internal,
}

/// What a page script receives when a call fails.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Storage(e) if e.is_quota() => ErrorCode::StorageFull,
            AppError::Storage(_) => ErrorCode::StorageError,
            AppError::Core(_) => ErrorCode::InvalidInput,
            AppError::InvalidConfig(_) | AppError::ConfigLoadFailed(_) => ErrorCode::ConfigError,
            AppError::Io(_) => ErrorCode::Internal,
        }
    }

    /// Code plus display message, ready to serialize.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Result type for storefront operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_maps_to_storage_full() {
        let err: AppError = StorageError::QuotaExceeded {
            key: "zhisheng_cart".into(),
            needed: 10,
            limit: 5,
        }
        .into();
        assert_eq!(err.code(), ErrorCode::StorageFull);

        let err: AppError = StorageError::Poisoned.into();
        assert_eq!(err.code(), ErrorCode::StorageError);
    }

    #[test]
    fn test_report_serialization() {
        let err: AppError = CoreError::NegativePrice("-1.00".into()).into();
        let json = serde_json::to_value(err.report()).unwrap();
        assert_eq!(json["code"], "INVALID_INPUT");
        assert_eq!(json["message"], "Price cannot be negative: -1.00");
    }

    #[test]
    fn test_config_errors() {
        let err = AppError::InvalidConfig("prefix must not be empty".into());
        assert_eq!(err.code(), ErrorCode::ConfigError);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: prefix must not be empty"
        );
    }
}
