//! # Error Types
//!
//! Domain-specific error types for zhisheng-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  zhisheng-core errors (this file)                                      │
//! │  └── CoreError        - Invalid money/date inputs                      │
//! │                                                                         │
//! │  zhisheng-storage errors (separate crate)                              │
//! │  └── StorageError     - Persistence failures                           │
//! │                                                                         │
//! │  storefront errors (in app)                                            │
//! │  └── AppError         - What page scripts see (code + message)         │
//! │                                                                         │
//! │  Flow: CoreError / StorageError → AppError → page script               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form validation failures are NOT errors: they come back as data in a
//! [`crate::validation::ValidationReport`].

use thiserror::Error;

/// Core logic errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A decimal amount that cannot be represented as money.
    ///
    /// ## When This Occurs
    /// - NaN or infinite price in a persisted cart
    /// - Amount too large to fit in fen
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A negative price on a cart item.
    #[error("Price cannot be negative: {0}")]
    NegativePrice(String),

    /// A timestamp outside the range chrono can represent.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
