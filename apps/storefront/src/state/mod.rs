//! # Page State
//!
//! ```text
//! ┌──────────────────────────┐ ┌──────────────────────────┐
//! │  CartManager             │ │  Session                 │
//! │  • cart lines            │ │  • user_info             │
//! │  • persisted on write    │ │  • auth_token            │
//! └────────────┬─────────────┘ └────────────┬─────────────┘
//!              └──────── Storage<S> ────────┘
//!                 (one shared backend)
//! ```

pub mod cart;
pub mod session;

pub use cart::{CartManager, CartSummary};
pub use session::{Session, UserInfo};
