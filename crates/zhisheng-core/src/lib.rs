//! # zhisheng-core: Pure Logic for the Zhisheng Storefront
//!
//! This crate holds everything the storefront computes without touching
//! storage, the document or the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Zhisheng Storefront Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Page scripts                                 │   │
//! │  │    Product page ──► Cart page ──► Checkout ──► Order result     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    storefront App                               │   │
//! │  │    cart manager, widgets, navigator, initializer                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ zhisheng-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌──────────────┐    │   │
//! │  │   │  money   │ │   cart   │ │ validation │ │ format / nav │    │   │
//! │  │   └──────────┘ └──────────┘ └────────────┘ └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO STORAGE • NO DOCUMENT • NO CLOCK • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type in fen (integer arithmetic)
//! - [`cart`] - Cart line items and cart math
//! - [`validation`] - Form validation rule engine
//! - [`format`] - Price/date formatting, order numbers
//! - [`navigation`] - Page URL building and query parsing
//! - [`timing`] - Debounce and throttle gates over caller-supplied time
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use zhisheng_core::cart::{Cart, NewCartItem};
//! use zhisheng_core::money::Money;
//!
//! let mut cart = Cart::new();
//! cart.add(NewCartItem::new("1001", "Ibuprofen 0.3g", Money::from_fen(2850)));
//! cart.add(NewCartItem::new("1001", "Ibuprofen 0.3g", Money::from_fen(2850)).with_quantity(2));
//!
//! assert_eq!(cart.count(), 3);
//! assert_eq!(cart.total().to_string(), "¥85.50");
//! ```

pub mod cart;
pub mod error;
pub mod format;
pub mod money;
pub mod navigation;
pub mod timing;
pub mod validation;

pub use cart::{AddOutcome, Cart, CartItem, NewCartItem, ProductId};
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use validation::{Rule, RuleKind, RuleSet, ValidationReport};

/// Currency symbol used for display (Chinese yuan).
pub const CURRENCY_SYMBOL: &str = "¥";

/// Badge counts above this are shown as `"99+"`.
pub const BADGE_DISPLAY_MAX: u64 = 99;
