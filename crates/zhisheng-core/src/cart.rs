//! # Cart Module
//!
//! Line items and the cart math behind the storefront's shopping cart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Page Action              Cart Method             Cart Change           │
//! │  ───────────              ───────────             ───────────           │
//! │                                                                         │
//! │  "Add to cart" ──────────► add() ───────────────► push or qty += n     │
//! │                                                                         │
//! │  Stepper +/- ────────────► update_quantity() ───► qty = max(1, n)      │
//! │                                                                         │
//! │  Checkbox ───────────────► set_checked() ───────► checked = b          │
//! │                                                                         │
//! │  Delete ─────────────────► remove() ────────────► retain(id != x)      │
//! │                                                                         │
//! │  After checkout ─────────► clear() ─────────────► items.clear()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! - [`Cart::count`] sums quantities over ALL items (badge number).
//! - [`Cart::total`] sums price × quantity over CHECKED items only
//!   (the checkout total of a selectable cart).
//!
//! Persistence is not this module's concern: the storefront's cart manager
//! writes the cart after every mutation.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{self, Money};

// =============================================================================
// Product Id
// =============================================================================

/// Identifier of a catalog product.
///
/// Page scripts use both numeric and string ids; the persisted representation
/// is kept as-is, and `1` and `"1"` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId::Number(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::Text(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId::Text(id)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

fn default_checked() -> bool {
    true
}

fn default_quantity() -> u32 {
    1
}

/// A line in the shopping cart.
///
/// ## Persisted Shape
/// ```json
/// {"id": 1001, "name": "布洛芬缓释胶囊", "price": 28.5, "quantity": 2,
///  "spec": "0.3g*20粒", "isPrescription": false, "checked": true}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub id: ProductId,

    pub name: String,

    /// Unit price, decimal yuan on the wire.
    #[serde(with = "money::as_decimal")]
    #[ts(type = "number")]
    pub price: Money,

    /// Always >= 1 once inside a [`Cart`].
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Free-text variant descriptor ("0.3g*20粒").
    #[serde(default)]
    pub spec: String,

    #[serde(default)]
    pub is_prescription: bool,

    /// Selected for checkout.
    #[serde(default = "default_checked")]
    pub checked: bool,
}

impl CartItem {
    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// A product as handed to [`Cart::add`].
///
/// Optional fields take the same defaults page scripts rely on: quantity 1,
/// empty spec, not a prescription product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "money::as_decimal")]
    #[ts(type = "number")]
    pub price: Money,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub spec: Option<String>,
    #[serde(default)]
    pub is_prescription: bool,
}

impl NewCartItem {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        NewCartItem {
            id: id.into(),
            name: name.into(),
            price,
            quantity: None,
            spec: None,
            is_prescription: false,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = Some(spec.into());
        self
    }

    pub fn prescription(mut self) -> Self {
        self.is_prescription = true;
        self
    }

    /// Requested quantity; missing or zero means 1.
    pub fn effective_quantity(&self) -> u32 {
        match self.quantity {
            Some(q) if q >= 1 => q,
            _ => 1,
        }
    }

    fn into_item(self) -> CartItem {
        let quantity = self.effective_quantity();
        CartItem {
            id: self.id,
            name: self.name,
            price: self.price,
            quantity,
            spec: self.spec.unwrap_or_default(),
            is_prescription: self.is_prescription,
            checked: true,
        }
    }
}

/// What [`Cart::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended.
    Inserted,
    /// An existing line's quantity grew; carries the new quantity.
    Incremented { quantity: u32 },
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart: an ordered list of line items.
///
/// ## Invariants
/// - Every quantity is >= 1
/// - `add` never duplicates an id already in the cart
///
/// Serializes as a bare JSON array of [`CartItem`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<CartItem>::deserialize(deserializer).map(Cart::from_items)
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from previously persisted items.
    ///
    /// Quantities of 0 (hand-edited or legacy data) are raised to 1.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Cart { items };
        for item in &mut cart.items {
            item.quantity = item.quantity.max(1);
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Adds a product or increases the quantity of the matching line.
    pub fn add(&mut self, product: NewCartItem) -> AddOutcome {
        let increment = product.effective_quantity();

        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity = item.quantity.saturating_add(increment);
            return AddOutcome::Incremented {
                quantity: item.quantity,
            };
        }

        self.items.push(product.into_item());
        AddOutcome::Inserted
    }

    /// Removes every line with the given id. Returns how many were removed.
    pub fn remove(&mut self, id: &ProductId) -> usize {
        let before = self.items.len();
        self.items.retain(|i| &i.id != id);
        before - self.items.len()
    }

    /// Sets a line's quantity, clamped to at least 1.
    ///
    /// Returns `false` when the id is not in the cart.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> bool {
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(item) => {
                item.quantity = quantity.clamp(1, u32::MAX as i64) as u32;
                true
            }
            None => false,
        }
    }

    /// Marks a line as selected (or not) for checkout.
    pub fn set_checked(&mut self, id: &ProductId, checked: bool) -> bool {
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(item) => {
                item.checked = checked;
                true
            }
            None => false,
        }
    }

    /// Selects or deselects every line.
    pub fn set_all_checked(&mut self, checked: bool) {
        for item in &mut self.items {
            item.checked = checked;
        }
    }

    /// Lines currently selected for checkout.
    pub fn checked_items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter().filter(|i| i.checked)
    }

    /// Sum of price × quantity over checked lines.
    pub fn total(&self) -> Money {
        self.checked_items().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all lines, checked or not.
    pub fn count(&self) -> u64 {
        self.items.iter().map(|i| i.quantity as u64).sum()
    }

    /// Whether any line requires prescription follow-up.
    pub fn has_prescription_items(&self) -> bool {
        self.items.iter().any(|i| i.is_prescription)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
