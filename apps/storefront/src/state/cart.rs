//! # Cart Manager
//!
//! The persisted shopping cart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Manager Operations                              │
//! │                                                                         │
//! │  Page Action              Manager Call           Persisted             │
//! │  ───────────              ────────────           ─────────             │
//! │                                                                         │
//! │  加入购物车 ─────────────► add(item) ───────────► yes                   │
//! │                                                                         │
//! │  +/- stepper ────────────► update_quantity() ───► only if id present   │
//! │                                                                         │
//! │  删除 ───────────────────► remove(id) ──────────► yes (even if absent)  │
//! │                                                                         │
//! │  全选 checkbox ──────────► set_all_checked() ───► yes                   │
//! │                                                                         │
//! │  清空 ───────────────────► clear() ─────────────► yes                   │
//! │                                                                         │
//! │  NOTE: every write stores the full item list under the cart key.        │
//! │        Badge refresh happens one layer up, in `App`.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! When a write fails the in-memory change stays applied and the error is
//! returned; the next successful write catches storage up.

use serde::Serialize;
use tracing::{debug, warn};

use zhisheng_core::cart::{AddOutcome, Cart, CartItem, NewCartItem, ProductId};
use zhisheng_core::Money;
use zhisheng_storage::{KeyValueStore, Storage, StorageResult};

/// Cart totals for the cart page footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Number of distinct lines
    pub line_count: usize,

    /// Σ quantity over all lines (what the badge shows)
    pub total_quantity: u64,

    /// Number of lines selected for checkout
    pub checked_count: usize,

    /// Σ price × quantity over checked lines
    #[serde(with = "zhisheng_core::money::as_decimal")]
    pub total: Money,

    /// `total` formatted for display ("¥85.50")
    pub total_display: String,

    pub has_prescription: bool,
}

/// Cart state bound to a storage key.
#[derive(Debug)]
pub struct CartManager<S> {
    cart: Cart,
    storage: Storage<S>,
    key: String,
}

impl<S: KeyValueStore> CartManager<S> {
    /// An empty cart bound to `key`; nothing is read until [`reload`].
    ///
    /// [`reload`]: CartManager::reload
    pub fn new(storage: Storage<S>, key: impl Into<String>) -> Self {
        CartManager {
            cart: Cart::new(),
            storage,
            key: key.into(),
        }
    }

    /// Loads the cart stored under `key`.
    ///
    /// # Errors
    ///
    /// Only backend failures (e.g. a poisoned lock).
    pub fn load(storage: Storage<S>, key: impl Into<String>) -> StorageResult<Self> {
        let mut manager = CartManager::new(storage, key);
        manager.reload()?;
        Ok(manager)
    }

    /// Replaces the in-memory cart with the persisted one. A missing entry,
    /// or one that does not decode as a cart, gives an empty cart.
    pub fn reload(&mut self) -> StorageResult<()> {
        self.cart = match self.storage.get_as::<Cart>(&self.key)? {
            Some(cart) => {
                debug!(lines = cart.len(), "Loaded persisted cart");
                cart
            }
            None => {
                debug!("No usable persisted cart, starting empty");
                Cart::new()
            }
        };
        Ok(())
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Adds a product, or increments the line already holding its id.
    pub fn add(&mut self, item: NewCartItem) -> StorageResult<AddOutcome> {
        let id = item.id.clone();
        let outcome = self.cart.add(item);
        debug!(%id, ?outcome, "Cart add");
        self.persist()?;
        Ok(outcome)
    }

    /// Removes every line with `id`; persists even when nothing matched.
    pub fn remove(&mut self, id: &ProductId) -> StorageResult<usize> {
        let removed = self.cart.remove(id);
        debug!(%id, removed, "Cart remove");
        self.persist()?;
        Ok(removed)
    }

    /// Sets a line's quantity (clamped to at least 1). Returns `false`,
    /// without writing, when no line has `id`.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> StorageResult<bool> {
        if !self.cart.update_quantity(id, quantity) {
            debug!(%id, "Quantity update for unknown product ignored");
            return Ok(false);
        }
        debug!(%id, quantity, "Cart quantity updated");
        self.persist()?;
        Ok(true)
    }

    pub fn set_checked(&mut self, id: &ProductId, checked: bool) -> StorageResult<bool> {
        if !self.cart.set_checked(id, checked) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn set_all_checked(&mut self, checked: bool) -> StorageResult<()> {
        self.cart.set_all_checked(checked);
        self.persist()
    }

    pub fn clear(&mut self) -> StorageResult<()> {
        self.cart.clear();
        debug!("Cart cleared");
        self.persist()
    }

    /// Σ price × quantity over checked lines.
    pub fn total(&self) -> Money {
        self.cart.total()
    }

    /// Σ quantity over all lines.
    pub fn count(&self) -> u64 {
        self.cart.count()
    }

    pub fn summary(&self) -> CartSummary {
        let total = self.cart.total();
        CartSummary {
            line_count: self.cart.len(),
            total_quantity: self.cart.count(),
            checked_count: self.cart.checked_items().count(),
            total,
            total_display: total.to_string(),
            has_prescription: self.cart.has_prescription_items(),
        }
    }

    fn persist(&self) -> StorageResult<()> {
        self.storage.set(&self.key, &self.cart).map_err(|e| {
            warn!(error = %e, key = %self.key, "Failed to persist cart");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zhisheng_storage::{MemoryStore, StoredValue};

    fn manager() -> CartManager<MemoryStore> {
        CartManager::load(Storage::new(MemoryStore::new(), "zhisheng_"), "cart").unwrap()
    }

    fn ibuprofen() -> NewCartItem {
        NewCartItem::new(1001, "布洛芬缓释胶囊", Money::from_fen(2850)).with_spec("0.3g*20粒")
    }

    #[test]
    fn test_add_persists_full_list() {
        let mut cart = manager();
        assert_eq!(cart.add(ibuprofen()).unwrap(), AddOutcome::Inserted);
        assert_eq!(
            cart.add(ibuprofen().with_quantity(2)).unwrap(),
            AddOutcome::Incremented { quantity: 3 }
        );

        let stored = cart.storage.get("cart").unwrap().unwrap();
        assert_eq!(
            stored,
            StoredValue::Json(json!([{
                "id": 1001,
                "name": "布洛芬缓释胶囊",
                "price": 28.5,
                "quantity": 3,
                "spec": "0.3g*20粒",
                "isPrescription": false,
                "checked": true
            }]))
        );
    }

    #[test]
    fn test_reload_restores_cart() {
        let storage = Storage::new(MemoryStore::new(), "zhisheng_");
        {
            let mut cart = CartManager::load(storage.clone(), "cart").unwrap();
            cart.add(ibuprofen()).unwrap();
            cart.add(NewCartItem::new("vc-100", "维生素C片", Money::from_fen(1500)))
                .unwrap();
        }

        let cart = CartManager::load(storage, "cart").unwrap();
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total(), Money::from_fen(4350));
    }

    #[test]
    fn test_undecodable_cart_loads_empty() {
        let storage = Storage::new(MemoryStore::new(), "zhisheng_");
        storage.set("cart", &json!({"not": "a list"})).unwrap();

        let cart = CartManager::load(storage, "cart").unwrap();
        assert!(cart.cart().is_empty());
    }

    #[test]
    fn test_update_unknown_id_does_not_write() {
        let mut cart = manager();
        assert!(!cart.update_quantity(&ProductId::from(1), 5).unwrap());
        assert_eq!(cart.storage.get("cart").unwrap(), None);
    }

    #[test]
    fn test_remove_absent_still_persists() {
        let mut cart = manager();
        assert_eq!(cart.remove(&ProductId::from(42)).unwrap(), 0);
        assert_eq!(
            cart.storage.get("cart").unwrap(),
            Some(StoredValue::Json(json!([])))
        );
    }

    #[test]
    fn test_quantity_clamped_to_one() {
        let mut cart = manager();
        cart.add(ibuprofen()).unwrap();
        assert!(cart.update_quantity(&ProductId::from(1001), -3).unwrap());
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_summary_counts_checked_only_for_total() {
        let mut cart = manager();
        cart.add(ibuprofen().with_quantity(2)).unwrap();
        cart.add(
            NewCartItem::new(2002, "阿莫西林胶囊", Money::from_fen(1880)).prescription(),
        )
        .unwrap();
        cart.set_checked(&ProductId::from(2002), false).unwrap();

        let summary = cart.summary();
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.checked_count, 1);
        assert_eq!(summary.total, Money::from_fen(5700));
        assert_eq!(summary.total_display, "¥57.00");
        assert!(summary.has_prescription);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 57);
        assert_eq!(json["totalDisplay"], "¥57.00");
    }

    #[test]
    fn test_write_failure_keeps_memory_change() {
        let storage = Storage::new(MemoryStore::with_quota(20), "zhisheng_");
        let mut cart = CartManager::load(storage, "cart").unwrap();

        let err = cart.add(ibuprofen()).unwrap_err();
        assert!(err.is_quota());
        assert_eq!(cart.count(), 1);
    }
}
