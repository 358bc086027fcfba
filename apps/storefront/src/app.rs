//! # App
//!
//! Everything a storefront page needs, wired together.
//!
//! ## Page Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Page Lifecycle                                   │
//! │                                                                         │
//! │  App::new(config, backend, document, location)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  init() ────► reload cart ──► refresh .cart-badge                       │
//! │       │       bind .back-btn / .header-back                             │
//! │       │       collect img[data-src]                                     │
//! │       ▼                                                                 │
//! │  page script calls: add_product, toast, modal, go, check_login, …      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  host events ──► handle_event(Click / TouchStart / TouchEnd)            │
//! │  host timer  ──► tick()   (toast dismissal)                             │
//! │  viewport    ──► reveal_image(id)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Prescription Products
//! ```text
//! add_product(item)
//!   ├── not prescription ──► add_to_cart ──► ProductAdd::Added
//!   └── prescription ──────► modal "处方药购买提示" ──► AwaitingConfirmation
//!                               │
//!         click 继续添加 ───────┴──► add_to_cart (reported in EventOutcome)
//! ```

use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use zhisheng_core::cart::{AddOutcome, NewCartItem, ProductId};
use zhisheng_core::navigation::QueryParams;
use zhisheng_core::CoreError;
use zhisheng_storage::{KeyValueStore, Storage, StorageResult};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::navigation::{Location, Navigator};
use crate::state::{CartManager, CartSummary, Session};
use crate::timer::{Clock, SystemClock, TimerQueue};
use crate::ui::badge::refresh_badges;
use crate::ui::{
    Document, LazyImages, Loading, ModalChoice, ModalHandle, ModalOptions, ModalOutcome, Modals,
    NodeId, Selector, Toast, UiTimer,
};

const BACK_BUTTON_CLASSES: [&str; 2] = ["back-btn", "header-back"];
const TOUCH_TARGET_CLASSES: [&str; 2] = ["btn", "card"];
const TOUCH_CONTAINER_CLASS: &str = "clickable";
const PRESSED_OPACITY: &str = "0.7";

pub const PRESCRIPTION_TITLE: &str = "处方药购买提示";
pub const PRESCRIPTION_NOTICE: &str =
    "处方药需在下单后补充问卷信息，可能产生额外的视频问诊费用。是否继续添加到购物车？";
pub const PRESCRIPTION_CONFIRM: &str = "继续添加";

/// Result of [`App::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Initialized,
    AlreadyInitialized,
}

/// Result of [`App::add_product`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAdd {
    Added(AddOutcome),
    /// A prescription notice is open; the product is added on confirm.
    AwaitingConfirmation(ModalHandle),
}

/// Input events forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Click(NodeId),
    TouchStart(NodeId),
    TouchEnd(NodeId),
}

/// What handling an event did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// The host should suppress the default action (`<a href="#">`).
    pub prevent_default: bool,
    pub navigated_back: bool,
    pub modal: Option<ModalOutcome>,
    /// A confirmed prescription product went into the cart.
    pub product_added: Option<AddOutcome>,
}

/// The storefront runtime for one page.
pub struct App<S, D, L> {
    config: AppConfig,
    storage: Storage<S>,
    cart: CartManager<S>,
    session: Session<S>,
    doc: D,
    navigator: Navigator<L>,
    clock: Box<dyn Clock>,
    timers: TimerQueue<UiTimer>,
    toast: Toast,
    loading: Loading,
    modals: Modals,
    lazy: LazyImages,
    back_buttons: Vec<NodeId>,
    pending_prescriptions: HashMap<ModalHandle, NewCartItem>,
    initialized: bool,
}

impl<S, D, L> App<S, D, L>
where
    S: KeyValueStore,
    D: Document,
    L: Location,
{
    /// Builds the app. Nothing is read or bound until [`App::init`].
    pub fn new(config: AppConfig, backend: S, doc: D, location: L) -> Self {
        let storage = Storage::new(backend, config.storage.prefix.clone());
        let cart = CartManager::new(storage.clone(), config.storage.cart_key.clone());
        let session = Session::new(
            storage.clone(),
            config.storage.user_key.clone(),
            config.storage.token_key.clone(),
        );

        App {
            config,
            storage,
            cart,
            session,
            doc,
            navigator: Navigator::new(location),
            clock: Box::new(SystemClock::new()),
            timers: TimerQueue::new(),
            toast: Toast::new(),
            loading: Loading,
            modals: Modals::new(),
            lazy: LazyImages::default(),
            back_buttons: Vec::new(),
            pending_prescriptions: HashMap::new(),
            initialized: false,
        }
    }

    /// Replaces the time source used for timers.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Loads the cart, refreshes badges, binds back buttons and collects
    /// lazy images. Later calls do nothing.
    ///
    /// # Errors
    ///
    /// Backend failures while reading the cart.
    pub fn init(&mut self) -> AppResult<InitOutcome> {
        if self.initialized {
            debug!("App already initialized");
            return Ok(InitOutcome::AlreadyInitialized);
        }

        self.cart.reload()?;
        refresh_badges(&mut self.doc, self.cart.count());

        let mut back_buttons: Vec<NodeId> = BACK_BUTTON_CLASSES
            .iter()
            .flat_map(|class| self.doc.query_all(&Selector::class(*class)))
            .collect();
        back_buttons.sort();
        back_buttons.dedup();
        self.back_buttons = back_buttons;

        self.lazy = LazyImages::collect(&self.doc);
        self.initialized = true;

        info!(
            app = %self.config.name,
            version = %self.config.version,
            cart_lines = self.cart.items().len(),
            back_buttons = self.back_buttons.len(),
            lazy_images = self.lazy.pending().len(),
            "Storefront initialized"
        );
        Ok(InitOutcome::Initialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn cart(&self) -> &CartManager<S> {
        &self.cart
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn navigator(&self) -> &Navigator<L> {
        &self.navigator
    }

    pub fn lazy_images(&self) -> &LazyImages {
        &self.lazy
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds straight to the cart, prescription or not.
    ///
    /// # Errors
    ///
    /// A negative price is rejected before touching the cart. Storage
    /// failures are returned after the in-memory cart and badges changed.
    pub fn add_to_cart(&mut self, item: NewCartItem) -> AppResult<AddOutcome> {
        if item.price.is_negative() {
            return Err(CoreError::NegativePrice(item.price.to_string()).into());
        }
        let result = self.cart.add(item);
        self.after_cart_change(result)
    }

    pub fn remove_from_cart(&mut self, id: &ProductId) -> AppResult<usize> {
        let result = self.cart.remove(id);
        self.after_cart_change(result)
    }

    pub fn update_cart_quantity(&mut self, id: &ProductId, quantity: i64) -> AppResult<bool> {
        let result = self.cart.update_quantity(id, quantity);
        self.after_cart_change(result)
    }

    pub fn set_cart_item_checked(&mut self, id: &ProductId, checked: bool) -> AppResult<bool> {
        let result = self.cart.set_checked(id, checked);
        self.after_cart_change(result)
    }

    pub fn set_all_cart_items_checked(&mut self, checked: bool) -> AppResult<()> {
        let result = self.cart.set_all_checked(checked);
        self.after_cart_change(result)
    }

    pub fn clear_cart(&mut self) -> AppResult<()> {
        let result = self.cart.clear();
        self.after_cart_change(result)
    }

    /// Cart totals, priced in the configured currency symbol.
    pub fn cart_summary(&self) -> CartSummary {
        let mut summary = self.cart.summary();
        summary.total_display = self.config.format_currency(summary.total);
        summary
    }

    fn after_cart_change<T>(&mut self, result: StorageResult<T>) -> AppResult<T> {
        refresh_badges(&mut self.doc, self.cart.count());
        Ok(result?)
    }

    /// Adds a product, asking for confirmation first when it is a
    /// prescription product.
    pub fn add_product(&mut self, item: NewCartItem) -> AppResult<ProductAdd> {
        if !item.is_prescription {
            return self.add_to_cart(item).map(ProductAdd::Added);
        }
        if item.price.is_negative() {
            return Err(CoreError::NegativePrice(item.price.to_string()).into());
        }

        let handle = self.modals.show(
            &mut self.doc,
            ModalOptions::new(PRESCRIPTION_NOTICE)
                .title(PRESCRIPTION_TITLE)
                .confirm_text(PRESCRIPTION_CONFIRM),
        );
        debug!(id = %item.id, "Prescription notice shown");
        self.pending_prescriptions.insert(handle, item);
        Ok(ProductAdd::AwaitingConfirmation(handle))
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Whether stored user info carries a non-empty token.
    pub fn check_login(&self) -> AppResult<bool> {
        Ok(self.session.is_logged_in()?)
    }

    // =========================================================================
    // Widgets
    // =========================================================================

    /// Shows a toast for the configured default duration.
    pub fn toast(&mut self, message: &str) -> NodeId {
        let duration = self.config.ui.toast_duration();
        self.toast_for(message, duration)
    }

    pub fn toast_for(&mut self, message: &str, duration: Duration) -> NodeId {
        let now = self.clock.now();
        self.toast
            .show(&mut self.doc, &mut self.timers, now, message, duration)
    }

    pub fn show_loading(&mut self, text: Option<&str>) -> NodeId {
        self.loading.show(&mut self.doc, text)
    }

    pub fn hide_loading(&mut self) -> bool {
        self.loading.hide(&mut self.doc)
    }

    pub fn modal(&mut self, options: ModalOptions) -> ModalHandle {
        self.modals.show(&mut self.doc, options)
    }

    pub fn confirm(&mut self, message: &str, on_confirm: impl FnOnce() + 'static) -> ModalHandle {
        self.modals.confirm(&mut self.doc, message, on_confirm)
    }

    pub fn alert(&mut self, message: &str, on_confirm: impl FnOnce() + 'static) -> ModalHandle {
        self.modals.alert(&mut self.doc, message, on_confirm)
    }

    /// Resolves a modal programmatically, as if its button was clicked.
    pub fn resolve_modal(
        &mut self,
        handle: ModalHandle,
        choice: ModalChoice,
    ) -> AppResult<Option<AddOutcome>> {
        if !self.modals.resolve(&mut self.doc, handle, choice) {
            return Ok(None);
        }
        self.settle_prescription(ModalOutcome { handle, choice })
    }

    fn settle_prescription(&mut self, outcome: ModalOutcome) -> AppResult<Option<AddOutcome>> {
        let Some(item) = self.pending_prescriptions.remove(&outcome.handle) else {
            return Ok(None);
        };
        match outcome.choice {
            ModalChoice::Confirm => self.add_to_cart(item).map(Some),
            ModalChoice::Cancel => {
                debug!(id = %item.id, "Prescription product declined");
                Ok(None)
            }
        }
    }

    /// Loads a lazy image that scrolled into view.
    pub fn reveal_image(&mut self, image: NodeId) -> bool {
        self.lazy.reveal(&mut self.doc, image)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn go<I, K, V>(&mut self, page: &str, params: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.navigator.go(page, params)
    }

    pub fn back(&mut self) {
        self.navigator.back();
    }

    pub fn params(&self) -> QueryParams {
        self.navigator.params()
    }

    // =========================================================================
    // Events and Timers
    // =========================================================================

    /// Dispatches a host event.
    ///
    /// # Errors
    ///
    /// Only when confirming a prescription notice fails to persist the cart;
    /// the modal is closed either way.
    pub fn handle_event(&mut self, event: UiEvent) -> AppResult<EventOutcome> {
        let mut outcome = EventOutcome::default();

        match event {
            UiEvent::Click(target) => {
                if let Some(resolved) = self.modals.click(&mut self.doc, target) {
                    outcome.modal = Some(resolved);
                    outcome.product_added = self.settle_prescription(resolved)?;
                }

                let doc = &self.doc;
                if self.back_buttons.iter().any(|&b| doc.is_descendant(target, b)) {
                    self.navigator.back();
                    outcome.navigated_back = true;
                }

                let is_anchor = self
                    .doc
                    .tag(target)
                    .is_some_and(|tag| tag.eq_ignore_ascii_case("a"));
                if is_anchor && self.doc.attr(target, "href") == Some("#") {
                    outcome.prevent_default = true;
                }
            }
            UiEvent::TouchStart(target) => {
                let pressable = TOUCH_TARGET_CLASSES
                    .iter()
                    .any(|class| self.doc.has_class(target, class))
                    || self
                        .doc
                        .closest(target, &Selector::class(TOUCH_CONTAINER_CLASS))
                        .is_some();
                if pressable {
                    self.doc.set_style(target, "opacity", Some(PRESSED_OPACITY));
                }
            }
            UiEvent::TouchEnd(target) => {
                if self.doc.style(target, "opacity") == Some(PRESSED_OPACITY) {
                    self.doc.set_style(target, "opacity", None);
                }
            }
        }

        Ok(outcome)
    }

    /// Fires every timer that is due. Returns how many fired.
    pub fn tick(&mut self) -> usize {
        let due = self.timers.take_due(self.clock.now());
        for timer in &due {
            match *timer {
                UiTimer::DismissToast(node) => {
                    self.toast.dismiss(&mut self.doc, node);
                }
            }
        }
        due.len()
    }

    /// When the next timer is due, for hosts that sleep between ticks.
    pub fn next_timer(&self) -> Option<Duration> {
        self.timers.next_due()
    }
}
