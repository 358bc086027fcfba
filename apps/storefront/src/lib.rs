//! # Zhisheng Storefront Library
//!
//! The runtime shared by every storefront page: persisted cart, login
//! session, widgets, navigation and the page initializer.
//!
//! ## Module Organization
//! ```text
//! zhisheng_storefront/
//! ├── lib.rs          ◄─── You are here (tracing setup & run)
//! ├── app.rs          ◄─── App: initializer, event dispatch, page API
//! ├── config.rs       ◄─── AppConfig (defaults → TOML → env)
//! ├── error.rs        ◄─── AppError + ErrorCode for page scripts
//! ├── navigation.rs   ◄─── Location trait, Navigator
//! ├── timer.rs        ◄─── Clock, TimerQueue
//! ├── state/
//! │   ├── cart.rs     ◄─── CartManager (persisted cart)
//! │   └── session.rs  ◄─── Session, UserInfo
//! └── ui/
//!     ├── dom.rs      ◄─── Document trait, MemoryDocument
//!     └── toast / loading / modal / badge / lazy
//! ```
//!
//! ## Page Script Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  App            cart ops, add_product, toast, loading, modal,          │
//! │                 go / back / params, check_login, handle_event, tick     │
//! │  utils          format_price, format_date, generate_order_number,       │
//! │                 Debounce, Throttle                                      │
//! │  validation     validate(form, &RuleSet) → ValidationReport             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod navigation;
pub mod state;
pub mod timer;
pub mod ui;

pub use app::{App, EventOutcome, InitOutcome, ProductAdd, UiEvent};
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorCode, ErrorReport};
pub use navigation::{Location, MemoryLocation, Navigator};
pub use state::{CartManager, CartSummary, Session, UserInfo};
pub use timer::{Clock, ManualClock, SystemClock};

/// Helpers page scripts use directly.
pub mod utils {
    pub use zhisheng_core::format::{format_date, format_price, generate_order_number};
    pub use zhisheng_core::timing::{Debounce, Throttle};
    pub use zhisheng_core::validation::{validate, Rule, RuleSet, ValidationReport};
}

use tracing::info;
use tracing_subscriber::EnvFilter;
use zhisheng_storage::JsonFileStore;

use ui::{MemoryDocument, Node};

/// Runs a headless storefront session against the on-disk store.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging ── RUST_LOG, default "info,zhisheng=debug"       │
/// │  2. Load Config ───────── storefront.toml + ZHISHENG_* overrides        │
/// │  3. Open Storage ──────── <data dir>/storage.json                       │
/// │  4. Build App ─────────── shell page document, index.html location     │
/// │  5. init() ────────────── cart reload, badges, back buttons, images     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// # Errors
///
/// Config load/validation failures, or a store file that cannot be opened.
pub fn run() -> AppResult<()> {
    init_tracing();

    info!("Starting Zhisheng storefront");

    let config = AppConfig::load(None)?;
    let path = config.data_file_path().ok_or_else(|| {
        AppError::InvalidConfig("no data directory available; set ZHISHENG_DATA_DIR".into())
    })?;
    let store = JsonFileStore::open(&path)?;
    info!(?path, "Storage opened");

    let mut app = App::new(config, store, shell_page(), MemoryLocation::new("index.html"));
    app.init()?;

    let summary = app.cart_summary();
    info!(
        lines = summary.line_count,
        quantity = summary.total_quantity,
        total = %summary.total_display,
        logged_in = app.check_login()?,
        "Storefront ready"
    );
    Ok(())
}

/// Header bar shared by every page: back button and cart badge.
fn shell_page() -> MemoryDocument {
    use ui::Document;

    let mut doc = MemoryDocument::new();
    doc.mount(
        None,
        Node::new("header")
            .with_class("header")
            .child(Node::new("button").with_class("header-back"))
            .child(Node::new("span").with_class("cart-badge")),
    );
    doc
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: Unrecoverable failures
/// - WARN: Recovered failures (bad stored data, failed cart write)
/// - INFO: Lifecycle (startup, init, login state)
/// - DEBUG: Cart mutations, widget activity
/// - TRACE: Storage file writes, lazy image reveals
///
/// ## Configuration
/// Set `RUST_LOG` to override, e.g. `RUST_LOG=zhisheng_storage=trace`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,zhisheng=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
