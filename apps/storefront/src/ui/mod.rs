//! # UI Widgets
//!
//! ```text
//! ui/
//! ├── dom.rs        ◄─── Node builder, Selector, Document trait, MemoryDocument
//! ├── component.rs  ◄─── Component trait (render / mount / destroy)
//! ├── toast.rs      ◄─── Single auto-dismissing message
//! ├── loading.rs    ◄─── #globalLoading overlay
//! ├── modal.rs      ◄─── Dialog with confirm / cancel callbacks
//! ├── badge.rs      ◄─── .cart-badge refresh
//! └── lazy.rs       ◄─── img[data-src] reveal
//! ```

pub mod badge;
pub mod component;
pub mod dom;
pub mod lazy;
pub mod loading;
pub mod modal;
pub mod toast;

pub use component::Component;
pub use dom::{Document, MemoryDocument, Node, NodeId, Selector};
pub use lazy::LazyImages;
pub use loading::Loading;
pub use modal::{ModalChoice, ModalHandle, ModalOptions, ModalOutcome, Modals};
pub use toast::Toast;

/// Deferred UI work queued on the app's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiTimer {
    /// Remove the toast mounted at this node.
    DismissToast(NodeId),
}
