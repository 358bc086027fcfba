//! # Modal Dialog
//!
//! ## Markup
//! ```text
//! div.modal-overlay.active            ◄── click here (background) = cancel
//! └── div.modal
//!     ├── div.modal-header > h3.modal-title
//!     ├── div.modal-body
//!     └── div.modal-footer
//!         ├── button.btn.btn-secondary.modal-cancel   (if show_cancel)
//!         └── button.btn.btn-primary.modal-confirm
//! ```
//!
//! ## Resolution
//! ```text
//! click(.modal-confirm) ──► on_confirm() ──► overlay removed ──► Confirm
//! click(.modal-cancel)  ──► on_cancel()  ──► overlay removed ──► Cancel
//! click(overlay itself) ──► on_cancel()  ──► overlay removed ──► Cancel
//! click(inside .modal)  ──► nothing
//! ```
//! Several modals may be open at once; each resolves independently.

use std::fmt;
use tracing::debug;

use super::component::Component;
use super::dom::{Document, Node, NodeId, Selector};

const OVERLAY_CLASS: &str = "modal-overlay";
const CONFIRM_CLASS: &str = "modal-confirm";
const CANCEL_CLASS: &str = "modal-cancel";

/// A one-shot modal callback.
pub type Callback = Box<dyn FnOnce()>;

/// Options for [`Modals::show`].
pub struct ModalOptions {
    pub title: String,
    pub content: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub show_cancel: bool,
    pub on_confirm: Option<Callback>,
    pub on_cancel: Option<Callback>,
}

impl Default for ModalOptions {
    fn default() -> Self {
        ModalOptions {
            title: "提示".to_string(),
            content: String::new(),
            confirm_text: "确定".to_string(),
            cancel_text: "取消".to_string(),
            show_cancel: true,
            on_confirm: None,
            on_cancel: None,
        }
    }
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalOptions")
            .field("title", &self.title)
            .field("content", &self.content)
            .field("confirm_text", &self.confirm_text)
            .field("cancel_text", &self.cancel_text)
            .field("show_cancel", &self.show_cancel)
            .field("on_confirm", &self.on_confirm.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}

impl ModalOptions {
    pub fn new(content: impl Into<String>) -> Self {
        ModalOptions {
            content: content.into(),
            ..ModalOptions::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = text.into();
        self
    }

    pub fn without_cancel(mut self) -> Self {
        self.show_cancel = false;
        self
    }

    pub fn on_confirm(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_confirm = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }
}

impl Component for ModalOptions {
    fn render(&self) -> Node {
        let mut footer = Node::div().with_class("modal-footer");
        if self.show_cancel {
            footer = footer.child(
                Node::new("button")
                    .with_class("btn btn-secondary")
                    .with_class(CANCEL_CLASS)
                    .with_text(&self.cancel_text),
            );
        }
        footer = footer.child(
            Node::new("button")
                .with_class("btn btn-primary")
                .with_class(CONFIRM_CLASS)
                .with_text(&self.confirm_text),
        );

        Node::div().with_class(OVERLAY_CLASS).with_class("active").child(
            Node::div()
                .with_class("modal")
                .child(
                    Node::div()
                        .with_class("modal-header")
                        .child(Node::new("h3").with_class("modal-title").with_text(&self.title)),
                )
                .child(Node::div().with_class("modal-body").with_text(&self.content))
                .child(footer),
        )
    }
}

/// Identifies an open modal (its overlay element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalHandle(NodeId);

impl ModalHandle {
    pub fn node(&self) -> NodeId {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalChoice {
    Confirm,
    Cancel,
}

/// A resolved modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalOutcome {
    pub handle: ModalHandle,
    pub choice: ModalChoice,
}

struct OpenModal {
    handle: ModalHandle,
    on_confirm: Option<Callback>,
    on_cancel: Option<Callback>,
}

/// Open modals and their pending callbacks.
#[derive(Default)]
pub struct Modals {
    open: Vec<OpenModal>,
}

impl fmt::Debug for Modals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modals")
            .field("open", &self.open.iter().map(|m| m.handle).collect::<Vec<_>>())
            .finish()
    }
}

impl Modals {
    pub fn new() -> Self {
        Modals::default()
    }

    pub fn show(&mut self, doc: &mut dyn Document, mut options: ModalOptions) -> ModalHandle {
        let handle = ModalHandle(options.mount(doc));
        debug!(title = %options.title, ?handle, "Modal opened");

        self.open.push(OpenModal {
            handle,
            on_confirm: options.on_confirm.take(),
            on_cancel: options.on_cancel.take(),
        });
        handle
    }

    /// Titled "确认", with a cancel button.
    pub fn confirm(
        &mut self,
        doc: &mut dyn Document,
        message: &str,
        on_confirm: impl FnOnce() + 'static,
    ) -> ModalHandle {
        self.show(
            doc,
            ModalOptions::new(message).title("确认").on_confirm(on_confirm),
        )
    }

    /// Titled "提示", confirm button only.
    pub fn alert(
        &mut self,
        doc: &mut dyn Document,
        message: &str,
        on_confirm: impl FnOnce() + 'static,
    ) -> ModalHandle {
        self.show(
            doc,
            ModalOptions::new(message)
                .without_cancel()
                .on_confirm(on_confirm),
        )
    }

    /// Routes a click on `target`. Returns the outcome when the click
    /// resolved a modal.
    pub fn click(&mut self, doc: &mut dyn Document, target: NodeId) -> Option<ModalOutcome> {
        let (handle, choice) = self.open.iter().rev().find_map(|modal| {
            let overlay = modal.handle.node();
            if !doc.is_descendant(target, overlay) {
                return None;
            }
            if target == overlay {
                return Some((modal.handle, ModalChoice::Cancel));
            }
            if let Some(button) = doc.closest(target, &Selector::class(CONFIRM_CLASS)) {
                if doc.is_descendant(button, overlay) {
                    return Some((modal.handle, ModalChoice::Confirm));
                }
            }
            if let Some(button) = doc.closest(target, &Selector::class(CANCEL_CLASS)) {
                if doc.is_descendant(button, overlay) {
                    return Some((modal.handle, ModalChoice::Cancel));
                }
            }
            None
        })?;

        self.resolve(doc, handle, choice).then_some(ModalOutcome { handle, choice })
    }

    /// Runs the matching callback and removes the modal. `false` when the
    /// handle is not open.
    pub fn resolve(
        &mut self,
        doc: &mut dyn Document,
        handle: ModalHandle,
        choice: ModalChoice,
    ) -> bool {
        let Some(pos) = self.open.iter().position(|m| m.handle == handle) else {
            return false;
        };
        let modal = self.open.remove(pos);

        let callback = match choice {
            ModalChoice::Confirm => modal.on_confirm,
            ModalChoice::Cancel => modal.on_cancel,
        };
        if let Some(callback) = callback {
            callback();
        }

        doc.unmount(handle.node());
        debug!(?handle, ?choice, "Modal resolved");
        true
    }

    pub fn is_open(&self, handle: ModalHandle) -> bool {
        self.open.iter().any(|m| m.handle == handle)
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::dom::MemoryDocument;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn log() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn button(doc: &MemoryDocument, handle: ModalHandle, class: &str) -> Option<NodeId> {
        doc.query_within(handle.node(), &Selector::class(class))
    }

    #[test]
    fn test_default_markup() {
        let mut doc = MemoryDocument::new();
        let mut modals = Modals::new();
        let handle = modals.show(&mut doc, ModalOptions::new("确定删除吗？"));

        assert_eq!(
            doc.html_of(handle.node()),
            "<div class=\"modal-overlay active\"><div class=\"modal\">\
             <div class=\"modal-header\"><h3 class=\"modal-title\">提示</h3></div>\
             <div class=\"modal-body\">确定删除吗？</div>\
             <div class=\"modal-footer\">\
             <button class=\"btn btn-secondary modal-cancel\">取消</button>\
             <button class=\"btn btn-primary modal-confirm\">确定</button>\
             </div></div></div>"
        );
    }

    #[test]
    fn test_confirm_runs_callback_and_removes() {
        let mut doc = MemoryDocument::new();
        let mut modals = Modals::new();
        let calls = log();

        let c = calls.clone();
        let k = calls.clone();
        let handle = modals.show(
            &mut doc,
            ModalOptions::new("x")
                .on_confirm(move || c.borrow_mut().push("confirm"))
                .on_cancel(move || k.borrow_mut().push("cancel")),
        );

        let confirm = button(&doc, handle, CONFIRM_CLASS).unwrap();
        let outcome = modals.click(&mut doc, confirm).unwrap();

        assert_eq!(outcome.choice, ModalChoice::Confirm);
        assert_eq!(*calls.borrow(), vec!["confirm"]);
        assert!(!doc.contains(handle.node()));
        assert!(!modals.is_open(handle));
    }

    #[test]
    fn test_background_click_cancels() {
        let mut doc = MemoryDocument::new();
        let mut modals = Modals::new();
        let calls = log();

        let k = calls.clone();
        let handle = modals.confirm(&mut doc, "确认退出？", || {});
        let other = modals.show(
            &mut doc,
            ModalOptions::new("y").on_cancel(move || k.borrow_mut().push("cancel")),
        );

        let outcome = modals.click(&mut doc, other.node()).unwrap();
        assert_eq!(outcome, ModalOutcome { handle: other, choice: ModalChoice::Cancel });
        assert_eq!(*calls.borrow(), vec!["cancel"]);
        assert!(modals.is_open(handle));
    }

    #[test]
    fn test_click_inside_body_does_nothing() {
        let mut doc = MemoryDocument::new();
        let mut modals = Modals::new();
        let handle = modals.alert(&mut doc, "已提交", || {});

        let body = doc.query_within(handle.node(), &Selector::class("modal-body")).unwrap();
        assert_eq!(modals.click(&mut doc, body), None);
        assert!(modals.is_open(handle));
    }

    #[test]
    fn test_alert_has_no_cancel_button() {
        let mut doc = MemoryDocument::new();
        let mut modals = Modals::new();
        let handle = modals.alert(&mut doc, "已提交", || {});

        assert!(button(&doc, handle, CANCEL_CLASS).is_none());
        let title = doc.query_within(handle.node(), &Selector::class("modal-title")).unwrap();
        assert_eq!(doc.text(title), Some("提示"));
    }

    #[test]
    fn test_confirm_preset_title() {
        let mut doc = MemoryDocument::new();
        let mut modals = Modals::new();
        let handle = modals.confirm(&mut doc, "删除该商品？", || {});

        let title = doc.query_within(handle.node(), &Selector::class("modal-title")).unwrap();
        assert_eq!(doc.text(title), Some("确认"));
        assert!(button(&doc, handle, CANCEL_CLASS).is_some());
    }

    #[test]
    fn test_cancel_button() {
        let mut doc = MemoryDocument::new();
        let mut modals = Modals::new();
        let handle = modals.show(&mut doc, ModalOptions::new("x").cancel_text("再想想"));

        let cancel = button(&doc, handle, CANCEL_CLASS).unwrap();
        assert_eq!(doc.text(cancel), Some("再想想"));
        assert_eq!(
            modals.click(&mut doc, cancel).map(|o| o.choice),
            Some(ModalChoice::Cancel)
        );
        assert_eq!(modals.open_count(), 0);
    }
}
