//! Full-screen loading overlay (`#globalLoading`).
//!
//! There is at most one overlay. Calling `show` while it is up only swaps
//! the text; a single `hide` always clears it.

use tracing::debug;

use super::component::Component;
use super::dom::{Document, Node, NodeId, Selector};

pub const LOADING_ID: &str = "globalLoading";
pub const DEFAULT_LOADING_TEXT: &str = "加载中...";
const TEXT_CLASS: &str = "loading-text";

#[derive(Debug, Clone)]
pub struct LoadingView {
    text: String,
}

impl Component for LoadingView {
    fn render(&self) -> Node {
        Node::div()
            .with_class("loading-overlay")
            .with_id(LOADING_ID)
            .child(
                Node::div()
                    .with_class("loading-content")
                    .child(Node::div().with_class("spinner"))
                    .child(Node::div().with_class(TEXT_CLASS).with_text(&self.text)),
            )
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Loading;

impl Loading {
    /// Shows the overlay, or updates its text if already shown.
    /// `None` uses [`DEFAULT_LOADING_TEXT`].
    pub fn show(&self, doc: &mut dyn Document, text: Option<&str>) -> NodeId {
        let text = text.unwrap_or(DEFAULT_LOADING_TEXT);

        if let Some(existing) = doc.query(&Selector::id(LOADING_ID)) {
            if let Some(label) = doc.query_within(existing, &Selector::class(TEXT_CLASS)) {
                doc.set_text(label, text);
            }
            debug!(text, "Loading overlay text updated");
            return existing;
        }

        debug!(text, "Loading overlay shown");
        LoadingView {
            text: text.to_string(),
        }
        .mount(doc)
    }

    /// Removes the overlay; `false` when none was shown.
    pub fn hide(&self, doc: &mut dyn Document) -> bool {
        match doc.query(&Selector::id(LOADING_ID)) {
            Some(id) => doc.unmount(id),
            None => false,
        }
    }

    pub fn is_showing(&self, doc: &dyn Document) -> bool {
        doc.query(&Selector::id(LOADING_ID)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::dom::MemoryDocument;

    #[test]
    fn test_show_default_text() {
        let mut doc = MemoryDocument::new();
        let id = Loading.show(&mut doc, None);

        let label = doc.query_within(id, &Selector::class(TEXT_CLASS)).unwrap();
        assert_eq!(doc.text(label), Some("加载中..."));
        assert!(doc.query_within(id, &Selector::class("spinner")).is_some());
    }

    #[test]
    fn test_second_show_updates_instead_of_stacking() {
        let mut doc = MemoryDocument::new();
        let first = Loading.show(&mut doc, None);
        let second = Loading.show(&mut doc, Some("提交中..."));

        assert_eq!(first, second);
        assert_eq!(doc.query_all(&Selector::id(LOADING_ID)).len(), 1);
        let label = doc.query(&Selector::class(TEXT_CLASS)).unwrap();
        assert_eq!(doc.text(label), Some("提交中..."));

        assert!(Loading.hide(&mut doc));
        assert!(!Loading.is_showing(&doc));
    }

    #[test]
    fn test_hide_without_show() {
        let mut doc = MemoryDocument::new();
        assert!(!Loading.hide(&mut doc));
    }
}
