//! # Toast
//!
//! One short message at a time. Showing a new toast removes the current one
//! and cancels its dismissal, so an old timer can never take down a newer
//! toast.
//!
//! ```html
//! <div class="toast-container"><div class="toast show">已加入购物车</div></div>
//! ```

use std::time::Duration;
use tracing::debug;

use super::component::Component;
use super::dom::{Document, Node, NodeId, Selector};
use super::UiTimer;
use crate::timer::{TimerId, TimerQueue};

pub const TOAST_CONTAINER_CLASS: &str = "toast-container";

/// Markup for one toast message.
#[derive(Debug, Clone)]
pub struct ToastView {
    message: String,
}

impl ToastView {
    pub fn new(message: impl Into<String>) -> Self {
        ToastView {
            message: message.into(),
        }
    }
}

impl Component for ToastView {
    fn render(&self) -> Node {
        Node::div()
            .with_class(TOAST_CONTAINER_CLASS)
            .child(Node::div().with_class("toast show").with_text(&self.message))
    }
}

/// The toast controller.
#[derive(Debug, Default)]
pub struct Toast {
    current: Option<(NodeId, TimerId)>,
}

impl Toast {
    pub fn new() -> Self {
        Toast::default()
    }

    /// Replaces any visible toast with `message`, dismissed at
    /// `now + duration`.
    pub fn show(
        &mut self,
        doc: &mut dyn Document,
        timers: &mut TimerQueue<UiTimer>,
        now: Duration,
        message: &str,
        duration: Duration,
    ) -> NodeId {
        if let Some((_, timer)) = self.current.take() {
            timers.cancel(timer);
        }
        for existing in doc.query_all(&Selector::class(TOAST_CONTAINER_CLASS)) {
            doc.unmount(existing);
        }

        let node = ToastView::new(message).mount(doc);
        let timer = timers.schedule(now + duration, UiTimer::DismissToast(node));
        self.current = Some((node, timer));

        debug!(text = message, duration_ms = duration.as_millis() as u64, "Toast shown");
        node
    }

    /// Handles a fired dismissal. Dead nodes are ignored.
    pub fn dismiss(&mut self, doc: &mut dyn Document, node: NodeId) -> bool {
        if self.current.is_some_and(|(current, _)| current == node) {
            self.current = None;
        }
        doc.unmount(node)
    }

    /// The toast currently on screen.
    pub fn current(&self) -> Option<NodeId> {
        self.current.map(|(node, _)| node)
    }
}
