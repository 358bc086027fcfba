//! Lazy images.
//!
//! `<img data-src="…">` elements found at init get their real `src` only
//! once the host reports them in view.

use tracing::trace;

use super::dom::{Document, NodeId, Selector};

const DATA_SRC: &str = "data-src";

#[derive(Debug, Clone, Default)]
pub struct LazyImages {
    pending: Vec<NodeId>,
}

impl LazyImages {
    /// Collects every `img[data-src]` currently on the page.
    pub fn collect(doc: &dyn Document) -> Self {
        LazyImages {
            pending: doc.query_all(&Selector::tag_with_attr("img", DATA_SRC)),
        }
    }

    pub fn pending(&self) -> &[NodeId] {
        &self.pending
    }

    /// Loads an image that came into view: `data-src` moves to `src` and
    /// the image stops being observed. `false` if it was not pending.
    pub fn reveal(&mut self, doc: &mut dyn Document, image: NodeId) -> bool {
        let Some(pos) = self.pending.iter().position(|&id| id == image) else {
            return false;
        };
        self.pending.remove(pos);

        let Some(src) = doc.attr(image, DATA_SRC).map(str::to_string) else {
            return false;
        };
        doc.set_attr(image, "src", &src);
        doc.remove_attr(image, DATA_SRC);
        trace!(src = %src, "Lazy image revealed");
        true
    }
}
