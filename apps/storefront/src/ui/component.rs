//! Renderable widgets.

use super::dom::{Document, Node, NodeId};

/// Something that renders to a [`Node`] tree.
pub trait Component {
    fn render(&self) -> Node;

    /// Renders and attaches under `body`.
    fn mount(&self, doc: &mut dyn Document) -> NodeId {
        doc.mount(None, self.render())
    }

    /// Removes a previously mounted instance.
    fn destroy(&self, doc: &mut dyn Document, id: NodeId) -> bool {
        doc.unmount(id)
    }
}
