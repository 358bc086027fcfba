//! # Document Model
//!
//! The slice of a browser document the widgets need: mount a node tree,
//! find elements by class / id / `tag[attr]`, mutate text, attributes and
//! inline style, and remove subtrees.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Component::render() ──► Node (owned tree, not yet attached)           │
//! │                              │                                          │
//! │                              ▼ Document::mount(parent, node)            │
//! │  MemoryDocument arena: [body, div.toast-container, div.toast, …]       │
//! │                              │                                          │
//! │                              ▼ NodeId handles                           │
//! │  query / set_text / set_style / unmount                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Node ids are never reused, so a handle to a removed node stays dead even
//! after new nodes are mounted. All text and attribute values are escaped
//! when serialized.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Handle to a mounted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

// =============================================================================
// Node Builder
// =============================================================================

/// An element tree not yet attached to a document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Node {
            tag: tag.into(),
            ..Node::default()
        }
    }

    pub fn div() -> Self {
        Node::new("div")
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds one or more space-separated classes.
    pub fn with_class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Serializes the tree as HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        write_open_tag(out, &self.tag, self.id.as_deref(), &self.classes, &self.attrs, &self.style);
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

fn write_open_tag(
    out: &mut String,
    tag: &str,
    id: Option<&str>,
    classes: &[String],
    attrs: &BTreeMap<String, String>,
    style: &BTreeMap<String, String>,
) {
    let _ = write!(out, "<{}", tag);
    if let Some(id) = id {
        let _ = write!(out, " id=\"{}\"", escape(id));
    }
    if !classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", escape(&classes.join(" ")));
    }
    for (name, value) in attrs {
        let _ = write!(out, " {}=\"{}\"", name, escape(value));
    }
    if !style.is_empty() {
        let css = style
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        let _ = write!(out, " style=\"{}\"", escape(&css));
    }
    out.push('>');
}

/// Escapes text for HTML content and attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Selectors
// =============================================================================

/// The selector forms the storefront uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `.name`
    Class(String),
    /// `#name`
    Id(String),
    /// `tag[attr]`
    TagWithAttr { tag: String, attr: String },
}

impl Selector {
    pub fn class(name: impl Into<String>) -> Self {
        Selector::Class(name.into())
    }

    pub fn id(name: impl Into<String>) -> Self {
        Selector::Id(name.into())
    }

    pub fn tag_with_attr(tag: impl Into<String>, attr: impl Into<String>) -> Self {
        Selector::TagWithAttr {
            tag: tag.into(),
            attr: attr.into(),
        }
    }
}

// =============================================================================
// Document Trait
// =============================================================================

/// A mutable element tree with a `body` root.
///
/// Operations on a dead or unknown [`NodeId`] are silent no-ops (reads
/// return `None` / `false`), matching how page code treats missing elements.
pub trait Document {
    /// The root every top-level mount hangs off.
    fn body(&self) -> NodeId;

    /// Attaches `node` (and its children) under `parent`, or under `body`
    /// when `parent` is `None`. Returns the new subtree's root.
    fn mount(&mut self, parent: Option<NodeId>, node: Node) -> NodeId;

    /// Removes `id` and its subtree. `false` if it was not mounted.
    fn unmount(&mut self, id: NodeId) -> bool;

    fn contains(&self, id: NodeId) -> bool;

    /// Every match in document order.
    fn query_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// Whether element `id` matches `selector`.
    fn matches(&self, id: NodeId, selector: &Selector) -> bool;

    fn parent(&self, id: NodeId) -> Option<NodeId>;

    fn tag(&self, id: NodeId) -> Option<&str>;

    fn attr(&self, id: NodeId, name: &str) -> Option<&str>;

    fn set_attr(&mut self, id: NodeId, name: &str, value: &str);

    fn remove_attr(&mut self, id: NodeId, name: &str);

    /// The element's own text content (not its children's).
    fn text(&self, id: NodeId) -> Option<&str>;

    fn set_text(&mut self, id: NodeId, text: &str);

    fn style(&self, id: NodeId, property: &str) -> Option<&str>;

    /// Sets an inline style property; `None` clears it.
    fn set_style(&mut self, id: NodeId, property: &str, value: Option<&str>);

    /// First match in document order.
    fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// First match inside the subtree rooted at `root` (excluding `root`).
    fn query_within(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(selector)
            .into_iter()
            .find(|&id| id != root && self.is_descendant(id, root))
    }

    /// `id` itself or its nearest ancestor matching `selector`.
    fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id).filter(|&id| self.contains(id));
        while let Some(node) = current {
            if self.matches(node, selector) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id).filter(|&id| self.contains(id));
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.matches(id, &Selector::class(class))
    }

    /// Shows (`display: block`) or hides (`display: none`) an element.
    fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.set_style(id, "display", Some(if visible { "block" } else { "none" }));
    }

    fn is_visible(&self, id: NodeId) -> bool {
        self.contains(id) && self.style(id, "display") != Some("none")
    }
}

// =============================================================================
// In-Memory Document
// =============================================================================

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Class(name) => self.classes.iter().any(|c| c == name),
            Selector::Id(name) => self.id.as_deref() == Some(name.as_str()),
            Selector::TagWithAttr { tag, attr } => {
                self.tag.eq_ignore_ascii_case(tag) && self.attrs.contains_key(attr)
            }
        }
    }
}

/// Arena-backed [`Document`] for tests and headless hosts.
///
/// Node ids are never reused, so an unmounted node leaves an empty slot
/// behind and the arena grows by one slot per node ever mounted. Each toast
/// or modal costs a few slots; a page that lives long enough for this to
/// matter should rebuild its document. [`MemoryDocument::slot_count`]
/// reports the arena size.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Option<Element>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        MemoryDocument::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let body = Element {
            tag: "body".to_string(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        };
        MemoryDocument {
            nodes: vec![Some(body)],
        }
    }

    fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn insert(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Element {
            tag: node.tag,
            id: node.id,
            classes: node.classes,
            attrs: node.attrs,
            style: node.style,
            text: node.text,
            parent: Some(parent),
            children: Vec::new(),
        }));

        for child in node.children {
            let child_id = self.insert(id, child);
            if let Some(element) = self.get_mut(id) {
                element.children.push(child_id);
            }
        }
        id
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(element) = self.nodes.get_mut(id.0).and_then(Option::take) {
            for child in element.children {
                self.drop_subtree(child);
            }
        }
    }

    fn collect(&self, id: NodeId, selector: &Selector, out: &mut Vec<NodeId>) {
        if let Some(element) = self.get(id) {
            if element.matches(selector) {
                out.push(id);
            }
            for &child in &element.children {
                self.collect(child, selector, out);
            }
        }
    }

    /// Number of mounted elements, `body` included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Arena slots in use, live or unmounted, body included.
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Serializes the subtree at `id` as HTML.
    pub fn html_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Serializes the whole document.
    pub fn to_html(&self) -> String {
        self.html_of(self.body())
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(element) = self.get(id) else {
            return;
        };
        write_open_tag(
            out,
            &element.tag,
            element.id.as_deref(),
            &element.classes,
            &element.attrs,
            &element.style,
        );
        if let Some(text) = &element.text {
            out.push_str(&escape(text));
        }
        for &child in &element.children {
            self.write_html(child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }
}

impl Document for MemoryDocument {
    fn body(&self) -> NodeId {
        NodeId(0)
    }

    fn mount(&mut self, parent: Option<NodeId>, node: Node) -> NodeId {
        let parent = parent
            .filter(|&p| self.contains(p))
            .unwrap_or_else(|| self.body());
        let id = self.insert(parent, node);
        if let Some(element) = self.get_mut(parent) {
            element.children.push(id);
        }
        id
    }

    fn unmount(&mut self, id: NodeId) -> bool {
        if id == self.body() || !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(element) = self.get_mut(parent) {
                element.children.retain(|&c| c != id);
            }
        }
        self.drop_subtree(id);
        true
    }

    fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect(self.body(), selector, &mut out);
        out
    }

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.get(id).is_some_and(|e| e.matches(selector))
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|e| e.parent)
    }

    fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|e| e.tag.as_str())
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.get_mut(id) {
            element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.get_mut(id) {
            element.attrs.remove(name);
        }
    }

    fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|e| e.text.as_deref())
    }

    fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(element) = self.get_mut(id) {
            element.text = Some(text.to_string());
        }
    }

    fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.get(id)
            .and_then(|e| e.style.get(property))
            .map(String::as_str)
    }

    fn set_style(&mut self, id: NodeId, property: &str, value: Option<&str>) {
        if let Some(element) = self.get_mut(id) {
            match value {
                Some(value) if !value.is_empty() => {
                    element.style.insert(property.to_string(), value.to_string());
                }
                _ => {
                    element.style.remove(property);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Node {
        Node::div()
            .with_class("card clickable")
            .child(Node::new("span").with_class("title").with_text("维生素C"))
            .child(Node::new("img").with_attr("data-src", "/img/vc.png"))
    }

    #[test]
    fn test_mount_and_query() {
        let mut doc = MemoryDocument::new();
        let root = doc.mount(None, card());

        assert_eq!(doc.query(&Selector::class("card")), Some(root));
        let title = doc.query_within(root, &Selector::class("title")).unwrap();
        assert_eq!(doc.text(title), Some("维生素C"));
        assert_eq!(doc.parent(title), Some(root));
        assert_eq!(doc.query_all(&Selector::tag_with_attr("img", "data-src")).len(), 1);
        assert_eq!(doc.closest(title, &Selector::class("clickable")), Some(root));
    }

    #[test]
    fn test_unmount_removes_subtree() {
        let mut doc = MemoryDocument::new();
        let root = doc.mount(None, card());
        let title = doc.query(&Selector::class("title")).unwrap();

        assert!(doc.unmount(root));
        assert!(!doc.contains(title));
        assert!(!doc.unmount(root));
        assert!(doc.is_empty());

        // Fresh mounts never reuse the dead handle
        let again = doc.mount(None, card());
        assert_ne!(again, root);
        assert!(!doc.contains(root));
    }

    #[test]
    fn test_body_cannot_be_unmounted() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        assert!(!doc.unmount(body));
    }

    #[test]
    fn test_html_escapes_text_and_attributes() {
        let node = Node::div()
            .with_id("x")
            .with_class("toast show")
            .with_attr("title", "a\"b")
            .with_text("<b>&</b>");
        assert_eq!(
            node.to_html(),
            "<div id=\"x\" class=\"toast show\" title=\"a&quot;b\">&lt;b&gt;&amp;&lt;/b&gt;</div>"
        );

        let mut doc = MemoryDocument::new();
        doc.mount(None, node.clone());
        assert_eq!(doc.to_html(), format!("<body>{}</body>", node.to_html()));
    }

    #[test]
    fn test_style_and_visibility() {
        let mut doc = MemoryDocument::new();
        let id = doc.mount(None, Node::new("span").with_class("cart-badge"));

        assert!(doc.is_visible(id));
        doc.set_visible(id, false);
        assert!(!doc.is_visible(id));
        assert_eq!(doc.style(id, "display"), Some("none"));

        doc.set_style(id, "opacity", Some("0.7"));
        doc.set_style(id, "opacity", Some(""));
        assert_eq!(doc.style(id, "opacity"), None);
    }

    #[test]
    fn test_dead_handles_are_no_ops() {
        let mut doc = MemoryDocument::new();
        let id = doc.mount(None, Node::div());
        doc.unmount(id);

        doc.set_text(id, "x");
        doc.set_attr(id, "src", "y");
        assert_eq!(doc.text(id), None);
        assert_eq!(doc.attr(id, "src"), None);
        assert!(!doc.is_visible(id));
        assert_eq!(doc.closest(id, &Selector::class("any")), None);
    }

    #[test]
    fn test_unmounted_slots_are_never_reused() {
        let mut doc = MemoryDocument::new();
        let first = doc.mount(None, Node::div().child(Node::new("span")));
        doc.unmount(first);

        for _ in 0..50 {
            let id = doc.mount(None, Node::div().child(Node::new("span")));
            assert_ne!(id, first);
            doc.unmount(id);
        }

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.slot_count(), 1 + 51 * 2);
        assert!(!doc.contains(first));
    }
}
