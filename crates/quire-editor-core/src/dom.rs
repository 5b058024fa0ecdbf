//! DOM host abstraction.
//!
//! The `Dom` trait provides a common interface over tree-shaped documents,
//! allowing the engine to run against the browser DOM (see
//! `quire-editor-browser`) or against the arena-backed [`Document`] used for
//! tests and non-browser hosts.
//!
//! Node handles are cheap to clone and compare by identity. All text offsets
//! are in Unicode scalar values (chars), never bytes or UTF-16 units.
//!
//! [`Document`]: crate::document::Document

use std::cmp::Ordering;
use std::fmt;

use smol_str::SmolStr;

/// The kind of a DOM node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Document,
    DocumentFragment,
    /// Doctypes, processing instructions and anything else we never edit.
    Other,
}

/// A tree of nodes that the engine can read and mutate.
///
/// Read operations take `&self`; mutation primitives take `&mut self`. The
/// engine never keeps detached nodes around: anything created through
/// `create_element`/`create_text` is inserted by the very next step.
pub trait Dom {
    /// Handle to a node. Equality is node identity.
    type Node: Clone + PartialEq + fmt::Debug;

    fn node_type(&self, node: &Self::Node) -> NodeType;

    /// Upper-case tag name for elements, `#text`, `#comment`, `#document`
    /// or `#document-fragment` otherwise.
    fn node_name(&self, node: &Self::Node) -> SmolStr;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;

    fn last_child(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    fn prev_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Character data of text and comment nodes. `None` for everything else.
    fn text(&self, node: &Self::Node) -> Option<String>;

    /// Attribute value of an element. `None` for non-elements.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Value of a declaration in the element's `style` attribute.
    fn inline_style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Resolved value of a CSS property for an element.
    ///
    /// Returns `None` for non-elements or when the host cannot resolve the
    /// property.
    fn computed_style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Document order of two nodes, if the host has a native way to compute it.
    ///
    /// Hosts without one return `None` and callers fall back to comparing
    /// ancestor paths (see [`crate::nodes::compare_document_order`]).
    fn compare_position(&self, _a: &Self::Node, _b: &Self::Node) -> Option<Ordering> {
        None
    }

    /// Create a detached element with the given (case-insensitive) tag name.
    fn create_element(&mut self, name: &str) -> Self::Node;

    /// Create a detached text node.
    fn create_text(&mut self, data: &str) -> Self::Node;

    /// Insert `node` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. The node is detached from its old parent first.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        node: &Self::Node,
        reference: Option<&Self::Node>,
    );

    /// Detach `node` from its parent. Its own children stay attached to it.
    fn remove(&mut self, node: &Self::Node);

    /// Replace the character data of a text node.
    fn set_text(&mut self, node: &Self::Node, data: &str);

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Set a declaration in the element's `style` attribute.
    fn set_inline_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Clone a node, with its subtree when `deep` is set. The clone is detached.
    fn clone_node(&mut self, node: &Self::Node, deep: bool) -> Self::Node;

    /// Append `node` as the last child of `parent`.
    fn append(&mut self, parent: &Self::Node, node: &Self::Node) {
        self.insert_before(parent, node, None);
    }

    /// Insert `node` right after `reference`.
    fn insert_after(&mut self, reference: &Self::Node, node: &Self::Node) {
        if let Some(parent) = self.parent(reference) {
            let next = self.next_sibling(reference);
            self.insert_before(&parent, node, next.as_ref());
        }
    }

    /// Children of `node` in document order, as a non-live list.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node> {
        let mut children = Vec::new();
        let mut child = self.first_child(node);
        while let Some(current) = child {
            child = self.next_sibling(&current);
            children.push(current);
        }
        children
    }
}
