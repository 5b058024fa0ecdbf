//! [`Dom`] over the live browser document.
//!
//! The engine counts text offsets in chars while native ranges and
//! selections count UTF-16 code units. [`boundary_from_native`] and
//! [`native_offset`] convert at the edge.

use std::cmp::Ordering;

use quire_editor_core::{Boundary, Dom, NodeType};
use smol_str::SmolStr;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Node};

use crate::error::PlatformError;

/// The browser document as an editing host.
#[derive(Debug, Clone)]
pub struct BrowserDom {
    document: web_sys::Document,
}

impl BrowserDom {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The document of the current window.
    pub fn from_window() -> Result<Self, PlatformError> {
        let window = web_sys::window().ok_or(PlatformError::NoWindow)?;
        let document = window.document().ok_or(PlatformError::NoDocument)?;
        Ok(Self::new(document))
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    fn fragment(&self) -> Node {
        self.document.create_document_fragment().into()
    }
}

/// Char offset of the UTF-16 offset `units` in `text`.
///
/// An offset that falls inside a surrogate pair rounds up to the next char.
pub fn utf16_to_char(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (index, c) in text.chars().enumerate() {
        if seen >= units {
            return index;
        }
        seen += c.len_utf16();
    }
    text.chars().count()
}

/// UTF-16 offset of the char offset `chars` in `text`.
pub fn char_to_utf16(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

fn is_character_data(node: &Node) -> bool {
    matches!(
        node.node_type(),
        Node::TEXT_NODE | Node::CDATA_SECTION_NODE | Node::COMMENT_NODE
    )
}

/// Boundary for a native `(container, offset)` pair.
pub fn boundary_from_native(container: Node, offset: u32) -> Boundary<Node> {
    let offset = match container.node_value() {
        Some(text) if is_character_data(&container) => utf16_to_char(&text, offset as usize),
        _ => offset as usize,
    };
    Boundary::new(container, offset)
}

/// Native offset of a boundary, in UTF-16 units for text containers.
pub fn native_offset(boundary: &Boundary<Node>) -> u32 {
    let container = &boundary.container;
    let offset = match container.node_value() {
        Some(text) if is_character_data(container) => char_to_utf16(&text, boundary.offset),
        _ => boundary.offset,
    };
    u32::try_from(offset).unwrap_or(u32::MAX)
}

impl Dom for BrowserDom {
    type Node = Node;

    fn node_type(&self, node: &Node) -> NodeType {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeType::Element,
            Node::TEXT_NODE | Node::CDATA_SECTION_NODE => NodeType::Text,
            Node::COMMENT_NODE => NodeType::Comment,
            Node::DOCUMENT_NODE => NodeType::Document,
            Node::DOCUMENT_FRAGMENT_NODE => NodeType::DocumentFragment,
            _ => NodeType::Other,
        }
    }

    fn node_name(&self, node: &Node) -> SmolStr {
        let name = node.node_name();
        if node.node_type() == Node::ELEMENT_NODE {
            // Foreign (SVG, MathML) elements keep their case in nodeName.
            SmolStr::new(name.to_ascii_uppercase())
        } else {
            SmolStr::new(name)
        }
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn first_child(&self, node: &Node) -> Option<Node> {
        node.first_child()
    }

    fn last_child(&self, node: &Node) -> Option<Node> {
        node.last_child()
    }

    fn next_sibling(&self, node: &Node) -> Option<Node> {
        node.next_sibling()
    }

    fn prev_sibling(&self, node: &Node) -> Option<Node> {
        node.previous_sibling()
    }

    fn text(&self, node: &Node) -> Option<String> {
        if is_character_data(node) {
            node.node_value()
        } else {
            None
        }
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn inline_style(&self, node: &Node, property: &str) -> Option<String> {
        node.dyn_ref::<HtmlElement>()?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn computed_style(&self, node: &Node, property: &str) -> Option<String> {
        let element = node.dyn_ref::<Element>()?;
        let window = self.document.default_view()?;
        window
            .get_computed_style(element)
            .ok()??
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn compare_position(&self, a: &Node, b: &Node) -> Option<Ordering> {
        if a == b {
            return Some(Ordering::Equal);
        }
        let position = a.compare_document_position(b);
        if position & Node::DOCUMENT_POSITION_DISCONNECTED != 0 {
            None
        } else if position & Node::DOCUMENT_POSITION_FOLLOWING != 0 {
            Some(Ordering::Less)
        } else if position & Node::DOCUMENT_POSITION_PRECEDING != 0 {
            Some(Ordering::Greater)
        } else {
            None
        }
    }

    fn create_element(&mut self, name: &str) -> Node {
        match self.document.create_element(name) {
            Ok(element) => element.into(),
            Err(err) => {
                tracing::error!(target: "quire::browser", name, ?err, "create_element failed");
                self.fragment()
            }
        }
    }

    fn create_text(&mut self, data: &str) -> Node {
        self.document.create_text_node(data).into()
    }

    fn insert_before(&mut self, parent: &Node, node: &Node, reference: Option<&Node>) {
        if let Err(err) = parent.insert_before(node, reference) {
            tracing::warn!(target: "quire::browser", ?err, "insert_before failed");
        }
    }

    fn remove(&mut self, node: &Node) {
        let Some(parent) = node.parent_node() else {
            return;
        };
        if let Err(err) = parent.remove_child(node) {
            tracing::warn!(target: "quire::browser", ?err, "remove_child failed");
        }
    }

    fn set_text(&mut self, node: &Node, data: &str) {
        node.set_node_value(Some(data));
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) {
        let Some(element) = node.dyn_ref::<Element>() else {
            return;
        };
        if let Err(err) = element.set_attribute(name, value) {
            tracing::warn!(target: "quire::browser", name, ?err, "set_attribute failed");
        }
    }

    fn set_inline_style(&mut self, node: &Node, property: &str, value: &str) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(drop)
        } else {
            style.set_property(property, value)
        };
        if let Err(err) = result {
            tracing::warn!(target: "quire::browser", property, ?err, "style update failed");
        }
    }

    fn clone_node(&mut self, node: &Node, deep: bool) -> Node {
        match node.clone_node_with_deep(deep) {
            Ok(clone) => clone,
            Err(err) => {
                tracing::error!(target: "quire::browser", ?err, "clone_node failed");
                self.fragment()
            }
        }
    }
}
