//! Arena-backed document implementing [`Dom`].
//!
//! `Document` is the in-memory host used for tests, server-side transforms
//! and any embedding that has no browser. Nodes live in a flat arena and are
//! addressed by [`NodeId`]; removed nodes are only detached, never freed, so
//! ids stay valid for the lifetime of the document.
//!
//! Computed styles come from a small user-agent stylesheet keyed by tag name,
//! overridden by `style` attributes, with inheritance for the properties that
//! inherit in CSS.

use smol_str::{SmolStr, ToSmolStr};

use crate::dom::{Dom, NodeType};

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Fragment,
    Element {
        name: SmolStr,
        attrs: Vec<(SmolStr, String)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeRecord {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An HTML document stored in an arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeRecord>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the document node.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.alloc(NodeData::Document);
        doc
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeRecord {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn record(&self, node: NodeId) -> &NodeRecord {
        &self.nodes[node.index()]
    }

    fn record_mut(&mut self, node: NodeId) -> &mut NodeRecord {
        &mut self.nodes[node.index()]
    }

    /// Create a detached document fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::Fragment)
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeData::Comment(data.to_string()))
    }

    /// Children of `node` as a slice of the arena's child list.
    pub fn child_ids(&self, node: NodeId) -> &[NodeId] {
        &self.record(node).children
    }

    /// Attributes of an element in source order.
    pub fn attributes(&self, node: NodeId) -> &[(SmolStr, String)] {
        match &self.record(node).data {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Remove an attribute from an element.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.record_mut(node).data {
            attrs.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.record(n).parent;
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.record(node).parent {
            self.record_mut(parent).children.retain(|c| *c != node);
            self.record_mut(node).parent = None;
        }
    }

    fn element_name(&self, node: NodeId) -> Option<&str> {
        match &self.record(node).data {
            NodeData::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    fn sibling(&self, node: NodeId, delta: isize) -> Option<NodeId> {
        let parent = self.record(node).parent?;
        let siblings = &self.record(parent).children;
        let index = siblings.iter().position(|c| *c == node)? as isize + delta;
        if index < 0 {
            return None;
        }
        siblings.get(index as usize).copied()
    }

    /// Resolve a property on a single element without inheritance.
    fn specified_style(&self, node: NodeId, property: &str) -> Option<String> {
        let value = self.inline_style(&node, property)?;
        if value.eq_ignore_ascii_case("inherit") {
            return None;
        }
        Some(value)
    }
}

/// Elements rendered as blocks by the user-agent stylesheet.
const BLOCK_DISPLAY: &[&str] = &[
    "ADDRESS", "ARTICLE", "ASIDE", "AUDIO", "BLOCKQUOTE", "BODY", "CANVAS", "CENTER", "DD",
    "DETAILS", "DIR", "DIV", "DL", "DT", "FIELDSET", "FIGCAPTION", "FIGURE", "FOOTER", "FORM",
    "H1", "H2", "H3", "H4", "H5", "H6", "HEADER", "HGROUP", "HR", "HTML", "LEGEND", "MAIN",
    "MENU", "NAV", "NOSCRIPT", "OL", "OUTPUT", "P", "PRE", "SECTION", "SUMMARY", "UL", "VIDEO",
];

const HIDDEN_DISPLAY: &[&str] = &[
    "BASE", "HEAD", "LINK", "META", "SCRIPT", "STYLE", "TEMPLATE", "TITLE",
];

const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "line-height",
    "text-align",
    "visibility",
    "white-space",
];

fn ua_display(name: &str) -> &'static str {
    match name {
        "LI" => "list-item",
        "TABLE" => "table",
        "CAPTION" => "table-caption",
        "THEAD" => "table-header-group",
        "TBODY" => "table-row-group",
        "TFOOT" => "table-footer-group",
        "TR" => "table-row",
        "TD" | "TH" => "table-cell",
        "COLGROUP" => "table-column-group",
        "COL" => "table-column",
        _ if BLOCK_DISPLAY.contains(&name) => "block",
        _ if HIDDEN_DISPLAY.contains(&name) => "none",
        _ => "inline",
    }
}

fn ua_property(name: &str, property: &str) -> Option<&'static str> {
    match (property, name) {
        ("white-space", "PRE" | "LISTING" | "XMP" | "PLAINTEXT") => Some("pre"),
        ("white-space", "TEXTAREA") => Some("pre-wrap"),
        ("white-space", "NOBR") => Some("nowrap"),
        ("font-weight", "B" | "STRONG" | "TH" | "H1" | "H2" | "H3" | "H4" | "H5" | "H6") => {
            Some("bold")
        }
        ("font-style", "I" | "EM" | "CITE" | "VAR" | "DFN" | "ADDRESS") => Some("italic"),
        ("font-family", "CODE" | "KBD" | "SAMP" | "PRE" | "TT") => Some("monospace"),
        ("text-decoration", "U" | "INS" | "A") => Some("underline"),
        ("text-decoration", "S" | "STRIKE" | "DEL") => Some("line-through"),
        ("vertical-align", "SUB") => Some("sub"),
        ("vertical-align", "SUP") => Some("super"),
        _ => None,
    }
}

fn initial_value(property: &str) -> Option<&'static str> {
    Some(match property {
        "white-space" => "normal",
        "color" => "rgb(0, 0, 0)",
        "font-family" => "serif",
        "font-size" => "16px",
        "font-style" => "normal",
        "font-weight" => "normal",
        "line-height" => "normal",
        "text-align" => "start",
        "visibility" => "visible",
        "text-decoration" => "none",
        "background-color" => "transparent",
        "vertical-align" => "baseline",
        _ => return None,
    })
}

/// Split a `style` attribute into lower-cased property names and values.
pub fn parse_declarations(style: &str) -> Vec<(SmolStr, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase().to_smolstr(), value.to_string()))
        })
        .collect()
}

/// Serialize declarations back into a `style` attribute value.
pub fn serialize_declarations(declarations: &[(SmolStr, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Dom for Document {
    type Node = NodeId;

    fn node_type(&self, node: &NodeId) -> NodeType {
        match self.record(*node).data {
            NodeData::Document => NodeType::Document,
            NodeData::Fragment => NodeType::DocumentFragment,
            NodeData::Element { .. } => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
        }
    }

    fn node_name(&self, node: &NodeId) -> SmolStr {
        match &self.record(*node).data {
            NodeData::Document => SmolStr::new_static("#document"),
            NodeData::Fragment => SmolStr::new_static("#document-fragment"),
            NodeData::Element { name, .. } => name.clone(),
            NodeData::Text(_) => SmolStr::new_static("#text"),
            NodeData::Comment(_) => SmolStr::new_static("#comment"),
        }
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.record(*node).parent
    }

    fn first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.record(*node).children.first().copied()
    }

    fn last_child(&self, node: &NodeId) -> Option<NodeId> {
        self.record(*node).children.last().copied()
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.sibling(*node, 1)
    }

    fn prev_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.sibling(*node, -1)
    }

    fn text(&self, node: &NodeId) -> Option<String> {
        match &self.record(*node).data {
            NodeData::Text(data) | NodeData::Comment(data) => Some(data.clone()),
            _ => None,
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.attributes(*node)
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn inline_style(&self, node: &NodeId, property: &str) -> Option<String> {
        let style = self.attribute(node, "style")?;
        parse_declarations(&style)
            .into_iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    fn computed_style(&self, node: &NodeId, property: &str) -> Option<String> {
        let name = self.element_name(*node)?;
        let property = property.to_ascii_lowercase();

        if property == "display" {
            return Some(
                self.specified_style(*node, "display")
                    .unwrap_or_else(|| ua_display(name).to_string()),
            );
        }

        if !INHERITED_PROPERTIES.contains(&property.as_str()) {
            return self
                .specified_style(*node, &property)
                .or_else(|| ua_property(name, &property).map(str::to_string))
                .or_else(|| initial_value(&property).map(str::to_string));
        }

        let mut current = Some(*node);
        while let Some(element) = current {
            if let Some(name) = self.element_name(element) {
                if let Some(value) = self.specified_style(element, &property) {
                    return Some(value);
                }
                if let Some(value) = ua_property(name, &property) {
                    return Some(value.to_string());
                }
            }
            current = self.record(element).parent;
        }
        initial_value(&property).map(str::to_string)
    }

    fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(NodeData::Element {
            name: name.to_ascii_uppercase().to_smolstr(),
            attrs: Vec::new(),
        })
    }

    fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeData::Text(data.to_string()))
    }

    fn insert_before(&mut self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) {
        if self.is_inclusive_ancestor(*node, *parent) {
            tracing::warn!(
                target: "quire::document",
                ?parent,
                ?node,
                "refusing to insert a node into its own subtree"
            );
            return;
        }
        self.detach(*node);
        let children = &mut self.nodes[parent.index()].children;
        let index = reference
            .and_then(|r| children.iter().position(|c| c == r))
            .unwrap_or(children.len());
        children.insert(index, *node);
        self.record_mut(*node).parent = Some(*parent);
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }

    fn set_text(&mut self, node: &NodeId, data: &str) {
        match &mut self.record_mut(*node).data {
            NodeData::Text(text) | NodeData::Comment(text) => {
                text.clear();
                text.push_str(data);
            }
            _ => {}
        }
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.record_mut(*node).data {
            match attrs.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
                Some(attr) => attr.1 = value.to_string(),
                None => attrs.push((name.to_ascii_lowercase().to_smolstr(), value.to_string())),
            }
        }
    }

    fn set_inline_style(&mut self, node: &NodeId, property: &str, value: &str) {
        if self.element_name(*node).is_none() {
            return;
        }
        let property = property.to_ascii_lowercase();
        let mut declarations = self
            .attribute(node, "style")
            .map(|s| parse_declarations(&s))
            .unwrap_or_default();
        declarations.retain(|(name, _)| *name != property);
        if !value.is_empty() {
            declarations.push((property.to_smolstr(), value.to_string()));
        }
        if declarations.is_empty() {
            self.remove_attribute(*node, "style");
        } else {
            let style = serialize_declarations(&declarations);
            self.set_attribute(node, "style", &style);
        }
    }

    fn clone_node(&mut self, node: &NodeId, deep: bool) -> NodeId {
        let data = self.record(*node).data.clone();
        let copy = self.alloc(data);
        if deep {
            let children = self.record(*node).children.clone();
            for child in children {
                let child_copy = self.clone_node(&child, true);
                self.record_mut(child_copy).parent = Some(copy);
                self.record_mut(copy).children.push(child_copy);
            }
        }
        copy
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.record(*node).children.clone()
    }
}
