//! Node predicates and position arithmetic.
//!
//! Everything here is a pure query over a [`Dom`]. Names are compared in the
//! upper-case form returned by [`Dom::node_name`].

use std::cmp::Ordering;

use crate::dom::{Dom, NodeType};

/// HTML elements that never have content.
pub const VOID_ELEMENTS: &[&str] = &[
    "AREA", "BASE", "BR", "COL", "COMMAND", "EMBED", "HR", "IMG", "INPUT", "KEYGEN", "LINK",
    "META", "PARAM", "SOURCE", "TRACK", "WBR",
];

/// Elements that are block level by their tag alone.
pub const BLOCK_LEVEL_ELEMENTS: &[&str] = &[
    "ADDRESS", "ARTICLE", "ASIDE", "AUDIO", "BLOCKQUOTE", "CANVAS", "DD", "DIV", "DL",
    "FIELDSET", "FIGCAPTION", "FIGURE", "FOOTER", "FORM", "H1", "H2", "H3", "H4", "H5", "H6",
    "HEADER", "HGROUP", "HR", "NOSCRIPT", "OL", "OUTPUT", "P", "PRE", "SECTION", "TABLE", "TFOOT",
    "UL", "VIDEO",
];

/// Text-level semantic elements.
pub const TEXT_LEVEL_SEMANTIC_ELEMENTS: &[&str] = &[
    "A", "ABBR", "B", "BDI", "BDO", "BR", "CITE", "CODE", "DATA", "DFN", "EM", "I", "KBD", "MARK",
    "Q", "RP", "RT", "RUBY", "S", "SAMP", "SMALL", "SPAN", "STRONG", "SUB", "SUP", "TIME", "U",
    "VAR", "WBR",
];

pub const LIST_CONTAINERS: &[&str] = &["OL", "UL", "DL", "MENU"];

pub const LIST_ITEMS: &[&str] = &["LI", "DT", "DD"];

/// Elements that cannot simply be unwrapped because their children depend
/// on them.
pub const GROUP_CONTAINERS: &[&str] = &[
    "FIELDSET", "OBJECT", "FIGURE", "AUDIO", "SELECT", "COLGROUP", "HGROUP", "TABLE", "TBODY",
    "TR", "OL", "UL", "DL", "MENU",
];

pub const HEADINGS: &[&str] = &["H1", "H2", "H3", "H4", "H5", "H6"];

/// Whether an upper-case tag name names a void element.
pub fn is_void_name(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub fn is_text_node<D: Dom>(dom: &D, node: &D::Node) -> bool {
    dom.node_type(node) == NodeType::Text
}

pub fn is_element_node<D: Dom>(dom: &D, node: &D::Node) -> bool {
    dom.node_type(node) == NodeType::Element
}

pub fn is_fragment_node<D: Dom>(dom: &D, node: &D::Node) -> bool {
    dom.node_type(node) == NodeType::DocumentFragment
}

pub fn is_void_node<D: Dom>(dom: &D, node: &D::Node) -> bool {
    is_element_node(dom, node) && is_void_name(&dom.node_name(node))
}

/// Block level by tag name, regardless of styling.
pub fn is_block_node<D: Dom>(dom: &D, node: &D::Node) -> bool {
    BLOCK_LEVEL_ELEMENTS.contains(&dom.node_name(node).as_str())
}

pub fn is_inline_node<D: Dom>(dom: &D, node: &D::Node) -> bool {
    !is_block_node(dom, node)
}

pub fn is_text_level_semantic_node<D: Dom>(dom: &D, node: &D::Node) -> bool {
    TEXT_LEVEL_SEMANTIC_ELEMENTS.contains(&dom.node_name(node).as_str())
}

pub fn is_list_container<D: Dom>(dom: &D, node: &D::Node) -> bool {
    LIST_CONTAINERS.contains(&dom.node_name(node).as_str())
}

pub fn is_list_item<D: Dom>(dom: &D, node: &D::Node) -> bool {
    LIST_ITEMS.contains(&dom.node_name(node).as_str())
}

pub fn is_group_container<D: Dom>(dom: &D, node: &D::Node) -> bool {
    GROUP_CONTAINERS.contains(&dom.node_name(node).as_str())
}

/// Parents an element of this kind may appear under, if it is restricted.
pub fn grouping_parents(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "LI" => Some(&["OL", "UL", "DL", "MENU"]),
        "DT" | "DD" => Some(&["DL"]),
        "TBODY" => Some(&["TABLE"]),
        "TR" | "TH" => Some(&["TABLE", "TBODY"]),
        "TD" => Some(&["TR", "TH"]),
        _ => None,
    }
}

/// Elements that only make sense as direct children of a specific parent.
pub fn is_grouped_element<D: Dom>(dom: &D, node: &D::Node) -> bool {
    grouping_parents(&dom.node_name(node)).is_some()
}

pub fn is_heading<D: Dom>(dom: &D, node: &D::Node) -> bool {
    HEADINGS.contains(&dom.node_name(node).as_str())
}

fn content_editable<D: Dom>(dom: &D, node: &D::Node) -> Option<String> {
    if !is_element_node(dom, node) {
        return None;
    }
    dom.attribute(node, "contenteditable")
        .map(|v| v.trim().to_ascii_lowercase())
}

/// An element whose `contenteditable` attribute is `true` or empty.
pub fn is_editing_host<D: Dom>(dom: &D, node: &D::Node) -> bool {
    content_editable(dom, node).is_some_and(|v| v.is_empty() || v == "true")
}

/// An element explicitly marked `contenteditable="false"`.
pub fn is_non_editable<D: Dom>(dom: &D, node: &D::Node) -> bool {
    content_editable(dom, node).is_some_and(|v| v == "false")
}

/// The nearest editing host containing `node`, `node` itself included.
pub fn editing_host<D: Dom>(dom: &D, node: &D::Node) -> Option<D::Node> {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if is_editing_host(dom, &n) {
            return Some(n);
        }
        current = dom.parent(&n);
    }
    None
}

/// Whether `node` behaves like a void element for editing.
///
/// True for void tags, and for elements that are, or sit inside, an element
/// marked non-editable below the nearest editing host. Those are opaque
/// widgets embedded in editable content.
pub fn is_void_type<D: Dom>(dom: &D, node: &D::Node) -> bool {
    if is_void_node(dom, node) {
        return true;
    }
    if !is_element_node(dom, node) {
        return false;
    }
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if is_editing_host(dom, &n) {
            return false;
        }
        if is_non_editable(dom, &n) {
            return true;
        }
        current = dom.parent(&n);
    }
    false
}

/// Zero-based position of `node` among its siblings.
pub fn node_index<D: Dom>(dom: &D, node: &D::Node) -> usize {
    let mut index = 0;
    let mut current = dom.prev_sibling(node);
    while let Some(prev) = current {
        index += 1;
        current = dom.prev_sibling(&prev);
    }
    index
}

pub fn num_children<D: Dom>(dom: &D, node: &D::Node) -> usize {
    let mut count = 0;
    let mut child = dom.first_child(node);
    while let Some(c) = child {
        count += 1;
        child = dom.next_sibling(&c);
    }
    count
}

pub fn has_children<D: Dom>(dom: &D, node: &D::Node) -> bool {
    dom.first_child(node).is_some()
}

/// Length of a node in boundary offsets: child count for containers, char
/// count for text, zero for everything else.
pub fn node_length<D: Dom>(dom: &D, node: &D::Node) -> usize {
    match dom.node_type(node) {
        NodeType::Element | NodeType::DocumentFragment | NodeType::Document => {
            num_children(dom, node)
        }
        NodeType::Text => dom.text(node).map_or(0, |t| t.chars().count()),
        NodeType::Comment | NodeType::Other => 0,
    }
}

pub fn nth_child<D: Dom>(dom: &D, node: &D::Node, n: usize) -> Option<D::Node> {
    let mut child = dom.first_child(node);
    for _ in 0..n {
        child = dom.next_sibling(&child?);
    }
    child
}

pub fn is_empty_text_node<D: Dom>(dom: &D, node: &D::Node) -> bool {
    is_text_node(dom, node) && node_length(dom, node) == 0
}

/// The node a boundary at `(container, offset)` points at.
///
/// For an element this is the child at `offset`, or the container itself
/// when the offset is at the end. A boundary at the end of a non-empty text
/// node points at the text's next sibling, or its parent.
pub fn node_at_offset<D: Dom>(dom: &D, container: &D::Node, offset: usize) -> D::Node {
    if is_element_node(dom, container) && offset < node_length(dom, container) {
        if let Some(child) = nth_child(dom, container, offset) {
            return child;
        }
    } else if is_text_node(dom, container)
        && !is_empty_text_node(dom, container)
        && offset == node_length(dom, container)
    {
        if let Some(next) = dom.next_sibling(container).or_else(|| dom.parent(container)) {
            return next;
        }
    }
    container.clone()
}

/// Whether `b` is a strict descendant of `a`.
pub fn contains<D: Dom>(dom: &D, a: &D::Node, b: &D::Node) -> bool {
    let mut current = dom.parent(b);
    while let Some(n) = current {
        if n == *a {
            return true;
        }
        current = dom.parent(&n);
    }
    false
}

fn path_from_root<D: Dom>(dom: &D, node: &D::Node) -> Vec<D::Node> {
    let mut path = vec![node.clone()];
    let mut current = dom.parent(node);
    while let Some(n) = current {
        current = dom.parent(&n);
        path.push(n);
    }
    path.reverse();
    path
}

/// Document order of two nodes. An ancestor precedes its descendants.
///
/// Uses [`Dom::compare_position`] when the host provides it and compares
/// ancestor paths otherwise. Nodes in disconnected trees compare equal.
pub fn compare_document_order<D: Dom>(dom: &D, a: &D::Node, b: &D::Node) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    if let Some(order) = dom.compare_position(a, b) {
        return order;
    }
    let path_a = path_from_root(dom, a);
    let path_b = path_from_root(dom, b);
    if path_a.first() != path_b.first() {
        tracing::debug!(target: "quire::nodes", ?a, ?b, "comparing nodes in disconnected trees");
        return Ordering::Equal;
    }
    for (x, y) in path_a.iter().zip(path_b.iter()) {
        if x != y {
            return node_index(dom, x).cmp(&node_index(dom, y));
        }
    }
    path_a.len().cmp(&path_b.len())
}

/// Whether `b` comes after `a` in document order.
pub fn follows<D: Dom>(dom: &D, a: &D::Node, b: &D::Node) -> bool {
    compare_document_order(dom, a, b) == Ordering::Less
}

/// Translate between real child indices and normalized ones, where each
/// run of adjacent text siblings counts as a single position and a run of
/// only empty text nodes counts as none.
///
/// Exactly one of the targets is finite; pass `usize::MAX` for the other.
/// Indices past the end clamp to the last position reached.
fn translate_node_index<D: Dom>(
    dom: &D,
    element: &D::Node,
    normalized_index: usize,
    real_index: usize,
) -> usize {
    let mut index = 0;
    let mut current_normalized = 0;
    let mut child = dom.first_child(element);
    loop {
        if current_normalized >= normalized_index {
            return index;
        }
        if index >= real_index {
            return current_normalized;
        }
        let Some(node) = child.take() else {
            break;
        };
        if is_text_node(dom, &node) {
            let mut non_empty_real_index = None;
            let mut run = Some(node);
            while let Some(text) = run.take() {
                if !is_text_node(dom, &text) {
                    run = Some(text);
                    break;
                }
                if !is_empty_text_node(dom, &text) {
                    non_empty_real_index = Some(index);
                }
                run = dom.next_sibling(&text);
                index += 1;
                if run.is_none() {
                    break;
                }
            }
            child = run;
            if let Some(real) = non_empty_real_index {
                if real >= real_index {
                    return current_normalized;
                }
                current_normalized += 1;
            }
        } else {
            child = dom.next_sibling(&node);
            index += 1;
            current_normalized += 1;
        }
    }
    if real_index == usize::MAX {
        index
    } else {
        current_normalized
    }
}

pub fn real_from_normalized_index<D: Dom>(
    dom: &D,
    element: &D::Node,
    normalized_index: usize,
) -> usize {
    translate_node_index(dom, element, normalized_index, usize::MAX)
}

pub fn normalized_from_real_index<D: Dom>(dom: &D, element: &D::Node, real_index: usize) -> usize {
    translate_node_index(dom, element, usize::MAX, real_index)
}

pub fn normalized_num_children<D: Dom>(dom: &D, element: &D::Node) -> usize {
    normalized_from_real_index(dom, element, num_children(dom, element))
}

pub fn normalized_node_index<D: Dom>(dom: &D, node: &D::Node) -> usize {
    match dom.parent(node) {
        Some(parent) => normalized_from_real_index(dom, &parent, node_index(dom, node)),
        None => 0,
    }
}

pub fn normalized_nth_child<D: Dom>(
    dom: &D,
    element: &D::Node,
    normalized_index: usize,
) -> Option<D::Node> {
    nth_child(
        dom,
        element,
        real_from_normalized_index(dom, element, normalized_index),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, NodeId};

    fn fixture(html: &str) -> (Document, NodeId) {
        let (doc, host) = Document::editable(html).unwrap();
        (doc, host)
    }

    #[test]
    fn test_lengths() {
        let (doc, host) = fixture("<p>héllo<br></p><!--x-->");
        let p = doc.children(&host)[0];
        let text = doc.children(&p)[0];
        let comment = doc.children(&host)[1];
        assert_eq!(node_length(&doc, &host), 2);
        assert_eq!(node_length(&doc, &p), 2);
        assert_eq!(node_length(&doc, &text), 5);
        assert_eq!(node_length(&doc, &comment), 0);
        assert_eq!(node_index(&doc, &comment), 1);
    }

    #[test]
    fn test_node_at_offset() {
        let (doc, host) = fixture("<p>ab</p><i>x</i>");
        let p = doc.children(&host)[0];
        let i = doc.children(&host)[1];
        let text = doc.children(&p)[0];
        assert_eq!(node_at_offset(&doc, &host, 1), i);
        assert_eq!(node_at_offset(&doc, &host, 2), host);
        assert_eq!(node_at_offset(&doc, &text, 1), text);
        assert_eq!(node_at_offset(&doc, &text, 2), p);
    }

    #[test]
    fn test_void_type() {
        let (doc, host) =
            fixture(r#"<p><img><span contenteditable="false"><b>x</b></span><b>y</b></p>"#);
        let p = doc.children(&host)[0];
        let kids = doc.children(&p);
        let widget = kids[1];
        let inner = doc.children(&widget)[0];
        assert!(is_void_type(&doc, &kids[0]));
        assert!(is_void_type(&doc, &widget));
        assert!(is_void_type(&doc, &inner));
        assert!(!is_void_type(&doc, &kids[2]));
        assert!(!is_void_type(&doc, &p));
        assert_eq!(editing_host(&doc, &inner), Some(host));
    }

    #[test]
    fn test_contains_and_order() {
        let (doc, host) = fixture("<p>a<b>b</b></p><p>c</p>");
        let first = doc.children(&host)[0];
        let second = doc.children(&host)[1];
        let b = doc.children(&first)[1];
        assert!(contains(&doc, &host, &b));
        assert!(!contains(&doc, &b, &b));
        assert!(!contains(&doc, &second, &b));
        assert_eq!(compare_document_order(&doc, &b, &second), Ordering::Less);
        assert_eq!(compare_document_order(&doc, &second, &b), Ordering::Greater);
        assert_eq!(compare_document_order(&doc, &first, &b), Ordering::Less);
        assert!(follows(&doc, &first, &second));
    }

    /// `[a][][b]<i></i>[][]` laid out as real children.
    fn split_text_fixture() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.create_element("p");
        doc.append(&root, &p);
        for data in ["a", "", "b"] {
            let t = doc.create_text(data);
            doc.append(&p, &t);
        }
        let i = doc.create_element("i");
        doc.append(&p, &i);
        for _ in 0..2 {
            let t = doc.create_text("");
            doc.append(&p, &t);
        }
        (doc, p)
    }

    #[test]
    fn test_normalized_indices() {
        let (doc, p) = split_text_fixture();
        assert_eq!(num_children(&doc, &p), 6);
        assert_eq!(normalized_num_children(&doc, &p), 2);
        assert_eq!(normalized_from_real_index(&doc, &p, 0), 0);
        assert_eq!(normalized_from_real_index(&doc, &p, 2), 0);
        assert_eq!(normalized_from_real_index(&doc, &p, 3), 1);
        assert_eq!(normalized_from_real_index(&doc, &p, 6), 2);
        assert_eq!(real_from_normalized_index(&doc, &p, 0), 0);
        assert_eq!(real_from_normalized_index(&doc, &p, 1), 3);
        let i = doc.children(&p)[3];
        assert_eq!(normalized_node_index(&doc, &i), 1);
        assert_eq!(normalized_nth_child(&doc, &p, 1), Some(i));
    }

    #[test]
    fn test_normalized_round_trip() {
        let (doc, p) = split_text_fixture();
        for real in 0..=num_children(&doc, &p) {
            let normalized = normalized_from_real_index(&doc, &p, real);
            let back = real_from_normalized_index(&doc, &p, normalized);
            assert_eq!(normalized_from_real_index(&doc, &p, back), normalized);
        }
    }
}
