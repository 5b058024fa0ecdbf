//! Rendering classifier.
//!
//! Decides whether a node contributes anything visible once the browser has
//! collapsed whitespace, dropped empty inline elements and swallowed
//! trailing line breaks. All checks are read-only and total: they walk only
//! within the node's tree and stop at line-breaking nodes or the editing
//! host.

use crate::cursor::Cursor;
use crate::dom::Dom;
use crate::nodes::{
    is_block_node, is_editing_host, is_element_node, is_inline_node, is_text_node, is_void_node,
    node_length, LIST_ITEMS,
};
use crate::strings::is_collapsible_run;
use crate::styles::{
    has_inline_style, has_linebreaking_style, is_white_space_preserve_style,
    LINE_BREAKING_VOID_ELEMENTS,
};
use crate::traversing::{next_non_ancestor, next_while, prev_while};

/// Whether a text node is whitespace that collapses away, judged from the
/// node alone.
///
/// This gives false positives (a space between two words of different
/// inline elements is reported) but never false negatives.
pub fn is_unrendered_whitespace_no_block_check<D: Dom>(dom: &D, node: &D::Node) -> bool {
    if !is_text_node(dom, node) {
        return false;
    }
    let text = dom.text(node).unwrap_or_default();
    if text.is_empty() {
        return true;
    }
    if !is_collapsible_run(&text) {
        return false;
    }
    let white_space = dom
        .parent(node)
        .and_then(|parent| dom.computed_style(&parent, "white-space"));
    match white_space.as_deref() {
        Some(value) if is_white_space_preserve_style(value) => false,
        Some("pre-line") => !text.contains(['\n', '\r']),
        _ => true,
    }
}

/// Whether the position the cursor is at can be skipped when looking for
/// the end of a line.
fn is_unrendered_at_point<D: Dom>(dom: &D, point: &Cursor<D::Node>) -> bool {
    is_unrendered_whitespace_no_block_check(dom, &point.node)
        || (is_element_node(dom, &point.node)
            && has_inline_style(dom, &point.node)
            && !LINE_BREAKING_VOID_ELEMENTS.contains(&dom.node_name(&point.node).as_str()))
}

/// Move `point` forward to the end of its line, passing only unrendered
/// positions. Returns `false`, leaving `point` untouched, when rendered
/// content is in the way.
fn skip_unrendered_to_end_of_line<D: Dom>(dom: &D, point: &mut Cursor<D::Node>) -> bool {
    let mut cursor = point.clone();
    cursor.next_while(dom, is_unrendered_at_point);
    if !has_linebreaking_style(dom, &cursor.node) {
        return false;
    }
    *point = cursor;
    true
}

/// Move `point` back to the start of its line. Mirror of
/// [`skip_unrendered_to_end_of_line`].
fn skip_unrendered_to_start_of_line<D: Dom>(dom: &D, point: &mut Cursor<D::Node>) -> bool {
    let mut cursor = point.clone();
    cursor.prev(dom);
    cursor.prev_while(dom, is_unrendered_at_point);
    if !has_linebreaking_style(dom, &cursor.node) {
        return false;
    }
    let is_br = dom.node_name(&cursor.node) == "BR";
    cursor.next(dom);
    // A point right of the last br in a block is still on the br's line.
    if is_br {
        let mut end_of_block = point.clone();
        if skip_unrendered_to_end_of_line(dom, &mut end_of_block) && end_of_block.at_end {
            cursor.skip_prev(dom);
            cursor.prev_while(dom, is_unrendered_at_point);
            if !has_linebreaking_style(dom, &cursor.node) {
                return false;
            }
            cursor.next(dom);
        }
    }
    *point = cursor;
    true
}

/// Whether `node` is whitespace that collapses away in its context.
pub fn is_unrendered_whitespace<D: Dom>(dom: &D, node: &D::Node) -> bool {
    if !is_unrendered_whitespace_no_block_check(dom, node) {
        return false;
    }
    skip_unrendered_to_end_of_line(dom, &mut Cursor::new(node.clone(), false))
        || skip_unrendered_to_start_of_line(dom, &mut Cursor::new(node.clone(), false))
}

fn is_terminal_node<D: Dom>(dom: &D, node: &D::Node) -> bool {
    dom.parent(node).is_some()
        && (dom.prev_sibling(node).is_none() || dom.next_sibling(node).is_none())
}

fn is_adjacent_to_block<D: Dom>(dom: &D, node: &D::Node) -> bool {
    dom.prev_sibling(node)
        .is_some_and(|prev| is_block_node(dom, &prev))
        || dom
            .next_sibling(node)
            .is_some_and(|next| is_block_node(dom, &next))
}

/// Whether `node` holds something that renders regardless of its
/// neighbours: visible text or a void element, at any depth.
fn has_visible_content<D: Dom>(dom: &D, node: &D::Node) -> bool {
    if is_text_node(dom, node) {
        return !is_unrendered_whitespace_no_block_check(dom, node);
    }
    if is_void_node(dom, node) {
        return true;
    }
    dom.children(node)
        .iter()
        .any(|child| has_visible_content(dom, child))
}

/// Look for rendered inline content next to `node` on one side, without
/// crossing a line-breaking node or the editing host.
fn has_inline_neighbour<D: Dom>(dom: &D, node: &D::Node, backwards: bool) -> bool {
    next_non_ancestor(
        dom,
        node,
        backwards,
        |n| is_inline_node(dom, n) && has_visible_content(dom, n),
        |n| has_linebreaking_style(dom, n) || is_editing_host(dom, n),
    )
    .is_some()
}

/// Whether a `br` inside a line-breaking parent collapses.
///
/// A br ends the line it is on. When the line ends with it, because nothing
/// rendered follows or a block follows, and the line holds inline content,
/// the break only closes that line and renders nothing of its own. A br
/// that follows another br, a block, or nothing at all opens an empty line
/// and is rendered.
fn is_unrendered_br<D: Dom>(dom: &D, br: &D::Node) -> bool {
    // Sibling brs are never skipped so two breaks never judge each other.
    let skippable = |n: &D::Node| dom.node_name(n) != "BR" && is_unrendered(dom, n);
    let after = next_while(dom, dom.next_sibling(br), skippable);
    if let Some(next) = after {
        if dom.node_name(&next) == "BR" || !has_linebreaking_style(dom, &next) {
            return false;
        }
    }
    let before = prev_while(dom, dom.prev_sibling(br), skippable);
    match before {
        Some(prev) => dom.node_name(&prev) != "BR" && !has_linebreaking_style(dom, &prev),
        None => false,
    }
}

/// Whether `node` renders nothing visible.
pub fn is_unrendered<D: Dom>(dom: &D, node: &D::Node) -> bool {
    let name = dom.node_name(node);
    if !is_void_node(dom, node)
        && !LIST_ITEMS.contains(&name.as_str())
        && node_length(dom, node) == 0
    {
        return true;
    }

    if let Some(first) = dom.first_child(node) {
        if next_while(dom, Some(first), |n| is_unrendered(dom, n)).is_none() {
            return true;
        }
    }

    let maybe_unrendered = is_unrendered_whitespace_no_block_check(dom, node);

    if !maybe_unrendered && name == "BR" {
        let in_line_breaking_parent = dom
            .parent(node)
            .is_some_and(|parent| has_linebreaking_style(dom, &parent));
        return in_line_breaking_parent && is_unrendered_br(dom, node);
    }

    if !maybe_unrendered {
        return false;
    }

    if is_terminal_node(dom, node) {
        return !(has_inline_neighbour(dom, node, true) && has_inline_neighbour(dom, node, false));
    }

    is_adjacent_to_block(dom, node)
        || skip_unrendered_to_end_of_line(dom, &mut Cursor::new(node.clone(), false))
        || skip_unrendered_to_start_of_line(dom, &mut Cursor::new(node.clone(), false))
}

pub fn is_rendered<D: Dom>(dom: &D, node: &D::Node) -> bool {
    !is_unrendered(dom, node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, NodeId};

    fn host_children(html: &str) -> (Document, Vec<NodeId>) {
        let (doc, host) = Document::editable(html).unwrap();
        let kids = doc.children(&host);
        (doc, kids)
    }

    #[test]
    fn test_empty_elements() {
        let (doc, kids) = host_children("<p></p><ul><li></li></ul><p><img></p>");
        assert!(is_unrendered(&doc, &kids[0]));
        let li = doc.children(&kids[1])[0];
        assert!(is_rendered(&doc, &li));
        assert!(is_rendered(&doc, &kids[1]));
        assert!(is_rendered(&doc, &kids[2]));
    }

    #[test]
    fn test_empty_inline_between_text() {
        let (doc, kids) = host_children("<p>a<b></b>b</p>");
        let b = doc.children(&kids[0])[1];
        assert!(is_unrendered(&doc, &b));
        assert!(is_rendered(&doc, &kids[0]));
    }

    #[test]
    fn test_whitespace_between_blocks() {
        let (doc, kids) = host_children("<p>a</p>\n  <p>b</p>");
        assert!(is_unrendered_whitespace_no_block_check(&doc, &kids[1]));
        assert!(is_unrendered(&doc, &kids[1]));
        assert!(is_unrendered_whitespace(&doc, &kids[1]));
    }

    #[test]
    fn test_whitespace_between_words() {
        let (doc, kids) = host_children("<p><b>a</b> <i>b</i></p>");
        let space = doc.children(&kids[0])[1];
        assert!(is_unrendered_whitespace_no_block_check(&doc, &space));
        assert!(is_rendered(&doc, &space));
        assert!(!is_unrendered_whitespace(&doc, &space));
    }

    #[test]
    fn test_terminal_whitespace() {
        let (doc, kids) = host_children("<p> <b>a</b> </p>");
        let p_kids = doc.children(&kids[0]);
        assert!(is_unrendered(&doc, &p_kids[0]));
        assert!(is_unrendered(&doc, &p_kids[2]));
        assert!(is_rendered(&doc, &p_kids[1]));
    }

    #[test]
    fn test_terminal_whitespace_inside_inline() {
        let (doc, kids) = host_children("<p>a<b> </b>c</p>");
        let b = doc.children(&kids[0])[1];
        let space = doc.children(&b)[0];
        assert!(is_rendered(&doc, &space));
        assert!(is_rendered(&doc, &b));
    }

    #[test]
    fn test_preserved_whitespace() {
        let (doc, kids) = host_children("<pre> </pre><p style=\"white-space: pre-line\">\n</p>");
        let pre_space = doc.children(&kids[0])[0];
        let line_feed = doc.children(&kids[1])[0];
        assert!(!is_unrendered_whitespace_no_block_check(&doc, &pre_space));
        assert!(is_rendered(&doc, &kids[0]));
        assert!(!is_unrendered_whitespace_no_block_check(&doc, &line_feed));
    }

    #[test]
    fn test_trailing_br_after_text_collapses() {
        let (doc, kids) = host_children("<p>one<br></p>");
        let br = doc.children(&kids[0])[1];
        assert!(is_unrendered(&doc, &br));
    }

    #[test]
    fn test_br_after_br_is_rendered() {
        let (doc, kids) = host_children("<p>one<br><br></p>");
        let p_kids = doc.children(&kids[0]);
        assert!(is_rendered(&doc, &p_kids[1]));
        assert!(is_rendered(&doc, &p_kids[2]));
    }

    #[test]
    fn test_br_before_block_collapses() {
        let (doc, kids) =
            host_children("<div>x<br><p>y</p></div><div><p>a</p><br><p>b</p></div>");
        let before_block = doc.children(&kids[0])[1];
        let between_blocks = doc.children(&kids[1])[1];
        assert!(is_unrendered(&doc, &before_block));
        assert!(is_rendered(&doc, &between_blocks));
    }

    #[test]
    fn test_lone_br_is_rendered() {
        let (doc, kids) = host_children("<p><br></p><p><br>x</p>");
        let lone = doc.children(&kids[0])[0];
        let leading = doc.children(&kids[1])[0];
        assert!(is_rendered(&doc, &lone));
        assert!(is_rendered(&doc, &kids[0]));
        assert!(is_rendered(&doc, &leading));
    }

    #[test]
    fn test_classification_is_stable() {
        let (doc, kids) = host_children("<p> a <b> </b> <br> </p>");
        let all = crate::traversing::descendants_and_self(&doc, &kids[0]);
        for node in &all {
            assert_eq!(is_unrendered(&doc, node), is_unrendered(&doc, node));
        }
    }
}
