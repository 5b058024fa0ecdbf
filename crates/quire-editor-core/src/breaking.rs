//! Line breaks and block splitting.

use crate::boundaries::{self, Boundary};
use crate::config::EditableConfig;
use crate::dom::Dom;
use crate::elements::{is_unrendered, is_unrendered_whitespace};
use crate::mutation::{insert_node_at_boundary, move_nodes, split_at};
use crate::nodes::{is_editing_host, is_element_node, is_inline_node, is_void_type};
use crate::styles::{has_block_style, has_linebreaking_style};
use crate::traversing::{next_while, prev_while, up_while};

/// Whether `br` produces a visible line break where it stands.
///
/// A `br` at the very end of a line that already ends in text is collapsed
/// by browsers; one next to another `br`, between inline content, or alone
/// is significant.
pub fn is_significant_br<D: Dom>(dom: &D, br: &D::Node) -> bool {
    let ignorable = |n: &D::Node| dom.node_name(n) != "BR" && is_unrendered(dom, n);
    let is_br = |n: &D::Node| dom.node_name(n) == "BR";
    let prev = prev_while(dom, dom.prev_sibling(br), ignorable);
    let next = next_while(dom, dom.next_sibling(br), ignorable);
    let (Some(prev), next) = (prev, next) else {
        return true;
    };
    let Some(next) = next else {
        return is_br(&prev);
    };
    if dom
        .parent(br)
        .is_some_and(|parent| is_inline_node(dom, &parent))
    {
        return true;
    }
    let breaks_inline = |n: &D::Node| is_br(n) || !has_linebreaking_style(dom, n);
    (breaks_inline(&prev) && breaks_inline(&next)) || is_br(&prev) || is_br(&next)
}

/// Insert a `br` at `boundary`. When the new `br` would collapse, a second
/// one follows it so the new line shows. Returns the boundary right after
/// the first `br`.
pub fn insert_line_break<D: Dom>(dom: &mut D, boundary: &Boundary<D::Node>) -> Boundary<D::Node> {
    let br = dom.create_element("br");
    let after = insert_node_at_boundary(dom, &br, boundary, true, &mut []);
    if is_significant_br(dom, &br) {
        return after;
    }
    tracing::trace!(target: "quire::breaking", "doubling trailing line break");
    let filler = dom.create_element("br");
    insert_node_at_boundary(dom, &filler, &after, false, &mut [])
}

/// Give an empty block a placeholder `br` so it keeps a line box.
pub fn prop<D: Dom>(dom: &mut D, element: &D::Node) {
    if !is_element_node(dom, element) || !has_block_style(dom, element) {
        return;
    }
    let first = dom.first_child(element);
    if next_while(dom, first, |n| is_unrendered_whitespace(dom, n)).is_none() {
        let br = dom.create_element("br");
        dom.append(element, &br);
    }
}

fn is_breaking_container<D: Dom>(dom: &D, node: &D::Node) -> bool {
    is_element_node(dom, node) && !is_void_type(dom, node) && has_block_style(dom, node)
}

/// Wrap the inline run around `at` (a position directly in the host) in a
/// new `name` element. Returns the position inside the wrapper.
fn wrap_host_line<D: Dom>(
    dom: &mut D,
    host: &D::Node,
    at: &Boundary<D::Node>,
    name: &str,
) -> Boundary<D::Node> {
    let children = dom.children(host);
    let (head, tail) = children.split_at(at.offset.min(children.len()));
    let line_start = head
        .iter()
        .rposition(|n| has_linebreaking_style(dom, n))
        .map_or(0, |index| index + 1);
    let before = head[line_start..].to_vec();
    let after: Vec<_> = tail
        .iter()
        .take_while(|n| !has_linebreaking_style(dom, n))
        .cloned()
        .collect();
    let wrapper = dom.create_element(name);
    let reference = before.first().or(after.first()).or(tail.first()).cloned();
    dom.insert_before(host, &wrapper, reference.as_ref());
    move_nodes(dom, &before, &wrapper, None);
    move_nodes(dom, &after, &wrapper, None);
    Boundary::new(wrapper, before.len())
}

/// Break the line at `boundary` by splitting the block around it in two.
///
/// Inline content directly inside the editing host is first wrapped in the
/// configured default block. Both halves are propped so that an empty one
/// stays visible. Returns the start of the second block.
pub fn insert_break<D: Dom>(
    dom: &mut D,
    config: &EditableConfig,
    boundary: &Boundary<D::Node>,
) -> Boundary<D::Node> {
    let block = up_while(dom, &boundary.container, |n| {
        !is_breaking_container(dom, n) && !is_editing_host(dom, n)
    });
    let at = if is_editing_host(dom, &block) {
        let at = split_at(dom, boundary, &block, &mut []);
        tracing::debug!(
            target: "quire::breaking",
            block = %config.default_block,
            "wrapping host line before breaking"
        );
        wrap_host_line(dom, &block, &at, &config.default_block)
    } else if !is_breaking_container(dom, &block) {
        return insert_line_break(dom, boundary);
    } else {
        split_at(dom, boundary, &block, &mut [])
    };

    let block = at.container.clone();
    let second = dom.clone_node(&block, false);
    let moved: Vec<_> = dom.children(&block).split_off(at.offset);
    move_nodes(dom, &moved, &second, None);
    dom.insert_after(&block, &second);
    prop(dom, &block);
    prop(dom, &second);
    boundaries::from_start_of_node(&second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, NodeId};

    fn first_text(doc: &Document, mut node: NodeId) -> NodeId {
        while let Some(child) = doc.first_child(&node) {
            node = child;
        }
        node
    }

    #[test]
    fn test_br_significance() {
        let (doc, host) = Document::editable("<p>a<br>b</p><p>a<br></p><p><br></p><p>a<br><br></p>")
            .unwrap();
        let kids = doc.children(&host);
        let br = |i: usize, j: usize| doc.children(&kids[i])[j];
        assert!(is_significant_br(&doc, &br(0, 1)));
        assert!(!is_significant_br(&doc, &br(1, 1)));
        assert!(is_significant_br(&doc, &br(2, 0)));
        assert!(is_significant_br(&doc, &br(3, 1)));
    }

    #[test]
    fn test_insert_line_break_inside_text() {
        let (mut doc, host) = Document::editable("<p>ab</p>").unwrap();
        let text = first_text(&doc, host);
        let p = doc.children(&host)[0];
        let after = insert_line_break(&mut doc, &Boundary::new(text, 1));
        assert_eq!(doc.inner_html(&host), "<p>a<br>b</p>");
        assert_eq!(after, Boundary::new(p, 2));
    }

    #[test]
    fn test_insert_line_break_at_end_doubles() {
        let (mut doc, host) = Document::editable("<p>ab</p>").unwrap();
        let text = first_text(&doc, host);
        let p = doc.children(&host)[0];
        let after = insert_line_break(&mut doc, &Boundary::new(text, 2));
        assert_eq!(doc.inner_html(&host), "<p>ab<br><br></p>");
        assert_eq!(after, Boundary::new(p, 2));
    }

    #[test]
    fn test_prop() {
        let (mut doc, host) = Document::editable("<p></p><p>x</p><span></span>").unwrap();
        for child in doc.children(&host) {
            prop(&mut doc, &child);
        }
        assert_eq!(doc.inner_html(&host), "<p><br></p><p>x</p><span></span>");
    }

    #[test]
    fn test_insert_break_splits_block() {
        let (mut doc, host) = Document::editable("<p>one<b>two</b></p>").unwrap();
        let text = first_text(&doc, host);
        let config = EditableConfig::default();
        let at = insert_break(&mut doc, &config, &Boundary::new(text, 2));
        insta::assert_snapshot!(
            doc.inner_html(&host),
            @"<p>on</p><p>e<b>two</b></p>"
        );
        assert_eq!(at, Boundary::new(doc.children(&host)[1], 0));
    }

    #[test]
    fn test_insert_break_at_end_props_new_block() {
        let (mut doc, host) = Document::editable("<p>one</p>").unwrap();
        let text = first_text(&doc, host);
        insert_break(&mut doc, &EditableConfig::default(), &Boundary::new(text, 3));
        assert_eq!(doc.inner_html(&host), "<p>one</p><p><br></p>");
    }

    #[test]
    fn test_insert_break_wraps_host_content() {
        let (mut doc, host) = Document::editable("onetwo<p>x</p>").unwrap();
        let text = first_text(&doc, host);
        let config: EditableConfig = serde_json::from_str(r#"{"default_block": "p"}"#).unwrap();
        insert_break(&mut doc, &config, &Boundary::new(text, 3));
        assert_eq!(doc.inner_html(&host), "<p>one</p><p>two</p><p>x</p>");
    }
}
