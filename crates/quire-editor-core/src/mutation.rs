//! Boundary-preserving mutation primitives.
//!
//! Every primitive that can move content under a boundary takes a slice of
//! `tracked` boundaries and rewrites them in place so they keep pointing at
//! the same logical position afterwards.

use crate::boundaries::{normalize, Boundary};
use crate::dom::Dom;
use crate::nodes::{contains, is_text_node, node_index, node_length, nth_child};

fn would_split_text_node<D: Dom>(dom: &D, node: &D::Node, offset: usize) -> bool {
    0 < offset && offset < node_length(dom, node)
}

fn adjust_after_split<N: Clone + PartialEq>(
    boundary: &mut Boundary<N>,
    split: &N,
    at: usize,
    after: &N,
    parent: &N,
    index: usize,
) {
    if boundary.container == *split {
        if boundary.offset > at {
            boundary.container = after.clone();
            boundary.offset -= at;
        }
    } else if boundary.container == *parent && boundary.offset > index {
        boundary.offset += 1;
    }
}

/// Split a text node at `offset`. `node` keeps the text before the split and
/// the rest moves into a new sibling right after it. Returns the node before
/// the split; nothing happens when `offset` is at either end.
pub fn split_text_node<D: Dom>(
    dom: &mut D,
    node: &D::Node,
    offset: usize,
    tracked: &mut [Boundary<D::Node>],
) -> D::Node {
    if !would_split_text_node(dom, node, offset) {
        return node.clone();
    }
    let Some(parent) = dom.parent(node) else {
        return node.clone();
    };
    let text = dom.text(node).unwrap_or_default();
    let before: String = text.chars().take(offset).collect();
    let after: String = text.chars().skip(offset).collect();
    let index = node_index(dom, node);
    let tail = dom.create_text(&after);
    dom.set_text(node, &before);
    dom.insert_after(node, &tail);
    for boundary in tracked.iter_mut() {
        adjust_after_split(boundary, node, offset, &tail, &parent, index);
    }
    tracing::trace!(target: "quire::mutation", ?node, offset, "split text node");
    node.clone()
}

/// Split the text container of `boundary` if it lies strictly inside text.
/// Returns the boundary at the end of the text before the split.
pub fn split_boundary<D: Dom>(
    dom: &mut D,
    boundary: &Boundary<D::Node>,
    tracked: &mut [Boundary<D::Node>],
) -> Boundary<D::Node> {
    let container = &boundary.container;
    if !is_text_node(dom, container) || !would_split_text_node(dom, container, boundary.offset) {
        return boundary.clone();
    }
    let before = split_text_node(dom, container, boundary.offset, tracked);
    Boundary::new(before, boundary.offset)
}

/// Split every element from the boundary's container up to (not including)
/// `limit`, so that the returned boundary sits directly in `limit` between
/// the content before and after the original position.
///
/// Elements are only cloned when content lies on both sides of the split
/// point, so no empty halves are produced.
pub fn split_at<D: Dom>(
    dom: &mut D,
    boundary: &Boundary<D::Node>,
    limit: &D::Node,
    tracked: &mut [Boundary<D::Node>],
) -> Boundary<D::Node> {
    let split = split_boundary(dom, boundary, tracked);
    let mut pos = normalize(dom, &split);
    while pos.container != *limit {
        let container = pos.container.clone();
        let Some(parent) = dom.parent(&container) else {
            break;
        };
        let index = node_index(dom, &container);
        let len = node_length(dom, &container);
        if pos.offset == 0 {
            pos = Boundary::new(parent, index);
            continue;
        }
        if pos.offset >= len {
            pos = Boundary::new(parent, index + 1);
            continue;
        }
        let right = dom.clone_node(&container, false);
        let moved: Vec<_> = dom.children(&container).split_off(pos.offset);
        for child in &moved {
            dom.append(&right, child);
        }
        dom.insert_after(&container, &right);
        for boundary in tracked.iter_mut() {
            if boundary.container == container && boundary.offset > pos.offset {
                boundary.container = right.clone();
                boundary.offset -= pos.offset;
            } else if boundary.container == parent && boundary.offset > index {
                boundary.offset += 1;
            }
        }
        tracing::trace!(
            target: "quire::mutation",
            ?container,
            offset = pos.offset,
            "split element"
        );
        pos = Boundary::new(parent, index + 1);
    }
    pos
}

fn shift_node_boundaries<N: PartialEq>(
    tracked: &mut [Boundary<N>],
    parent: &N,
    index: usize,
    insert_before: bool,
) {
    for boundary in tracked.iter_mut() {
        let moves = if insert_before {
            boundary.offset >= index
        } else {
            boundary.offset > index
        };
        if boundary.container == *parent && moves {
            boundary.offset += 1;
        }
    }
}

/// Insert `node` at `boundary`, splitting text if needed.
///
/// With `insert_before` the returned boundary and any tracked boundary at
/// the insertion point end up behind the new node, otherwise in front of it.
pub fn insert_node_at_boundary<D: Dom>(
    dom: &mut D,
    node: &D::Node,
    boundary: &Boundary<D::Node>,
    insert_before: bool,
    tracked: &mut [Boundary<D::Node>],
) -> Boundary<D::Node> {
    let split = split_boundary(dom, boundary, tracked);
    let at = normalize(dom, &split);
    for boundary in tracked.iter_mut() {
        *boundary = normalize(dom, boundary);
    }
    let reference = nth_child(dom, &at.container, at.offset);
    dom.insert_before(&at.container, node, reference.as_ref());
    shift_node_boundaries(tracked, &at.container, at.offset, insert_before);
    let offset = if insert_before { at.offset + 1 } else { at.offset };
    Boundary::new(at.container, offset)
}

fn insert_into_text<D: Dom>(
    dom: &mut D,
    node: &D::Node,
    offset: usize,
    text: &str,
    insert_before: bool,
    tracked: &mut [Boundary<D::Node>],
) -> Boundary<D::Node> {
    let data = dom.text(node).unwrap_or_default();
    let byte = data
        .char_indices()
        .nth(offset)
        .map_or(data.len(), |(byte, _)| byte);
    let mut updated = data;
    updated.insert_str(byte, text);
    dom.set_text(node, &updated);
    let len = text.chars().count();
    for boundary in tracked.iter_mut() {
        let moves = if insert_before {
            boundary.offset >= offset
        } else {
            boundary.offset > offset
        };
        if boundary.container == *node && moves {
            boundary.offset += len;
        }
    }
    let offset = if insert_before { offset + len } else { offset };
    Boundary::new(node.clone(), offset)
}

/// Insert `text` at `boundary`, reusing an adjacent text node when there is
/// one. Inserting an empty string does nothing.
pub fn insert_text_at_boundary<D: Dom>(
    dom: &mut D,
    text: &str,
    boundary: &Boundary<D::Node>,
    insert_before: bool,
    tracked: &mut [Boundary<D::Node>],
) -> Boundary<D::Node> {
    if text.is_empty() {
        return boundary.clone();
    }
    let container = &boundary.container;
    if is_text_node(dom, container) {
        return insert_into_text(dom, container, boundary.offset, text, insert_before, tracked);
    }
    if let Some(next) = nth_child(dom, container, boundary.offset) {
        if is_text_node(dom, &next) {
            return insert_into_text(dom, &next, 0, text, insert_before, tracked);
        }
    }
    if let Some(prev) = boundary
        .offset
        .checked_sub(1)
        .and_then(|index| nth_child(dom, container, index))
    {
        if is_text_node(dom, &prev) {
            let end = node_length(dom, &prev);
            return insert_into_text(dom, &prev, end, text, insert_before, tracked);
        }
    }
    let node = dom.create_text(text);
    insert_node_at_boundary(dom, &node, boundary, insert_before, tracked)
}

/// Detach `node`, moving any tracked boundary inside it to where it was.
pub fn remove_preserving_boundaries<D: Dom>(
    dom: &mut D,
    node: &D::Node,
    tracked: &mut [Boundary<D::Node>],
) {
    let Some(parent) = dom.parent(node) else {
        return;
    };
    let index = node_index(dom, node);
    for boundary in tracked.iter_mut() {
        if boundary.container == *node || contains(dom, node, &boundary.container) {
            *boundary = Boundary::new(parent.clone(), index);
        } else if boundary.container == parent && boundary.offset > index {
            boundary.offset -= 1;
        }
    }
    dom.remove(node);
}

/// Move `nodes` into `parent` before `reference`, keeping their order.
pub fn move_nodes<D: Dom>(
    dom: &mut D,
    nodes: &[D::Node],
    parent: &D::Node,
    reference: Option<&D::Node>,
) {
    for node in nodes {
        dom.insert_before(parent, node, reference);
    }
}

/// Put `wrapper` where `node` is and move `node` into it.
pub fn wrap<D: Dom>(dom: &mut D, node: &D::Node, wrapper: &D::Node) {
    let Some(parent) = dom.parent(node) else {
        return;
    };
    dom.insert_before(&parent, wrapper, Some(node));
    dom.append(wrapper, node);
}

/// Replace `node` by its children. Returns the children that were moved.
pub fn unwrap<D: Dom>(dom: &mut D, node: &D::Node) -> Vec<D::Node> {
    let Some(parent) = dom.parent(node) else {
        return Vec::new();
    };
    let children = dom.children(node);
    move_nodes(dom, &children, &parent, Some(node));
    dom.remove(node);
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, NodeId};

    fn paragraph(html: &str) -> (Document, NodeId) {
        let (doc, host) = Document::editable(html).unwrap();
        let p = doc.children(&host)[0];
        (doc, p)
    }

    #[test]
    fn test_split_text_node_tracks_boundaries() {
        let (mut doc, p) = paragraph("<p>abcd</p>");
        let text = doc.children(&p)[0];
        let mut tracked = [
            Boundary::new(text, 1),
            Boundary::new(text, 3),
            Boundary::new(p, 1),
        ];
        let before = split_text_node(&mut doc, &text, 2, &mut tracked);
        assert_eq!(before, text);
        let tail = doc.children(&p)[1];
        assert_eq!(doc.inner_html(&p), "abcd");
        assert_eq!(doc.text(&text).as_deref(), Some("ab"));
        assert_eq!(tracked[0], Boundary::new(text, 1));
        assert_eq!(tracked[1], Boundary::new(tail, 1));
        assert_eq!(tracked[2], Boundary::new(p, 2));
    }

    #[test]
    fn test_split_at_clones_ancestors() {
        let (mut doc, p) = paragraph("<p><b>one two</b></p>");
        let b = doc.children(&p)[0];
        let text = doc.children(&b)[0];
        let host = doc.parent(&p).unwrap();
        let at = split_at(&mut doc, &Boundary::new(text, 4), &host, &mut []);
        assert_eq!(at, Boundary::new(host, 1));
        assert_eq!(
            doc.inner_html(&host),
            "<p><b>one </b></p><p><b>two</b></p>"
        );
    }

    #[test]
    fn test_split_at_edge_does_not_clone() {
        let (mut doc, p) = paragraph("<p><b>one</b>two</p>");
        let host = doc.parent(&p).unwrap();
        let at = split_at(&mut doc, &Boundary::new(p, 0), &host, &mut []);
        assert_eq!(at, Boundary::new(host, 0));
        assert_eq!(doc.inner_html(&host), "<p><b>one</b>two</p>");
    }

    #[test]
    fn test_insert_node_at_text_boundary() {
        let (mut doc, p) = paragraph("<p>ab</p>");
        let text = doc.children(&p)[0];
        let br = doc.create_element("br");
        let mut tracked = [Boundary::new(p, 1)];
        let after = insert_node_at_boundary(&mut doc, &br, &Boundary::new(text, 1), true, &mut tracked);
        assert_eq!(doc.inner_html(&p), "a<br>b");
        assert_eq!(after, Boundary::new(p, 2));
        assert_eq!(tracked[0], Boundary::new(p, 3));
    }

    #[test]
    fn test_insert_text_reuses_neighbours() {
        let (mut doc, p) = paragraph("<p>ab<b>c</b></p>");
        let text = doc.children(&p)[0];
        let end = insert_text_at_boundary(&mut doc, "é!", &Boundary::new(p, 1), true, &mut []);
        assert_eq!(end, Boundary::new(text, 4));
        assert_eq!(doc.inner_html(&p), "abé!<b>c</b>");

        let (mut doc, p) = paragraph("<p><b>c</b></p>");
        let end = insert_text_at_boundary(&mut doc, "x", &Boundary::new(p, 0), true, &mut []);
        assert_eq!(end, Boundary::new(p, 1));
        assert_eq!(doc.inner_html(&p), "x<b>c</b>");
    }

    #[test]
    fn test_remove_preserving_boundaries() {
        let (mut doc, p) = paragraph("<p>a<b>bc</b>d</p>");
        let b = doc.children(&p)[1];
        let inner = doc.children(&b)[0];
        let mut tracked = [Boundary::new(inner, 1), Boundary::new(p, 3)];
        remove_preserving_boundaries(&mut doc, &b, &mut tracked);
        assert_eq!(doc.inner_html(&p), "ad");
        assert_eq!(tracked, [Boundary::new(p, 1), Boundary::new(p, 2)]);
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let (mut doc, p) = paragraph("<p>a<b>b</b></p>");
        let text = doc.children(&p)[0];
        let i = doc.create_element("i");
        wrap(&mut doc, &text, &i);
        assert_eq!(doc.inner_html(&p), "<i>a</i><b>b</b>");
        let b = doc.children(&p)[1];
        let moved = unwrap(&mut doc, &b);
        assert_eq!(moved.len(), 1);
        assert_eq!(doc.inner_html(&p), "<i>a</i>b");
    }
}
