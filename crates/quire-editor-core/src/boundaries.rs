//! Boundary positions between nodes and inside text.
//!
//! A [`Boundary`] is a `(container, offset)` pair. For element containers
//! the offset counts children; for text containers it counts chars. The
//! functions here are raw: they know nothing about rendering. Visual
//! stepping lives in [`crate::traversal`].

use std::cmp::Ordering;

use crate::dom::Dom;
use crate::nodes::{
    compare_document_order, contains, is_text_node, is_void_node, is_void_type, node_index,
    node_length, nth_child,
};

/// A position in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary<N> {
    pub container: N,
    pub offset: usize,
}

impl<N> Boundary<N> {
    /// A boundary at `offset` in `container`, taken as given.
    pub fn new(container: N, offset: usize) -> Self {
        Self { container, offset }
    }

    pub fn container(&self) -> &N {
        &self.container
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_at_start(&self) -> bool {
        self.offset == 0
    }
}

/// An ordered pair of boundaries. Collapsed when both are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range<N> {
    pub start: Boundary<N>,
    pub end: Boundary<N>,
}

/// The boundary pair reported for a selection.
pub type BoundaryPair<N> = Range<N>;

impl<N: Clone + PartialEq> Range<N> {
    /// A collapsed range at `boundary`.
    pub fn collapsed(boundary: Boundary<N>) -> Self {
        Self {
            start: boundary.clone(),
            end: boundary,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

impl<N: Clone + PartialEq> Range<N> {
    /// A range spanning `a` and `b` in document order, whichever comes first.
    pub fn new<D: Dom<Node = N>>(dom: &D, a: Boundary<N>, b: Boundary<N>) -> Self {
        if compare(dom, &a, &b) == Ordering::Greater {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }
}

/// A boundary at `offset` in `container`, clamped to the container's length.
pub fn create<D: Dom>(dom: &D, container: &D::Node, offset: usize) -> Boundary<D::Node> {
    let len = node_length(dom, container);
    if offset > len {
        tracing::warn!(
            target: "quire::boundaries",
            ?container,
            offset,
            len,
            "clamping out-of-range boundary offset"
        );
    }
    Boundary::new(container.clone(), offset.min(len))
}

/// Whether both boundaries name the same container and offset.
pub fn equals<N: PartialEq>(a: &Boundary<N>, b: &Boundary<N>) -> bool {
    a.container == b.container && a.offset == b.offset
}

/// The boundary right in front of `node`.
pub fn from_front_of_node<D: Dom>(dom: &D, node: &D::Node) -> Boundary<D::Node> {
    match dom.parent(node) {
        Some(parent) => Boundary::new(parent, node_index(dom, node)),
        None => Boundary::new(node.clone(), 0),
    }
}

/// The boundary right behind `node`.
pub fn from_behind_of_node<D: Dom>(dom: &D, node: &D::Node) -> Boundary<D::Node> {
    match dom.parent(node) {
        Some(parent) => Boundary::new(parent, node_index(dom, node) + 1),
        None => Boundary::new(node.clone(), node_length(dom, node)),
    }
}

/// The first position inside `node`.
pub fn from_start_of_node<N: Clone>(node: &N) -> Boundary<N> {
    Boundary::new(node.clone(), 0)
}

/// The last position inside `node`.
pub fn from_end_of_node<D: Dom>(dom: &D, node: &D::Node) -> Boundary<D::Node> {
    Boundary::new(node.clone(), node_length(dom, node))
}

pub fn is_text_boundary<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> bool {
    is_text_node(dom, &boundary.container)
}

pub fn is_node_boundary<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> bool {
    !is_text_boundary(dom, boundary)
}

pub fn is_at_start<N>(boundary: &Boundary<N>) -> bool {
    boundary.offset == 0
}

pub fn is_at_end<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> bool {
    boundary.offset == node_length(dom, &boundary.container)
}

/// Canonical form of a boundary.
///
/// A boundary inside a void-type element moves in front of the outermost
/// such element when it is at offset zero, behind it otherwise. A boundary
/// at either end of a text node becomes the node boundary beside it.
/// Boundaries strictly inside text are kept.
pub fn normalize<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Boundary<D::Node> {
    let mut opaque = None;
    let mut current = Some(boundary.container.clone());
    while let Some(node) = current {
        if is_void_type(dom, &node) {
            opaque = Some(node.clone());
        }
        current = dom.parent(&node);
    }
    if let Some(element) = opaque {
        return if boundary.offset == 0 && boundary.container == element {
            from_front_of_node(dom, &element)
        } else {
            from_behind_of_node(dom, &element)
        };
    }

    if !is_text_boundary(dom, boundary) {
        return boundary.clone();
    }
    let Some(parent) = dom.parent(&boundary.container) else {
        return boundary.clone();
    };
    let index = node_index(dom, &boundary.container);
    if boundary.offset == 0 {
        Boundary::new(parent, index)
    } else if boundary.offset >= node_length(dom, &boundary.container) {
        Boundary::new(parent, index + 1)
    } else {
        boundary.clone()
    }
}

/// Step one raw position forward.
///
/// Out of a text node, over a void or text child, or into any other child.
/// At the end of a container the step leaves it. `None` once the root is
/// left behind.
pub fn next<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<Boundary<D::Node>> {
    let container = &boundary.container;
    if is_text_node(dom, container) || boundary.offset >= node_length(dom, container) {
        let parent = dom.parent(container)?;
        return Some(Boundary::new(parent, node_index(dom, container) + 1));
    }
    let child = nth_child(dom, container, boundary.offset)?;
    if is_text_node(dom, &child) || is_void_node(dom, &child) {
        Some(Boundary::new(container.clone(), boundary.offset + 1))
    } else {
        Some(Boundary::new(child, 0))
    }
}

/// Step one raw position backward. Mirror of [`next`].
pub fn prev<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<Boundary<D::Node>> {
    let container = &boundary.container;
    if is_text_node(dom, container) || boundary.offset == 0 {
        let parent = dom.parent(container)?;
        return Some(Boundary::new(parent, node_index(dom, container)));
    }
    let child = nth_child(dom, container, boundary.offset - 1)?;
    if is_text_node(dom, &child) || is_void_node(dom, &child) {
        Some(Boundary::new(container.clone(), boundary.offset - 1))
    } else {
        let len = node_length(dom, &child);
        Some(Boundary::new(child, len))
    }
}

/// Step forward while `cond` holds. Returns the last boundary reached.
pub fn next_while<D, F>(dom: &D, boundary: &Boundary<D::Node>, mut cond: F) -> Boundary<D::Node>
where
    D: Dom,
    F: FnMut(&Boundary<D::Node>) -> bool,
{
    let mut pos = boundary.clone();
    while cond(&pos) {
        match next(dom, &pos) {
            Some(step) => pos = step,
            None => break,
        }
    }
    pos
}

/// Step backward while `cond` holds. Returns the last boundary reached.
pub fn prev_while<D, F>(dom: &D, boundary: &Boundary<D::Node>, mut cond: F) -> Boundary<D::Node>
where
    D: Dom,
    F: FnMut(&Boundary<D::Node>) -> bool,
{
    let mut pos = boundary.clone();
    while cond(&pos) {
        match prev(dom, &pos) {
            Some(step) => pos = step,
            None => break,
        }
    }
    pos
}

/// The node directly after a normalized boundary, if any.
pub fn node_after<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<D::Node> {
    let boundary = normalize(dom, boundary);
    if is_text_boundary(dom, &boundary) || is_at_end(dom, &boundary) {
        return None;
    }
    nth_child(dom, &boundary.container, boundary.offset)
}

/// The node directly before a normalized boundary, if any.
pub fn node_before<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<D::Node> {
    let boundary = normalize(dom, boundary);
    if is_text_boundary(dom, &boundary) || is_at_start(&boundary) {
        return None;
    }
    nth_child(dom, &boundary.container, boundary.offset - 1)
}

/// The node after the boundary, or its container when there is none.
pub fn next_node<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> D::Node {
    node_after(dom, boundary).unwrap_or_else(|| normalize(dom, boundary).container)
}

/// The node before the boundary, or its container when there is none.
pub fn prev_node<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> D::Node {
    node_before(dom, boundary).unwrap_or_else(|| normalize(dom, boundary).container)
}

/// The boundary behind the node after `boundary`.
pub fn jump_over<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<Boundary<D::Node>> {
    node_after(dom, boundary).map(|node| from_behind_of_node(dom, &node))
}

/// Deepest node containing both boundaries.
pub fn common_container<D: Dom>(
    dom: &D,
    a: &Boundary<D::Node>,
    b: &Boundary<D::Node>,
) -> D::Node {
    let mut ancestor = a.container.clone();
    loop {
        if ancestor == b.container || contains(dom, &ancestor, &b.container) {
            return ancestor;
        }
        match dom.parent(&ancestor) {
            Some(parent) => ancestor = parent,
            None => return ancestor,
        }
    }
}

/// Document order of two boundaries.
pub fn compare<D: Dom>(dom: &D, a: &Boundary<D::Node>, b: &Boundary<D::Node>) -> Ordering {
    if a.container == b.container {
        return a.offset.cmp(&b.offset);
    }
    match compare_document_order(dom, &a.container, &b.container) {
        Ordering::Greater => return compare(dom, b, a).reverse(),
        // Distinct containers only compare equal across disconnected trees.
        Ordering::Equal => {
            tracing::debug!(target: "quire::boundaries", "boundaries in disconnected trees");
            return Ordering::Equal;
        }
        Ordering::Less => {}
    }
    // `a.container` precedes `b.container`; it may be an ancestor of it.
    if contains(dom, &a.container, &b.container) {
        let mut child = b.container.clone();
        while let Some(parent) = dom.parent(&child) {
            if parent == a.container {
                break;
            }
            child = parent;
        }
        if node_index(dom, &child) < a.offset {
            return Ordering::Greater;
        }
    }
    Ordering::Less
}

/// Whether `a` comes strictly before `b`.
pub fn precedes<D: Dom>(dom: &D, a: &Boundary<D::Node>, b: &Boundary<D::Node>) -> bool {
    compare(dom, a, b) == Ordering::Less
}
