//! Node cursors.
//!
//! A [`Cursor`] sits either in front of `node` or, when `at_end` is set, at
//! the end of `node`'s content (just before its closing tag). Stepping walks
//! the tree in document order, visiting every opening and closing position.

use crate::dom::Dom;
use crate::nodes::{is_element_node, node_at_offset, node_length};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<N> {
    pub node: N,
    pub at_end: bool,
}

impl<N: Clone + PartialEq> Cursor<N> {
    pub fn new(node: N, at_end: bool) -> Self {
        Self { node, at_end }
    }

    /// Cursor equivalent to the boundary `(container, offset)`.
    pub fn from_boundary<D: Dom<Node = N>>(dom: &D, container: &N, offset: usize) -> Self {
        Self {
            node: node_at_offset(dom, container, offset),
            at_end: offset == node_length(dom, container),
        }
    }

    /// Step forward. Returns `false`, leaving the cursor unchanged, once
    /// there is nowhere left to go.
    pub fn next<D: Dom<Node = N>>(&mut self, dom: &D) -> bool {
        if self.at_end || !is_element_node(dom, &self.node) {
            if let Some(next) = dom.next_sibling(&self.node) {
                self.node = next;
                self.at_end = false;
            } else {
                let Some(parent) = dom.parent(&self.node) else {
                    return false;
                };
                self.node = parent;
                self.at_end = true;
            }
        } else if let Some(child) = dom.first_child(&self.node) {
            self.node = child;
        } else {
            self.at_end = true;
        }
        true
    }

    /// Step backward. Mirror of [`Cursor::next`].
    pub fn prev<D: Dom<Node = N>>(&mut self, dom: &D) -> bool {
        if self.at_end {
            if let Some(last) = dom.last_child(&self.node) {
                if !is_element_node(dom, &last) {
                    self.at_end = false;
                }
                self.node = last;
            } else {
                self.at_end = false;
            }
        } else if let Some(prev) = dom.prev_sibling(&self.node) {
            if is_element_node(dom, &prev) {
                self.at_end = true;
            }
            self.node = prev;
        } else {
            let Some(parent) = dom.parent(&self.node) else {
                return false;
            };
            self.node = parent;
        }
        true
    }

    /// Step backward over the whole previous sibling instead of into it.
    pub fn skip_prev<D: Dom<Node = N>>(&mut self, dom: &D) -> bool {
        if let Some(prev) = self.prev_sibling(dom) {
            self.node = prev;
            self.at_end = false;
            return true;
        }
        self.prev(dom)
    }

    /// Step forward past the end of the current node.
    pub fn skip_next<D: Dom<Node = N>>(&mut self, dom: &D) -> bool {
        self.at_end = true;
        self.next(dom)
    }

    /// Step forward while `cond` holds. Returns `false` if the walk ran out.
    pub fn next_while<D, F>(&mut self, dom: &D, mut cond: F) -> bool
    where
        D: Dom<Node = N>,
        F: FnMut(&D, &Self) -> bool,
    {
        while cond(dom, self) {
            if !self.next(dom) {
                return false;
            }
        }
        true
    }

    /// Step backward while `cond` holds. Returns `false` if the walk ran out.
    pub fn prev_while<D, F>(&mut self, dom: &D, mut cond: F) -> bool
    where
        D: Dom<Node = N>,
        F: FnMut(&D, &Self) -> bool,
    {
        while cond(dom, self) {
            if !self.prev(dom) {
                return false;
            }
        }
        true
    }

    /// The node whose children the cursor moves among.
    pub fn parent<D: Dom<Node = N>>(&self, dom: &D) -> Option<N> {
        if self.at_end {
            Some(self.node.clone())
        } else {
            dom.parent(&self.node)
        }
    }

    pub fn prev_sibling<D: Dom<Node = N>>(&self, dom: &D) -> Option<N> {
        if self.at_end {
            dom.last_child(&self.node)
        } else {
            dom.prev_sibling(&self.node)
        }
    }

    pub fn next_sibling<D: Dom<Node = N>>(&self, dom: &D) -> Option<N> {
        if self.at_end {
            None
        } else {
            dom.next_sibling(&self.node)
        }
    }
}
