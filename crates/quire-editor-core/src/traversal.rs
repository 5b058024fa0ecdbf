//! Visual traversal.
//!
//! Steps a boundary to the next position a user would perceive as distinct:
//! the next visible character, or the next raw boundary while skipping
//! positions that collapse into their neighbours. Stepping never leaves the
//! editing host.

use crate::boundaries::{
    self, is_at_end as is_raw_at_end, is_node_boundary, is_text_boundary, Boundary,
};
use crate::dom::Dom;
use crate::elements::{is_rendered, is_unrendered};
use crate::nodes::{is_editing_host, is_inline_node, is_text_node, is_void_type, node_length};
use crate::strings::{is_collapsible_space, is_zero_width};
use crate::styles::has_linebreaking_style;
use crate::traversing::{next_non_ancestor, next_while, prev_while};

/// Granularity of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// One visible character inside text.
    Char,
    /// One raw boundary, jumping over void-type nodes whole.
    Boundary,
    /// The next visually distinct position.
    Visual,
}

fn is_space_like(c: char) -> bool {
    is_collapsible_space(c) || is_zero_width(c)
}

fn chars_of<D: Dom>(dom: &D, node: &D::Node) -> Vec<char> {
    dom.text(node).unwrap_or_default().chars().collect()
}

fn has_inline_rendered_neighbour<D: Dom>(dom: &D, node: &D::Node, backwards: bool) -> bool {
    next_non_ancestor(
        dom,
        node,
        backwards,
        |n| is_inline_node(dom, n) && is_rendered(dom, n),
        |n| has_linebreaking_style(dom, n) || is_editing_host(dom, n),
    )
    .is_some()
}

/// Whether whitespace right after a text boundary would render.
///
/// It does not when whitespace precedes it in the same text, and otherwise
/// only when rendered inline content follows (or, at offset zero, precedes)
/// on the same line.
fn are_next_white_spaces_significant<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> bool {
    let node = &boundary.container;
    let chars = chars_of(dom, node);
    let offset = boundary.offset.min(chars.len());
    let before = &chars[..offset];
    let trailing_space = before
        .iter()
        .rev()
        .skip_while(|c| is_zero_width(**c))
        .next()
        .is_some_and(|c| is_collapsible_space(*c));
    if trailing_space {
        return false;
    }
    if offset == 0 {
        return has_inline_rendered_neighbour(dom, node, true);
    }
    if chars[offset..].iter().any(|c| !is_space_like(*c)) {
        return true;
    }
    has_inline_rendered_neighbour(dom, node, false)
}

/// Offset of the next visible character at or after a text boundary.
pub fn next_significant_offset<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<usize> {
    let chars = chars_of(dom, &boundary.container);
    let offset = boundary.offset.min(chars.len());
    let significant = are_next_white_spaces_significant(dom, boundary);
    chars[offset..]
        .iter()
        .position(|c| {
            if significant {
                !is_zero_width(*c)
            } else {
                !is_space_like(*c)
            }
        })
        .map(|index| offset + index)
}

/// Offset just past the last visible character before a text boundary.
pub fn prev_significant_offset<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<usize> {
    let node = &boundary.container;
    let chars = chars_of(dom, node);
    let offset = boundary.offset.min(chars.len());
    if offset == 0 {
        return None;
    }
    let text = &chars[..offset];
    if text.iter().all(|c| is_space_like(*c)) {
        let start = Boundary::new(node.clone(), 0);
        return are_next_white_spaces_significant(dom, &start).then_some(1);
    }
    // A run of collapsible spaces renders as a single one.
    let spaces = text.iter().rev().take_while(|c| is_space_like(**c)).count();
    let offset = if spaces < 2 {
        offset
    } else {
        offset - spaces + 1
    };
    let raw = Boundary::new(node.clone(), offset - 1);
    let at_space = is_space_like(text[offset - 1]);
    if !at_space || are_next_white_spaces_significant(dom, &raw) {
        Some(offset)
    } else {
        prev_significant_offset(dom, &raw)
    }
}

fn next_character_boundary<D: Dom>(
    dom: &D,
    boundary: &Boundary<D::Node>,
) -> Option<Boundary<D::Node>> {
    if is_node_boundary(dom, boundary) {
        return None;
    }
    let offset = next_significant_offset(dom, boundary)?;
    Some(Boundary::new(boundary.container.clone(), offset + 1))
}

fn prev_character_boundary<D: Dom>(
    dom: &D,
    boundary: &Boundary<D::Node>,
) -> Option<Boundary<D::Node>> {
    if is_node_boundary(dom, boundary) {
        return None;
    }
    let offset = prev_significant_offset(dom, boundary)?;
    Some(Boundary::new(boundary.container.clone(), offset.checked_sub(1)?))
}

/// One raw step forward, jumping over void-type nodes.
pub fn step_forward<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<Boundary<D::Node>> {
    if is_node_boundary(dom, boundary) {
        if let Some(node) = boundaries::node_after(dom, boundary) {
            if is_void_type(dom, &node) {
                return Some(boundaries::from_behind_of_node(dom, &node));
            }
        }
    }
    boundaries::next(dom, boundary)
}

/// One raw step backward, jumping over void-type nodes.
pub fn step_backward<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<Boundary<D::Node>> {
    if is_node_boundary(dom, boundary) {
        if let Some(node) = boundaries::node_before(dom, boundary) {
            if is_void_type(dom, &node) {
                return Some(boundaries::from_front_of_node(dom, &node));
            }
        }
    }
    boundaries::prev(dom, boundary)
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn character<D: Dom>(self, dom: &D, b: &Boundary<D::Node>) -> Option<Boundary<D::Node>> {
        match self {
            Self::Forward => next_character_boundary(dom, b),
            Self::Backward => prev_character_boundary(dom, b),
        }
    }

    fn step<D: Dom>(self, dom: &D, b: &Boundary<D::Node>) -> Option<Boundary<D::Node>> {
        match self {
            Self::Forward => step_forward(dom, b),
            Self::Backward => step_backward(dom, b),
        }
    }

    fn node_at<D: Dom>(self, dom: &D, b: &Boundary<D::Node>) -> D::Node {
        match self {
            Self::Forward => boundaries::next_node(dom, b),
            Self::Backward => boundaries::prev_node(dom, b),
        }
    }

    fn adjacent<D: Dom>(self, dom: &D, b: &Boundary<D::Node>) -> Option<D::Node> {
        match self {
            Self::Forward => boundaries::node_after(dom, b),
            Self::Backward => boundaries::node_before(dom, b),
        }
    }

    fn enter<D: Dom>(self, dom: &D, node: &D::Node) -> Boundary<D::Node> {
        match self {
            Self::Forward => Boundary::new(node.clone(), 0),
            Self::Backward => Boundary::new(node.clone(), node_length(dom, node)),
        }
    }
}

fn can_pass_through<D: Dom>(dom: &D, node: &D::Node) -> bool {
    !(is_text_node(dom, node) || is_void_type(dom, node)) || is_unrendered(dom, node)
}

/// Skip over positions that hold nothing visible. Reports whether a
/// rendered line break was crossed on the way.
fn next_visible_position<D: Dom>(
    dom: &D,
    boundary: Boundary<D::Node>,
    direction: Direction,
) -> (Boundary<D::Node>, bool) {
    let mut boundary = boundary;
    let mut crossed_visual_break = false;
    loop {
        let node = direction.node_at(dom, &boundary);
        crossed_visual_break = crossed_visual_break
            || (has_linebreaking_style(dom, &node) && is_rendered(dom, &node));
        if !can_pass_through(dom, &node) || is_editing_host(dom, &node) {
            break;
        }
        let Some(mut step) = direction.step(dom, &boundary) else {
            break;
        };
        while is_unrendered(dom, &step.container) {
            match direction.step(dom, &step) {
                Some(further) => step = further,
                None => break,
            }
        }
        boundary = step;
    }
    (boundary, crossed_visual_break)
}

fn step_visual_boundary<D: Dom>(
    dom: &D,
    boundary: &Boundary<D::Node>,
    direction: Direction,
) -> Option<Boundary<D::Node>> {
    if is_text_boundary(dom, boundary) {
        if let Some(next) = direction.character(dom, boundary) {
            return Some(next);
        }
        let stepped = direction.step(dom, boundary)?;
        return step_visual_boundary(dom, &stepped, direction);
    }
    let (next, crossed_visual_break) = next_visible_position(dom, boundary.clone(), direction);
    let Some(node) = direction.adjacent(dom, &next) else {
        return Some(next);
    };
    if is_void_type(dom, &node) {
        let mut pos = direction.step(dom, &next)?;
        loop {
            let at = direction.node_at(dom, &pos);
            if !can_pass_through(dom, &at) || is_editing_host(dom, &at) {
                break;
            }
            match direction.step(dom, &pos) {
                Some(step) => pos = step,
                None => break,
            }
        }
        return Some(pos);
    }
    if crossed_visual_break {
        return Some(next);
    }
    step_visual_boundary(dom, &direction.enter(dom, &node), direction)
}

/// Move forward over positions that render nothing.
pub fn skip_insignificant_positions<D: Dom>(
    dom: &D,
    boundary: &Boundary<D::Node>,
) -> Boundary<D::Node> {
    let mut next = boundary.clone();
    loop {
        if is_text_boundary(dom, &next) {
            match next_significant_offset(dom, &next) {
                Some(offset) => return Boundary::new(next.container, offset),
                None => match boundaries::next(dom, &next) {
                    Some(step) => next = step,
                    None => return next,
                },
            }
            continue;
        }
        let node = boundaries::next_node(dom, &next);
        if is_text_node(dom, &node) && node != next.container {
            next = Boundary::new(node, 0);
            continue;
        }
        let mut node = node;
        while !is_editing_host(dom, &node) && is_unrendered(dom, &node) {
            match boundaries::next(dom, &next) {
                Some(step) => next = step,
                None => return next,
            }
            node = boundaries::next_node(dom, &next);
            if is_text_node(dom, &node) {
                break;
            }
        }
        if is_text_node(dom, &node) && node != next.container && is_rendered(dom, &node) {
            next = Boundary::new(node, 0);
            continue;
        }
        return next;
    }
}

/// Move backward over positions that render nothing.
pub fn skip_prev_insignificant_positions<D: Dom>(
    dom: &D,
    boundary: &Boundary<D::Node>,
) -> Boundary<D::Node> {
    let mut prev = boundary.clone();
    loop {
        if is_text_boundary(dom, &prev) {
            match prev_significant_offset(dom, &prev) {
                Some(offset) => return Boundary::new(prev.container, offset),
                None => match boundaries::prev(dom, &prev) {
                    Some(step) => prev = step,
                    None => return prev,
                },
            }
            continue;
        }
        let node = boundaries::prev_node(dom, &prev);
        if is_text_node(dom, &node) && node != prev.container {
            let len = node_length(dom, &node);
            prev = Boundary::new(node, len);
            continue;
        }
        let mut node = node;
        while !is_editing_host(dom, &node) && is_unrendered(dom, &node) {
            match boundaries::prev(dom, &prev) {
                Some(step) => prev = step,
                None => return prev,
            }
            node = boundaries::prev_node(dom, &prev);
            if is_text_node(dom, &node) {
                break;
            }
        }
        if is_text_node(dom, &node) && node != prev.container && is_rendered(dom, &node) {
            let len = node_length(dom, &node);
            prev = Boundary::new(node, len);
            continue;
        }
        return prev;
    }
}

fn at_host_start<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> bool {
    boundary.offset == 0 && is_editing_host(dom, &boundary.container)
}

fn at_host_end<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> bool {
    is_editing_host(dom, &boundary.container) && is_raw_at_end(dom, boundary)
}

/// Step `boundary` forward by `unit`. `None` at the end of the editing host
/// or when no further position of that unit exists.
pub fn next<D: Dom>(
    dom: &D,
    boundary: &Boundary<D::Node>,
    unit: Unit,
) -> Option<Boundary<D::Node>> {
    if at_host_end(dom, boundary) {
        return None;
    }
    let boundary = skip_insignificant_positions(dom, boundary);
    let next = match unit {
        Unit::Char => next_character_boundary(dom, &boundary),
        Unit::Boundary => step_forward(dom, &boundary),
        Unit::Visual => step_visual_boundary(dom, &boundary, Direction::Forward),
    }?;
    (next != boundary).then_some(next)
}

/// Step `boundary` backward by `unit`. `None` at the start of the editing
/// host or when no further position of that unit exists.
pub fn prev<D: Dom>(
    dom: &D,
    boundary: &Boundary<D::Node>,
    unit: Unit,
) -> Option<Boundary<D::Node>> {
    if at_host_start(dom, boundary) {
        return None;
    }
    let boundary = skip_prev_insignificant_positions(dom, boundary);
    let prev = match unit {
        Unit::Char => prev_character_boundary(dom, &boundary),
        Unit::Boundary => step_backward(dom, &boundary),
        Unit::Visual => step_visual_boundary(dom, &boundary, Direction::Backward),
    }?;
    (prev != boundary).then_some(prev)
}

/// Whether nothing visible follows `boundary` before the end of its line.
pub fn is_at_end<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> bool {
    if is_raw_at_end(dom, boundary) {
        return true;
    }
    if is_text_boundary(dom, boundary) {
        let chars = chars_of(dom, &boundary.container);
        return chars[boundary.offset.min(chars.len())..]
            .iter()
            .all(|c| is_space_like(*c));
    }
    let after = boundaries::node_after(dom, boundary);
    match next_while(dom, after, |n| is_unrendered(dom, n)) {
        None => true,
        Some(next) => has_linebreaking_style(dom, &next),
    }
}

/// Whether nothing visible precedes `boundary` since the start of its line.
pub fn is_at_start<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> bool {
    if boundary.offset == 0 {
        return true;
    }
    if is_text_boundary(dom, boundary) {
        let chars = chars_of(dom, &boundary.container);
        return chars[..boundary.offset.min(chars.len())]
            .iter()
            .all(|c| is_space_like(*c));
    }
    let before = boundaries::node_before(dom, boundary);
    match prev_while(dom, before, |n| is_unrendered(dom, n)) {
        None => true,
        Some(prev) => has_linebreaking_style(dom, &prev),
    }
}

/// The visible node after `boundary`, or its container at the end.
pub fn next_node<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<D::Node> {
    let node = boundaries::next_node(dom, boundary);
    if is_at_end(dom, boundary) {
        dom.parent(&node).or(Some(node))
    } else {
        Some(node)
    }
}

/// The visible node before `boundary`, or its container at the start.
pub fn prev_node<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Option<D::Node> {
    let node = boundaries::prev_node(dom, boundary);
    if is_at_start(dom, boundary) {
        dom.parent(&node).or(Some(node))
    } else {
        Some(node)
    }
}
