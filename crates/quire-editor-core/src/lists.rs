//! List formatting.
//!
//! [`format`] gathers the lines a range touches into a new list, one item per
//! line, and cleans up the containers it emptied. [`unformat`] turns list
//! items back into paragraphs, splitting the list around them.

use smol_str::SmolStr;

use crate::boundaries::{self, Boundary, Range};
use crate::config::EditableConfig;
use crate::content::allows_nesting;
use crate::dom::{Dom, NodeType};
use crate::elements::{is_rendered, is_unrendered};
use crate::error::ListError;
use crate::mutation::{move_nodes, split_at, split_text_node, unwrap};
use crate::nodes::{
    contains, is_editing_host, is_group_container, is_heading, is_list_container, is_list_item,
    is_text_node, is_void_node, is_void_type, node_length, LIST_CONTAINERS,
};
use crate::strings::has_visible_char;
use crate::styles::{has_block_style, has_linebreaking_style};
use crate::traversing::{
    climb_until, descendants_and_self, next_siblings, node_and_next_siblings, prev_siblings,
    up_while,
};

/// Where a boundary sits relative to nodes that survive restructuring.
///
/// Moving nodes around invalidates element offsets but never node
/// identity, so node boundaries are remembered by their neighbours.
enum Anchor<N> {
    Fixed(Boundary<N>),
    Before(N),
    After(N),
}

fn anchor<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Anchor<D::Node> {
    if is_text_node(dom, &boundary.container) {
        return Anchor::Fixed(boundary.clone());
    }
    if let Some(node) = boundaries::node_after(dom, boundary) {
        return Anchor::Before(node);
    }
    match boundaries::node_before(dom, boundary) {
        Some(node) => Anchor::After(node),
        None => Anchor::Fixed(boundary.clone()),
    }
}

/// Whether `node` still hangs off an editing host or a document.
fn is_attached<D: Dom>(dom: &D, node: &D::Node) -> bool {
    let mut current = node.clone();
    loop {
        if is_editing_host(dom, &current) {
            return true;
        }
        match dom.parent(&current) {
            Some(parent) => current = parent,
            None => return dom.node_type(&current) == NodeType::Document,
        }
    }
}

/// Turn an anchor back into a boundary, using `fallback` when the anchor
/// was left in a removed subtree.
fn resolve<D: Dom>(
    dom: &D,
    anchor: Anchor<D::Node>,
    fallback: &Boundary<D::Node>,
) -> Boundary<D::Node> {
    let boundary = match anchor {
        Anchor::Before(node) => boundaries::from_front_of_node(dom, &node),
        Anchor::After(node) => boundaries::from_behind_of_node(dom, &node),
        Anchor::Fixed(boundary) => boundary,
    };
    if is_attached(dom, &boundary.container) {
        return boundary;
    }
    tracing::debug!(
        target: "quire::lists",
        container = ?boundary.container,
        "boundary left in a removed node"
    );
    fallback.clone()
}

fn has_host_parent<D: Dom>(dom: &D, node: &D::Node) -> bool {
    dom.parent(node)
        .is_some_and(|parent| is_editing_host(dom, &parent))
}

fn has_inline_style<D: Dom>(dom: &D, node: &D::Node) -> bool {
    !has_linebreaking_style(dom, node) && !has_host_parent(dom, node)
}

fn is_collect_limit<D: Dom>(dom: &D, node: &D::Node) -> bool {
    !is_list_item(dom, node) && has_linebreaking_style(dom, node)
}

/// Whether `node` is inside a list, below the editing host.
fn in_list<D: Dom>(dom: &D, node: &D::Node) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if is_editing_host(dom, &n) {
            return false;
        }
        if is_list_container(dom, &n) || is_list_item(dom, &n) {
            return true;
        }
        current = dom.parent(&n);
    }
    false
}

/// The nearest list item at or above `node`, if any.
fn nearest_item<D: Dom>(dom: &D, node: &D::Node) -> Option<D::Node> {
    let item = up_while(dom, node, |n| {
        !is_list_item(dom, n) && !has_host_parent(dom, n)
    });
    is_list_item(dom, &item).then_some(item)
}

/// `start` through `end` plus the siblings on either side up to the next
/// line-breaking node.
fn collect_siblings<D: Dom>(dom: &D, start: &D::Node, end: &D::Node) -> Vec<D::Node> {
    let mut nodes = prev_siblings(dom, start, |n| is_collect_limit(dom, n));
    nodes.push(start.clone());
    if start != end {
        nodes.extend(next_siblings(dom, start, |n| n == end));
        nodes.push(end.clone());
    }
    nodes.extend(next_siblings(dom, end, |n| is_collect_limit(dom, n)));
    nodes
}

fn is_br<D: Dom>(dom: &D, node: &D::Node) -> bool {
    dom.node_name(node) == "BR"
}

/// Runs of nodes that each become one list item.
struct Grouping<N> {
    groups: Vec<Vec<N>>,
    /// Containers the runs are taken from.
    parents: Vec<N>,
    /// `br`s that only separated runs.
    separators: Vec<N>,
}

impl<N> Grouping<N> {
    fn close(&mut self, run: &mut Vec<N>) {
        if !run.is_empty() {
            self.groups.push(std::mem::take(run));
        }
    }
}

/// Split the children of an unwrapped container into lines.
fn split_lines<D: Dom>(dom: &D, children: Vec<D::Node>, grouping: &mut Grouping<D::Node>) {
    let mut run = Vec::new();
    for child in children {
        if is_br(dom, &child) {
            grouping.close(&mut run);
            grouping.separators.push(child);
        } else if has_linebreaking_style(dom, &child) {
            grouping.close(&mut run);
            grouping.groups.push(vec![child]);
        } else {
            run.push(child);
        }
    }
    grouping.close(&mut run);
}

/// Split `siblings` into one run per visual line.
///
/// A line-breaking node that can be taken apart contributes its lines; any
/// other line-breaking node is a line of its own. Inline siblings form a
/// line up to the next line-breaking node.
fn group_nodes<D: Dom>(
    dom: &D,
    config: &EditableConfig,
    siblings: &[D::Node],
) -> Grouping<D::Node> {
    let mut grouping = Grouping {
        groups: Vec::new(),
        parents: Vec::new(),
        separators: Vec::new(),
    };
    let mut run = Vec::new();
    for node in siblings {
        if is_br(dom, node) {
            grouping.close(&mut run);
            grouping.separators.push(node.clone());
            continue;
        }
        if !has_linebreaking_style(dom, node) {
            if run.is_empty() {
                grouping.parents.extend(dom.parent(node));
            }
            run.push(node.clone());
            continue;
        }
        grouping.close(&mut run);
        let can_unwrap = !is_group_container(dom, node)
            && !is_void_type(dom, node)
            && !is_heading(dom, node)
            && !config.is_opaque(dom, node);
        if can_unwrap {
            grouping.parents.push(node.clone());
            split_lines(dom, dom.children(node), &mut grouping);
        } else {
            grouping.parents.extend(dom.parent(node));
            grouping.groups.push(vec![node.clone()]);
        }
    }
    grouping.close(&mut run);
    grouping
}

/// Remove `node` and its ancestors for as long as they render nothing.
fn remove_invisible_nodes<D: Dom>(dom: &mut D, node: &D::Node) {
    climb_until(
        dom,
        node,
        |dom, n| {
            tracing::trace!(target: "quire::lists", node = ?n, "removing emptied container");
            dom.remove(n);
        },
        |dom, n| {
            if is_list_item(dom, n) && dom.first_child(n).is_none() {
                return false;
            }
            dom.parent(n).is_none() || is_editing_host(dom, n) || is_rendered(dom, n)
        },
    );
}

/// Move the lines of `nodes` into a new list. Returns `None`, leaving the
/// document alone, when none of them renders anything.
fn build<D: Dom>(
    dom: &mut D,
    config: &EditableConfig,
    list_type: &str,
    nodes: &[D::Node],
) -> Result<Option<D::Node>, ListError> {
    let (Some(first), Some(last)) = (nodes.first(), nodes.last()) else {
        return Ok(None);
    };
    let node = up_while(dom, first, |n| has_inline_style(dom, n));
    let Some(parent) = dom.parent(&node) else {
        return Ok(None);
    };
    let parent_name = dom.node_name(&parent);
    if !allows_nesting(&parent_name, list_type) {
        let error = ListError::NestingDisallowed {
            parent: parent_name,
            child: SmolStr::new(list_type.to_ascii_uppercase()),
        };
        tracing::error!(target: "quire::lists", %error, "refusing to build list");
        return Err(error);
    }

    let grouping = group_nodes(dom, config, nodes);
    let lines: Vec<Vec<D::Node>> = grouping
        .groups
        .into_iter()
        .map(|group| group.into_iter().filter(|n| is_rendered(dom, n)).collect::<Vec<_>>())
        .filter(|group| !group.is_empty())
        .collect();
    if lines.is_empty() {
        tracing::debug!(target: "quire::lists", "nothing rendered to list");
        return Ok(None);
    }
    // The list breaks the lines itself.
    let edges: Vec<D::Node> = [dom.prev_sibling(first), dom.next_sibling(last)]
        .into_iter()
        .flatten()
        .filter(|n| is_br(dom, n))
        .collect();

    let list = dom.create_element(list_type);
    dom.insert_before(&parent, &list, Some(&node));
    for line in &lines {
        let item = dom.create_element("li");
        dom.append(&list, &item);
        move_nodes(dom, line, &item, None);
    }
    for br in grouping.separators.iter().chain(&edges) {
        dom.remove(br);
    }
    tracing::debug!(target: "quire::lists", list_type, items = lines.len(), "built list");
    for container in &grouping.parents {
        remove_invisible_nodes(dom, container);
    }
    Ok(Some(list))
}

/// Build a list from `nodes` and remap `start` and `end` into it.
fn build_around<D: Dom>(
    dom: &mut D,
    config: &EditableConfig,
    list_type: &str,
    nodes: &[D::Node],
    start: &Boundary<D::Node>,
    end: &Boundary<D::Node>,
) -> Result<Range<D::Node>, ListError> {
    let (start_anchor, end_anchor) = (anchor(dom, start), anchor(dom, end));
    let Some(list) = build(dom, config, list_type, nodes)? else {
        return Ok(Range {
            start: start.clone(),
            end: end.clone(),
        });
    };
    let inside = (
        boundaries::from_start_of_node(&list),
        boundaries::from_end_of_node(dom, &list),
    );
    Ok(Range {
        start: resolve(dom, start_anchor, &inside.0),
        end: resolve(dom, end_anchor, &inside.1),
    })
}

/// The node that holds the line a caret is on, or `None` on an empty line.
fn line_seed<D: Dom>(dom: &D, at: &Boundary<D::Node>) -> Option<D::Node> {
    let at = boundaries::normalize(dom, at);
    if is_text_node(dom, &at.container) {
        return Some(at.container);
    }
    let is_line_end = |n: &D::Node| is_void_node(dom, n) && has_linebreaking_style(dom, n);
    boundaries::node_after(dom, &at)
        .filter(|n| !is_line_end(n))
        .or_else(|| boundaries::node_before(dom, &at).filter(|n| !is_line_end(n)))
}

/// The line-breaking node a boundary's line lives in.
fn line_of<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> D::Node {
    up_while(dom, &boundary.container, |n| {
        !has_linebreaking_style(dom, n) && !is_editing_host(dom, n)
    })
}

/// Split the line holding both edges of the range so that only the
/// selected part is listed. Returns the nodes between the split points and
/// the updated range.
fn split_line<D: Dom>(
    dom: &mut D,
    line: &D::Node,
    start: &Boundary<D::Node>,
    end: &Boundary<D::Node>,
) -> Option<(Vec<D::Node>, Boundary<D::Node>, Boundary<D::Node>)> {
    let parent = dom.parent(line)?;
    let mut tracked = [start.clone(), end.clone()];
    let after = split_at(dom, end, &parent, &mut tracked);
    let [mut start, end] = tracked;
    let mut tracked = [end, after];
    if is_text_node(dom, &start.container)
        && start.offset > 0
        && start.offset < node_length(dom, &start.container)
    {
        let text = split_text_node(dom, &start.container, start.offset, &mut tracked);
        start = Boundary::new(dom.next_sibling(&text)?, 0);
    }
    let mut tracked = [start.clone(), tracked[0].clone(), tracked[1].clone()];
    let before = split_at(dom, &start, &parent, &mut tracked);
    let [start, end, after] = tracked;
    let middle = dom
        .children(&parent)
        .into_iter()
        .skip(before.offset)
        .take(after.offset.saturating_sub(before.offset))
        .collect();
    Some((middle, start, end))
}

fn check_list_type(config: &EditableConfig, list_type: &str) -> Result<(), ListError> {
    let name = list_type.to_ascii_uppercase();
    if !LIST_CONTAINERS.contains(&name.as_str()) {
        let error = ListError::NotAList(SmolStr::new(list_type));
        tracing::error!(target: "quire::lists", %error, "invalid list type");
        return Err(error);
    }
    if !config.allows_list(list_type) {
        let error = ListError::NotAllowed(SmolStr::new(list_type));
        tracing::error!(target: "quire::lists", %error, "list type not allowed");
        return Err(error);
    }
    Ok(())
}

/// Wrap the lines between `start` and `end` in a new `list_type` list.
///
/// A collapsed range lists the line it is on. When both edges sit on the
/// same line, the line is split at the edges first so that only the
/// selected part becomes an item. A range already inside a list is left
/// alone. Returns the range remapped into the new structure.
pub fn format<D: Dom>(
    dom: &mut D,
    config: &EditableConfig,
    list_type: &str,
    start: &Boundary<D::Node>,
    end: &Boundary<D::Node>,
) -> Result<Range<D::Node>, ListError> {
    check_list_type(config, list_type)?;
    let unchanged = Range {
        start: start.clone(),
        end: end.clone(),
    };
    if in_list(dom, &start.container) || in_list(dom, &end.container) {
        tracing::debug!(target: "quire::lists", "range already in a list");
        return Ok(unchanged);
    }

    if start == end {
        let Some(seed) = line_seed(dom, start) else {
            tracing::debug!(target: "quire::lists", "caret on an empty line");
            return Ok(unchanged);
        };
        let node = up_while(dom, &seed, |n| {
            !has_linebreaking_style(dom, n) && !has_host_parent(dom, n)
        });
        if is_editing_host(dom, &node) {
            return Ok(unchanged);
        }
        let nodes = collect_siblings(dom, &node, &node);
        return build_around(dom, config, list_type, &nodes, start, end);
    }

    let line = line_of(dom, start);
    if line == line_of(dom, end) && !is_editing_host(dom, &line) && !is_list_item(dom, &line) {
        let Some((middle, start, end)) = split_line(dom, &line, start, end) else {
            return Ok(unchanged);
        };
        let (Some(first), Some(last)) = (middle.first(), middle.last()) else {
            return Ok(Range { start, end });
        };
        let nodes = collect_siblings(dom, first, last);
        return build_around(dom, config, list_type, &nodes, &start, &end);
    }

    let common = boundaries::common_container(dom, start, end);
    let nodes = if !has_linebreaking_style(dom, &common) {
        let node = up_while(dom, &common, |n| {
            dom.parent(n).is_some_and(|parent| {
                !is_collect_limit(dom, &parent) && !is_editing_host(dom, &parent)
            })
        });
        collect_siblings(dom, &node, &node)
    } else {
        let limit = |n: &D::Node| !is_collect_limit(dom, n) && !has_host_parent(dom, n);
        let first = boundaries::next_node(dom, &boundaries::normalize(dom, start));
        let last = boundaries::prev_node(dom, &boundaries::normalize(dom, end));
        let start_node = up_while(dom, &first, limit);
        let end_node = up_while(dom, &last, limit);
        collect_siblings(dom, &start_node, &end_node)
    };
    build_around(dom, config, list_type, &nodes, start, end)
}

/// Turn the children of `item` into lines: runs of inline content are
/// wrapped in paragraphs, block children stay as they are.
fn wrap_inline_runs<D: Dom>(dom: &mut D, item: &D::Node) {
    let mut runs: Vec<Vec<D::Node>> = vec![Vec::new()];
    for child in dom.children(item) {
        if has_block_style(dom, &child) {
            runs.push(Vec::new());
        } else if let Some(run) = runs.last_mut() {
            run.push(child);
        }
    }
    for run in runs {
        let Some(first) = run.first() else {
            continue;
        };
        if !run.iter().any(|n| is_rendered(dom, n)) {
            continue;
        }
        let paragraph = dom.create_element("p");
        dom.insert_before(item, &paragraph, Some(first));
        move_nodes(dom, &run, &paragraph, None);
    }
}

/// Take `item` out of its list and replace it with paragraphs.
///
/// Items after it move into a new list of the same type, and lists left
/// without rendered content are removed. Returns the position where the
/// item's content now starts.
fn unwrap_list_item<D: Dom>(dom: &mut D, item: &D::Node) -> Boundary<D::Node> {
    let Some(list) = dom.parent(item) else {
        return boundaries::from_start_of_node(item);
    };
    let rest = next_siblings(dom, item, |_| false);
    if !rest.is_empty() {
        let tail = dom.clone_node(&list, false);
        dom.insert_after(&list, &tail);
        move_nodes(dom, &rest, &tail, None);
        if is_unrendered(dom, &tail) {
            dom.remove(&tail);
        }
    }
    dom.insert_after(&list, item);
    if is_unrendered(dom, &list) {
        dom.remove(&list);
    }
    let at = boundaries::from_front_of_node(dom, item);
    wrap_inline_runs(dom, item);
    unwrap(dom, item);
    at
}

/// Unwrap the list items from the one holding `start` through the one
/// holding `end`. Returns the range remapped into the unwrapped content.
pub fn unformat<D: Dom>(
    dom: &mut D,
    start: &Boundary<D::Node>,
    end: &Boundary<D::Node>,
) -> Range<D::Node> {
    let start_item = nearest_item(dom, &start.container);
    let end_item = nearest_item(dom, &end.container);
    let mut items = Vec::new();
    match (&start_item, &end_item) {
        (Some(first), Some(last)) if dom.parent(first) == dom.parent(last) => {
            items.push(first.clone());
            if first != last {
                items.extend(next_siblings(dom, first, |n| n == last));
                items.push(last.clone());
            }
        }
        _ => {
            if let Some(first) = &start_item {
                items.extend(node_and_next_siblings(dom, first));
            }
            if let Some(last) = &end_item {
                let mut leading = prev_siblings(dom, last, |_| false);
                leading.push(last.clone());
                items.extend(leading);
            }
        }
    }
    items.retain(|n| is_list_item(dom, n));
    if items.is_empty() {
        return Range {
            start: start.clone(),
            end: end.clone(),
        };
    }

    let (start_anchor, end_anchor) = (anchor(dom, start), anchor(dom, end));
    let mut first_line = None;
    for item in &items {
        let at = unwrap_list_item(dom, item);
        first_line.get_or_insert(at);
    }
    tracing::debug!(target: "quire::lists", items = items.len(), "unwrapped list items");
    let fallback = first_line.unwrap_or_else(|| start.clone());
    Range {
        start: resolve(dom, start_anchor, &fallback),
        end: resolve(dom, end_anchor, &fallback),
    }
}

/// Unformat when both edges sit in items of a `list_type` list, otherwise
/// format. Items of a list of another type are converted.
pub fn toggle<D: Dom>(
    dom: &mut D,
    config: &EditableConfig,
    list_type: &str,
    start: &Boundary<D::Node>,
    end: &Boundary<D::Node>,
) -> Result<Range<D::Node>, ListError> {
    check_list_type(config, list_type)?;
    let start_item = nearest_item(dom, &start.container);
    let end_item = nearest_item(dom, &end.container);
    if let (Some(first), Some(last)) = (&start_item, &end_item) {
        let list = dom.parent(first);
        if list.is_some() && list == dom.parent(last) {
            let unformatted = unformat(dom, start, end);
            let same_type = list
                .as_ref()
                .is_some_and(|list| dom.node_name(list).eq_ignore_ascii_case(list_type));
            if same_type {
                return Ok(unformatted);
            }
            return format(dom, config, list_type, &unformatted.start, &unformatted.end);
        }
    }
    format(dom, config, list_type, start, end)
}

/// Whether nothing visible precedes `boundary` inside its list item.
pub fn is_at_start_of_list_item<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> bool {
    let mut node = boundaries::prev_node(dom, boundary);
    if is_text_node(dom, &boundary.container) {
        let prefix: String = dom
            .text(&boundary.container)
            .unwrap_or_default()
            .chars()
            .take(boundary.offset)
            .collect();
        if has_visible_char(&prefix) {
            return false;
        }
        let container = &boundary.container;
        node = match dom.prev_sibling(container).or_else(|| dom.parent(container)) {
            Some(node) => node,
            None => return false,
        };
    }
    let Some(item) = nearest_item(dom, &node) else {
        return false;
    };
    descendants_and_self(dom, &item)
        .into_iter()
        .skip(1)
        .filter(|n| is_text_node(dom, n) || is_void_node(dom, n))
        .filter(|n| *n != boundary.container && !contains(dom, n, &boundary.container))
        .filter(|n| {
            boundaries::precedes(dom, &boundaries::from_front_of_node(dom, n), boundary)
        })
        .all(|n| !is_rendered(dom, &n))
}
