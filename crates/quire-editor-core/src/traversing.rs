//! Sibling and ancestor walks over a [`Dom`].

use crate::dom::Dom;

/// Follow `next_sibling` from `node` while `cond` holds. Returns the first
/// node that fails the condition, or `None` when the siblings run out.
pub fn next_while<D, F>(dom: &D, node: Option<D::Node>, mut cond: F) -> Option<D::Node>
where
    D: Dom,
    F: FnMut(&D::Node) -> bool,
{
    let mut current = node;
    while let Some(n) = current.as_ref() {
        if !cond(n) {
            break;
        }
        current = dom.next_sibling(n);
    }
    current
}

/// Mirror of [`next_while`] over previous siblings.
pub fn prev_while<D, F>(dom: &D, node: Option<D::Node>, mut cond: F) -> Option<D::Node>
where
    D: Dom,
    F: FnMut(&D::Node) -> bool,
{
    let mut current = node;
    while let Some(n) = current.as_ref() {
        if !cond(n) {
            break;
        }
        current = dom.prev_sibling(n);
    }
    current
}

/// Climb from `node` through its ancestors while `cond` holds.
///
/// Returns the first node that fails the condition. When every ancestor up
/// to the root satisfies it, the root is returned rather than nothing.
pub fn up_while<D, F>(dom: &D, node: &D::Node, mut cond: F) -> D::Node
where
    D: Dom,
    F: FnMut(&D::Node) -> bool,
{
    let mut current = node.clone();
    while cond(&current) {
        match dom.parent(&current) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}

/// Apply `func` to `node` and each ancestor until `until` holds. The parent
/// is read before `func` runs so `func` may detach the node.
pub fn climb_until<D, F, U>(dom: &mut D, node: &D::Node, mut func: F, mut until: U)
where
    D: Dom,
    F: FnMut(&mut D, &D::Node),
    U: FnMut(&D, &D::Node) -> bool,
{
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if until(dom, &n) {
            break;
        }
        let parent = dom.parent(&n);
        func(dom, &n);
        current = parent;
    }
}

/// Ancestors of `node`, nearest first, stopping before the first one that
/// matches `pred`.
pub fn parents_until<D, F>(dom: &D, node: &D::Node, mut pred: F) -> Vec<D::Node>
where
    D: Dom,
    F: FnMut(&D::Node) -> bool,
{
    let mut parents = Vec::new();
    let mut current = dom.parent(node);
    while let Some(parent) = current {
        if pred(&parent) {
            break;
        }
        current = dom.parent(&parent);
        parents.push(parent);
    }
    parents
}

/// `node` followed by [`parents_until`]. Empty when `node` itself matches.
pub fn child_and_parents_until<D, F>(dom: &D, node: &D::Node, mut pred: F) -> Vec<D::Node>
where
    D: Dom,
    F: FnMut(&D::Node) -> bool,
{
    if pred(node) {
        return Vec::new();
    }
    let mut nodes = vec![node.clone()];
    nodes.extend(parents_until(dom, node, pred));
    nodes
}

/// Like [`child_and_parents_until`] but also includes the matching ancestor.
pub fn child_and_parents_until_incl<D, F>(dom: &D, node: &D::Node, mut pred: F) -> Vec<D::Node>
where
    D: Dom,
    F: FnMut(&D::Node) -> bool,
{
    if pred(node) {
        return vec![node.clone()];
    }
    let mut nodes = vec![node.clone()];
    nodes.extend(parents_until(dom, node, &mut pred));
    let topmost = nodes.last().cloned().unwrap_or_else(|| node.clone());
    if let Some(parent) = dom.parent(&topmost) {
        nodes.push(parent);
    }
    nodes
}

/// Walk towards the following (or, with `backwards`, preceding) nodes that
/// are not ancestors of `start`, returning the first one that `matches`.
///
/// Siblings are visited without descending into them; when the siblings
/// run out the walk continues from the parent. Stops with `None` as soon as
/// `until` holds for a visited sibling or parent.
pub fn next_non_ancestor<D, M, U>(
    dom: &D,
    start: &D::Node,
    backwards: bool,
    mut matches: M,
    mut until: U,
) -> Option<D::Node>
where
    D: Dom,
    M: FnMut(&D::Node) -> bool,
    U: FnMut(&D::Node) -> bool,
{
    let mut node = start.clone();
    loop {
        let next = if backwards {
            dom.prev_sibling(&node)
        } else {
            dom.next_sibling(&node)
        };
        match next {
            Some(next) => {
                if until(&next) {
                    return None;
                }
                if matches(&next) {
                    return Some(next);
                }
                node = next;
            }
            None => {
                let parent = dom.parent(&node)?;
                if until(&parent) {
                    return None;
                }
                node = parent;
            }
        }
    }
}

/// Previous siblings of `node` in document order, nearest last, stopping
/// before the first one for which `until` holds.
pub fn prev_siblings<D, U>(dom: &D, node: &D::Node, mut until: U) -> Vec<D::Node>
where
    D: Dom,
    U: FnMut(&D::Node) -> bool,
{
    let mut nodes = Vec::new();
    let mut current = dom.prev_sibling(node);
    while let Some(prev) = current {
        if until(&prev) {
            break;
        }
        current = dom.prev_sibling(&prev);
        nodes.push(prev);
    }
    nodes.reverse();
    nodes
}

/// Next siblings of `node`, stopping before the first one for which `until`
/// holds.
pub fn next_siblings<D, U>(dom: &D, node: &D::Node, mut until: U) -> Vec<D::Node>
where
    D: Dom,
    U: FnMut(&D::Node) -> bool,
{
    let mut nodes = Vec::new();
    let mut current = dom.next_sibling(node);
    while let Some(next) = current {
        if until(&next) {
            break;
        }
        current = dom.next_sibling(&next);
        nodes.push(next);
    }
    nodes
}

/// `node` and all of its following siblings.
pub fn node_and_next_siblings<D: Dom>(dom: &D, node: &D::Node) -> Vec<D::Node> {
    let mut nodes = vec![node.clone()];
    nodes.extend(next_siblings(dom, node, |_| false));
    nodes
}

/// Depth-first pre-order successor of `node`.
pub fn forward<D: Dom>(dom: &D, node: &D::Node) -> Option<D::Node> {
    if let Some(child) = dom.first_child(node) {
        return Some(child);
    }
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if let Some(next) = dom.next_sibling(&n) {
            return Some(next);
        }
        current = dom.parent(&n);
    }
    None
}

/// Every node in the subtree of `node`, `node` first, in document order.
pub fn descendants_and_self<D: Dom>(dom: &D, node: &D::Node) -> Vec<D::Node> {
    let mut nodes = vec![node.clone()];
    let mut index = 0;
    while index < nodes.len() {
        let children = dom.children(&nodes[index]);
        let insert_at = index + 1;
        for (i, child) in children.into_iter().enumerate() {
            nodes.insert(insert_at + i, child);
        }
        index += 1;
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_sibling_walks() {
        let (doc, host) = Document::editable("<i>a</i><b>b</b><u>c</u><s>d</s>").unwrap();
        let kids = doc.children(&host);
        let name = |n: &crate::document::NodeId| doc.node_name(n);

        let stop = next_while(&doc, Some(kids[0]), |n| name(n) != "U");
        assert_eq!(stop, Some(kids[2]));
        assert_eq!(next_while(&doc, Some(kids[0]), |_| true), None);
        assert_eq!(prev_while(&doc, Some(kids[3]), |n| name(n) != "B"), Some(kids[1]));

        assert_eq!(prev_siblings(&doc, &kids[2], |_| false), vec![kids[0], kids[1]]);
        assert_eq!(next_siblings(&doc, &kids[0], |n| *n == kids[3]), vec![kids[1], kids[2]]);
        assert_eq!(node_and_next_siblings(&doc, &kids[2]), vec![kids[2], kids[3]]);
    }

    #[test]
    fn test_ancestor_walks() {
        let (doc, host) = Document::editable("<p><b><i>x</i></b></p>").unwrap();
        let p = doc.children(&host)[0];
        let b = doc.children(&p)[0];
        let i = doc.children(&b)[0];
        let text = doc.children(&i)[0];

        assert_eq!(up_while(&doc, &text, |n| *n != p), p);
        assert_eq!(parents_until(&doc, &text, |n| *n == p), vec![i, b]);
        assert_eq!(child_and_parents_until(&doc, &text, |n| *n == b), vec![text, i]);
        assert_eq!(
            child_and_parents_until_incl(&doc, &text, |n| *n == b),
            vec![text, i, b]
        );
        assert!(child_and_parents_until(&doc, &p, |n| *n == p).is_empty());
    }

    #[test]
    fn test_next_non_ancestor() {
        let (doc, host) = Document::editable("<p><b>x</b></p><p>y</p>").unwrap();
        let first = doc.children(&host)[0];
        let second = doc.children(&host)[1];
        let b = doc.children(&first)[0];
        let text = doc.children(&b)[0];

        let found = next_non_ancestor(&doc, &text, false, |n| doc.node_name(n) == "P", |n| {
            *n == host
        });
        assert_eq!(found, Some(second));
        let blocked = next_non_ancestor(&doc, &text, false, |_| true, |n| *n == first);
        assert_eq!(blocked, None);
        assert_eq!(next_non_ancestor(&doc, &text, true, |_| true, |n| *n == host), None);
    }

    #[test]
    fn test_climb_until_detaches() {
        let (mut doc, host) = Document::editable("<p><b><i></i></b></p>").unwrap();
        let p = doc.children(&host)[0];
        let b = doc.children(&p)[0];
        let i = doc.children(&b)[0];
        climb_until(&mut doc, &i, |dom, n| dom.remove(n), |_, n| *n == p);
        assert!(doc.children(&p).is_empty());
    }

    #[test]
    fn test_descendants_in_document_order() {
        let (doc, host) = Document::editable("<p>a<b>b</b></p><p>c</p>").unwrap();
        let all = descendants_and_self(&doc, &host);
        let names: Vec<_> = all.iter().map(|n| doc.node_name(n).to_string()).collect();
        assert_eq!(names, ["DIV", "P", "#text", "B", "#text", "P", "#text"]);
        assert_eq!(forward(&doc, &all[2]), Some(all[3]));
        assert_eq!(forward(&doc, &all[4]), Some(all[5]));
    }
}
