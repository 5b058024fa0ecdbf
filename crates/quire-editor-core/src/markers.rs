//! Boundary marker notation.
//!
//! `[` and `]` mark text boundaries, `{` and `}` node boundaries:
//! `<p>{<b>x</b>}</p>` selects the `b` element, `<p>a[b]c</p>` the `b` char.
//! Mostly useful for writing and debugging tests.

use crate::boundaries::{self, Boundary, Range};
use crate::document::{Document, NodeId};
use crate::dom::Dom;
use crate::error::MarkerError;
use crate::nodes::{is_text_node, node_index, nth_child};
use crate::traversing::descendants_and_self;

const MARKERS: [char; 4] = ['[', '{', '}', ']'];

struct Found<N> {
    start: Option<Boundary<N>>,
    end: Option<Boundary<N>>,
    count: usize,
}

impl<N> Found<N> {
    fn record(&mut self, marker: char, boundary: Boundary<N>) -> Result<(), MarkerError> {
        match self.count {
            0 if matches!(marker, '[' | '{') => self.start = Some(boundary),
            0 => return Err(MarkerError::EndBeforeStart(marker)),
            1 if matches!(marker, ']' | '}') => self.end = Some(boundary),
            1 => return Err(MarkerError::StartAfterStart(marker)),
            _ => return Err(MarkerError::TooMany),
        }
        self.count += 1;
        Ok(())
    }
}

/// Replace `node` by its text without markers, recording where they were.
fn extract_from<D: Dom>(
    dom: &mut D,
    node: &D::Node,
    found: &mut Found<D::Node>,
) -> Result<(), MarkerError> {
    let text = dom.text(node).unwrap_or_default();
    if !text.contains(MARKERS) {
        return Ok(());
    }
    let Some(parent) = dom.parent(node) else {
        return Ok(());
    };
    let mut current: Option<D::Node> = None;
    let mut run = String::new();
    let flush = |dom: &mut D, current: &mut Option<D::Node>, run: &mut String| {
        if run.is_empty() {
            return;
        }
        match current {
            Some(text) => {
                let joined = dom.text(text).unwrap_or_default() + run.as_str();
                dom.set_text(text, &joined);
            }
            None => {
                let text = dom.create_text(run);
                dom.insert_before(&parent, &text, Some(node));
                *current = Some(text);
            }
        }
        run.clear();
    };
    for c in text.chars() {
        if !MARKERS.contains(&c) {
            run.push(c);
            continue;
        }
        flush(dom, &mut current, &mut run);
        if matches!(c, '[' | ']') {
            let text = match current.clone() {
                Some(text) => text,
                None => {
                    let text = dom.create_text("");
                    dom.insert_before(&parent, &text, Some(node));
                    current = Some(text.clone());
                    text
                }
            };
            let length = dom.text(&text).unwrap_or_default().chars().count();
            found.record(c, Boundary::new(text, length))?;
        } else {
            found.record(c, Boundary::new(parent.clone(), node_index(dom, node)))?;
            current = None;
        }
    }
    flush(dom, &mut current, &mut run);
    dom.remove(node);
    Ok(())
}

/// Remove the markers from the text under `root` and return the range
/// they denoted.
pub fn extract<D: Dom>(dom: &mut D, root: &D::Node) -> Result<Range<D::Node>, MarkerError> {
    let mut found = Found {
        start: None,
        end: None,
        count: 0,
    };
    let texts: Vec<_> = descendants_and_self(dom, root)
        .into_iter()
        .filter(|n| is_text_node(dom, n))
        .collect();
    for text in &texts {
        extract_from(dom, text, &mut found)?;
    }
    match (found.start, found.end) {
        (Some(start), Some(end)) => Ok(Range { start, end }),
        _ => Err(MarkerError::Missing(found.count)),
    }
}

fn insert_marker(doc: &mut Document, boundary: &Boundary<NodeId>, marker: char) {
    let container = &boundary.container;
    if is_text_node(doc, container) {
        let mut text = doc.text(container).unwrap_or_default();
        let byte = text
            .char_indices()
            .nth(boundary.offset)
            .map_or(text.len(), |(byte, _)| byte);
        text.insert(byte, marker);
        doc.set_text(container, &text);
    } else {
        let reference = nth_child(doc, container, boundary.offset);
        let text = doc.create_text(&marker.to_string());
        doc.insert_before(container, &text, reference.as_ref());
    }
}

/// HTML of the common container of `start` and `end` with the markers put
/// back in. The document itself is left untouched.
pub fn hint(doc: &Document, start: &Boundary<NodeId>, end: &Boundary<NodeId>) -> String {
    let container = boundaries::common_container(doc, start, end);
    let mut copy = doc.clone();
    let (open, close) = (
        if is_text_node(doc, &start.container) { '[' } else { '{' },
        if is_text_node(doc, &end.container) { ']' } else { '}' },
    );
    insert_marker(&mut copy, end, close);
    insert_marker(&mut copy, start, open);
    copy.outer_html(&container)
}
