//! Caret geometry.
//!
//! A collapsed range has no width in most browsers, so the caret box is
//! measured on a range expanded by one visible character, falling back to
//! the adjacent node and finally to the container's own box.

use serde::{Deserialize, Serialize};

use crate::boundaries::{self, Boundary};
use crate::dom::Dom;
use crate::elements::is_unrendered;
use crate::nodes::is_text_node;
use crate::styles::has_linebreaking_style;
use crate::traversal::{self, Unit};

/// Class the br style fix is scoped to.
pub const EDITABLE_CLASS: &str = "quire-editable";

/// Style sheet that gives `br` elements a measurable line box.
pub const BR_STYLE_FIX: &str =
    ".quire-editable br,.quire-editable br:after{content:\"\\A\";white-space:pre-line;}";

const DEFAULT_FONT_SIZE: f64 = 16.0;
const NORMAL_LINE_HEIGHT: f64 = 1.2;

/// A rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// `offsetTop`, `offsetLeft` and `offsetWidth` of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OffsetBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
}

/// Layout queries the caret algorithm needs from the host.
pub trait CaretHost<D: Dom> {
    /// Client rect of the range between two boundaries. A collapsed or
    /// empty range may measure with zero width.
    fn range_rect(
        &self,
        dom: &D,
        start: &Boundary<D::Node>,
        end: &Boundary<D::Node>,
    ) -> Option<Rect>;

    /// Client rect of a node.
    fn node_rect(&self, dom: &D, node: &D::Node) -> Option<Rect>;

    /// Layout offsets of an element.
    fn offset_box(&self, dom: &D, element: &D::Node) -> OffsetBox;

    /// Document scroll offsets as `(left, top)`.
    fn scroll(&self) -> (f64, f64);

    /// Install [`BR_STYLE_FIX`] into the document. Must be idempotent.
    fn ensure_br_style_fix(&self);
}

fn px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

/// Resolved `line-height` of an element in pixels.
pub fn line_height<D: Dom>(dom: &D, element: &D::Node) -> f64 {
    let font_size = dom
        .computed_style(element, "font-size")
        .and_then(|size| px(&size))
        .unwrap_or(DEFAULT_FONT_SIZE);
    let Some(value) = dom.computed_style(element, "line-height") else {
        return NORMAL_LINE_HEIGHT * font_size;
    };
    if let Some(pixels) = px(&value) {
        return pixels;
    }
    match value.trim().parse::<f64>() {
        Ok(factor) => factor * font_size,
        Err(_) => NORMAL_LINE_HEIGHT * font_size,
    }
}

fn step_right<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Boundary<D::Node> {
    let mut boundary = boundary.clone();
    loop {
        if let Some(next) = traversal::next(dom, &boundary, Unit::Char) {
            return next;
        }
        if has_linebreaking_style(dom, &boundaries::next_node(dom, &boundary)) {
            return boundary;
        }
        match traversal::next(dom, &boundary, Unit::Boundary) {
            Some(next) => boundary = next,
            None => return boundary,
        }
    }
}

fn step_left<D: Dom>(dom: &D, boundary: &Boundary<D::Node>) -> Boundary<D::Node> {
    let mut boundary = boundary.clone();
    loop {
        if let Some(prev) = traversal::prev(dom, &boundary, Unit::Char) {
            return prev;
        }
        if has_linebreaking_style(dom, &boundaries::prev_node(dom, &boundary)) {
            return boundary;
        }
        match traversal::prev(dom, &boundary, Unit::Boundary) {
            Some(prev) => boundary = prev,
            None => return boundary,
        }
    }
}

/// Extend the range one visible step to the right, if the line allows it.
fn expand_right<D: Dom>(
    dom: &D,
    start: &Boundary<D::Node>,
    end: &Boundary<D::Node>,
) -> Option<(Boundary<D::Node>, Boundary<D::Node>)> {
    if boundaries::is_at_end(dom, end)
        || has_linebreaking_style(dom, &boundaries::next_node(dom, end))
        || traversal::is_at_end(dom, start)
    {
        return None;
    }
    Some((start.clone(), step_right(dom, end)))
}

/// Extend the range one visible step to the left, if the line allows it.
/// Unrendered nodes right before the start are stepped over first.
fn expand_left<D: Dom>(
    dom: &D,
    start: &Boundary<D::Node>,
    end: &Boundary<D::Node>,
) -> Option<(Boundary<D::Node>, Boundary<D::Node>)> {
    let mut start = start.clone();
    while !is_text_node(dom, &start.container) && start.offset > 0 {
        match boundaries::node_before(dom, &start) {
            Some(prev) if is_unrendered(dom, &prev) => {
                start = boundaries::from_front_of_node(dom, &prev);
            }
            _ => break,
        }
    }
    if start.offset == 0 || has_linebreaking_style(dom, &boundaries::prev_node(dom, &start)) {
        return None;
    }
    Some((step_left(dom, &start), end.clone()))
}

fn bounds<D: Dom, H: CaretHost<D>>(
    host: &H,
    dom: &D,
    start: &Boundary<D::Node>,
    end: &Boundary<D::Node>,
) -> Option<Rect> {
    if let Some((from, to)) = expand_right(dom, start, end) {
        if let Some(rect) = host.range_rect(dom, &from, &to) {
            if rect.width > 0.0 {
                return Some(rect);
            }
        }
    }
    if let Some((from, to)) = expand_left(dom, start, end) {
        if let Some(mut rect) = host.range_rect(dom, &from, &to) {
            rect.left += rect.width;
            return Some(rect);
        }
    }
    host.range_rect(dom, start, end)
}

fn scrolled(rect: Rect, (left, top): (f64, f64)) -> Rect {
    Rect {
        top: rect.top + top,
        left: rect.left + left,
        ..rect
    }
}

/// Caret box for the range `start..end` in document coordinates.
///
/// Always produces a rectangle. Measurements are tried in order: the range
/// expanded by one visible step, the node next to `start`, and finally the
/// container's offset box with its computed line height.
pub fn box_for<D: Dom, H: CaretHost<D>>(
    host: &H,
    dom: &D,
    start: &Boundary<D::Node>,
    end: &Boundary<D::Node>,
) -> Rect {
    host.ensure_br_style_fix();
    let scroll = host.scroll();

    if let Some(rect) = bounds(host, dom, start, end) {
        if rect.width > 0.0 {
            return scrolled(rect, scroll);
        }
    }

    let adjacent =
        boundaries::node_after(dom, start).or_else(|| boundaries::node_before(dom, start));
    if let Some(node) = adjacent.filter(|node| !is_text_node(dom, node)) {
        if let Some(rect) = host.node_rect(dom, &node) {
            tracing::trace!(target: "quire::carets", ?node, "measured adjacent node");
            return scrolled(rect, scroll);
        }
    }

    let mut element = start.container.clone();
    if is_text_node(dom, &element) {
        if let Some(parent) = dom.parent(&element) {
            element = parent;
        }
    }
    let offsets = host.offset_box(dom, &element);
    tracing::debug!(
        target: "quire::carets",
        container = ?element,
        "falling back to container offset box"
    );
    Rect {
        top: offsets.top + scroll.1,
        left: offsets.left + scroll.0,
        width: offsets.width,
        height: line_height(dom, &element),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::document::{Document, NodeId};

    const CHAR_WIDTH: f64 = 8.0;
    const LINE: f64 = 20.0;

    /// Lays every text node out on one line, one fixed-width cell per char.
    #[derive(Default)]
    struct MonospaceHost {
        fixes: Cell<u32>,
    }

    impl CaretHost<Document> for MonospaceHost {
        fn range_rect(
            &self,
            _dom: &Document,
            start: &Boundary<NodeId>,
            end: &Boundary<NodeId>,
        ) -> Option<Rect> {
            if start.container != end.container {
                return Some(Rect::default());
            }
            let chars = end.offset.saturating_sub(start.offset) as f64;
            Some(Rect {
                top: 0.0,
                left: start.offset as f64 * CHAR_WIDTH,
                width: chars * CHAR_WIDTH,
                height: LINE,
            })
        }

        fn node_rect(&self, _dom: &Document, _node: &NodeId) -> Option<Rect> {
            Some(Rect {
                top: 40.0,
                left: 4.0,
                width: 30.0,
                height: 30.0,
            })
        }

        fn offset_box(&self, _dom: &Document, _element: &NodeId) -> OffsetBox {
            OffsetBox {
                top: 100.0,
                left: 10.0,
                width: 200.0,
            }
        }

        fn scroll(&self) -> (f64, f64) {
            (0.0, 5.0)
        }

        fn ensure_br_style_fix(&self) {
            if self.fixes.get() == 0 {
                self.fixes.set(1);
            }
        }
    }

    #[test]
    fn test_box_inside_text_has_width() {
        let (doc, host) = Document::editable("<p>abc</p>").unwrap();
        let p = doc.children(&host)[0];
        let text = doc.children(&p)[0];
        let at = Boundary::new(text, 1);
        let caret = box_for(&MonospaceHost::default(), &doc, &at, &at);
        assert!(caret.width > 0.0);
        assert_eq!(caret.left, 8.0);
        assert_eq!(caret.top, 5.0);
    }

    #[test]
    fn test_box_at_end_of_line_uses_right_edge() {
        let (doc, host) = Document::editable("<p>abc</p>").unwrap();
        let p = doc.children(&host)[0];
        let text = doc.children(&p)[0];
        let at = Boundary::new(text, 3);
        let caret = box_for(&MonospaceHost::default(), &doc, &at, &at);
        assert_eq!(caret.left, 24.0);
    }

    #[test]
    fn test_box_next_to_image() {
        let (doc, host) = Document::editable("<p><img></p>").unwrap();
        let p = doc.children(&host)[0];
        let at = Boundary::new(p, 0);
        let caret = box_for(&MonospaceHost::default(), &doc, &at, &at);
        assert_eq!(caret.top, 45.0);
        assert_eq!(caret.width, 30.0);
    }

    #[test]
    fn test_box_in_empty_item_falls_back_to_container() {
        let (doc, host) = Document::editable("<ul><li></li></ul>").unwrap();
        let ul = doc.children(&host)[0];
        let li = doc.children(&ul)[0];
        let at = Boundary::new(li, 0);
        let caret_host = MonospaceHost::default();
        let caret = box_for(&caret_host, &doc, &at, &at);
        assert_eq!(
            caret,
            Rect {
                top: 105.0,
                left: 10.0,
                width: 200.0,
                height: 19.2,
            }
        );
        box_for(&caret_host, &doc, &at, &at);
        assert_eq!(caret_host.fixes.get(), 1);
    }

    #[test]
    fn test_line_height() {
        let (mut doc, host) = Document::editable("<p>a</p>").unwrap();
        let p = doc.children(&host)[0];
        assert!((line_height(&doc, &p) - 19.2).abs() < f64::EPSILON);
        doc.set_inline_style(&p, "line-height", "24px");
        assert_eq!(line_height(&doc, &p), 24.0);
        doc.set_inline_style(&p, "line-height", "1.5");
        doc.set_inline_style(&p, "font-size", "20px");
        assert_eq!(line_height(&doc, &p), 30.0);
    }
}
