//! End-to-end editing scenarios over the in-memory document.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use quire_editor_core::boundaries::{self, Boundary, Range};
use quire_editor_core::carets::{self, CaretHost, OffsetBox, Rect};
use quire_editor_core::elements::{is_rendered, is_unrendered};
use quire_editor_core::nodes::{
    normalized_from_real_index, num_children, real_from_normalized_index,
};
use quire_editor_core::selection_change::{Detection, SelectionEvent, SelectionWatcher, Standard};
use quire_editor_core::{Document, Dom, EditableConfig, NodeId, Override, lists, markers, overrides};

fn marked(html: &str) -> (Document, NodeId, Range<NodeId>) {
    let (mut doc, host) = Document::editable(html).unwrap();
    let range = markers::extract(&mut doc, &host).unwrap();
    (doc, host, range)
}

#[test]
fn test_format_selection_inside_paragraph() {
    let (mut doc, host, range) = marked("<p>one [two]</p>");
    let config = EditableConfig::default();
    let range = lists::format(&mut doc, &config, "ul", &range.start, &range.end).unwrap();
    assert_eq!(doc.inner_html(&host), "<p>one </p><ul><li>two</li></ul>");
    assert_eq!(markers::hint(&doc, &range.start, &range.end), "[two]");
    let ul = doc.children(&host)[1];
    assert!(doc.children(&host).iter().all(|n| is_rendered(&doc, n)));
    assert_eq!(doc.node_name(&ul), "UL");
}

#[test]
fn test_empty_paragraph_is_unrendered() {
    let (doc, host) = Document::editable("<p></p>").unwrap();
    let p = doc.children(&host)[0];
    assert!(is_unrendered(&doc, &p));
}

#[test]
fn test_empty_inline_between_text_is_unrendered() {
    let (doc, host) = Document::editable("<p>a<b></b>b</p>").unwrap();
    let p = doc.children(&host)[0];
    let b = doc.children(&p)[1];
    assert!(is_unrendered(&doc, &b));
    assert!(!is_unrendered(&doc, &doc.children(&p)[0]));
}

#[test]
fn test_harvest_nested_formatting() {
    let (doc, _host, range) = marked("<p><b>bold <i>bold-[]italic</i></b></p>");
    let harvested = overrides::harvest(&doc, &range.start.container, |_| false);
    assert_eq!(
        harvested,
        vec![Override::state("italic", true), Override::state("bold", true)]
    );
}

#[test]
fn test_unformat_whole_list() {
    let (mut doc, host, range) = marked("<ul><li>[one</li><li>two]</li></ul>");
    lists::unformat(&mut doc, &range.start, &range.end);
    assert_eq!(doc.inner_html(&host), "<p>one</p><p>two</p>");
}

#[test]
fn test_identical_mouseups_notify_once() {
    let (_doc, _host, range) = marked("<p>a[]b</p>");
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let mut watcher = SelectionWatcher::new(
        None,
        Box::new(Standard),
        Box::new(move |_: Option<&Range<NodeId>>, _: SelectionEvent| {
            *counter.borrow_mut() += 1;
        }),
    );
    let first = watcher.observe(SelectionEvent::MouseUp, Some(range.clone()));
    let second = watcher.observe(SelectionEvent::MouseUp, Some(range));
    assert_eq!((first, second), (Detection::Changed, Detection::Unchanged));
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn test_unrendered_classification_is_idempotent() {
    let (doc, host) =
        Document::editable("<p> a <b> </b></p>\n<ul>\n<li>x<br></li>\n</ul><i></i>").unwrap();
    for node in quire_editor_core::traversing::descendants_and_self(&doc, &host) {
        assert_eq!(is_unrendered(&doc, &node), is_unrendered(&doc, &node));
        assert_eq!(is_rendered(&doc, &node), !is_unrendered(&doc, &node));
    }
}

#[test]
fn test_normalized_indices_round_trip() {
    let (mut doc, host) = Document::editable("<p>a</p>").unwrap();
    let p = doc.children(&host)[0];
    let b = doc.create_text("b");
    let br = doc.create_element("br");
    let c = doc.create_text("c");
    doc.append(&p, &b);
    doc.append(&p, &br);
    doc.append(&p, &c);
    for real in 0..=num_children(&doc, &p) {
        let normalized = normalized_from_real_index(&doc, &p, real);
        let back = real_from_normalized_index(&doc, &p, normalized);
        assert_eq!(normalized_from_real_index(&doc, &p, back), normalized);
    }
}

fn assert_attached(doc: &Document, host: &NodeId, boundary: &Boundary<NodeId>) {
    let mut node = boundary.container;
    while node != *host {
        match doc.parent(&node) {
            Some(parent) => node = parent,
            None => panic!("boundary {boundary:?} is outside the editing host"),
        }
    }
}

#[test]
fn test_list_lines_round_trip() {
    let (mut doc, host, range) = marked("<p>[one</p>two]");
    let config = EditableConfig::default();
    let listed = lists::format(&mut doc, &config, "ul", &range.start, &range.end).unwrap();
    assert_eq!(doc.inner_html(&host), "<ul><li>one</li><li>two</li></ul>");
    assert_attached(&doc, &host, &listed.start);
    assert_attached(&doc, &host, &listed.end);
    let back = lists::unformat(&mut doc, &listed.start, &listed.end);
    assert_eq!(doc.inner_html(&host), "<p>one</p><p>two</p>");
    assert_eq!(back, range);
}

#[test]
fn test_br_lines_become_items() {
    let (mut doc, host, range) = marked("a<br>b[]<br>c");
    let config = EditableConfig::default();
    let listed = lists::format(&mut doc, &config, "ul", &range.start, &range.end).unwrap();
    assert_eq!(doc.inner_html(&host), "a<ul><li>b</li></ul>c");
    assert_attached(&doc, &host, &listed.start);

    let (mut doc, host, range) = marked("[a<br>b<br>c]");
    let listed = lists::format(&mut doc, &config, "ul", &range.start, &range.end).unwrap();
    assert_eq!(doc.inner_html(&host), "<ul><li>a</li><li>b</li><li>c</li></ul>");
    assert_attached(&doc, &host, &listed.start);
    assert_attached(&doc, &host, &listed.end);
}

#[test]
fn test_empty_line_is_not_listed() {
    let (mut doc, host) = Document::editable("<p>a</p><p></p>").unwrap();
    let empty = doc.children(&host)[1];
    let at = Boundary::new(empty, 0);
    let config = EditableConfig::default();
    let range = lists::format(&mut doc, &config, "ul", &at, &at).unwrap();
    assert_eq!(doc.inner_html(&host), "<p>a</p><p></p>");
    assert_eq!(range, Range::collapsed(at));
    assert_attached(&doc, &host, &range.start);
}

#[test]
fn test_list_toggle_is_a_weak_inverse() {
    let (mut doc, host, range) = marked("<p>te[]xt</p>");
    let config = EditableConfig::default();
    let listed = lists::toggle(&mut doc, &config, "ol", &range.start, &range.end).unwrap();
    assert_eq!(doc.inner_html(&host), "<ol><li>text</li></ol>");
    let back = lists::toggle(&mut doc, &config, "ol", &listed.start, &listed.end).unwrap();
    assert_eq!(doc.inner_html(&host), "<p>text</p>");
    assert_eq!(markers::hint(&doc, &back.start, &back.end), "te[]xt");
}

#[test]
fn test_override_precedence() {
    let (doc, _host, range) = marked("<b><i>x[]</i></b>");
    let harvested = overrides::harvest(&doc, &range.start.container, |_| false);
    assert_eq!(overrides::names(&harvested), ["italic", "bold"]);

    let (doc, _host, range) = marked("<b><b>x[]</b></b>");
    let harvested = overrides::harvest(&doc, &range.start.container, |_| false);
    assert_eq!(harvested, vec![Override::state("bold", true)]);
}

/// Lays text out on a single line in fixed-width cells.
struct Monospace;

impl CaretHost<Document> for Monospace {
    fn range_rect(
        &self,
        _dom: &Document,
        start: &Boundary<NodeId>,
        end: &Boundary<NodeId>,
    ) -> Option<Rect> {
        (start.container == end.container).then(|| Rect {
            top: 0.0,
            left: start.offset as f64 * 10.0,
            width: end.offset.saturating_sub(start.offset) as f64 * 10.0,
            height: 18.0,
        })
    }

    fn node_rect(&self, _dom: &Document, _node: &NodeId) -> Option<Rect> {
        None
    }

    fn offset_box(&self, _dom: &Document, _element: &NodeId) -> OffsetBox {
        OffsetBox::default()
    }

    fn scroll(&self) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn ensure_br_style_fix(&self) {}
}

#[test]
fn test_caret_inside_text_has_a_box() {
    let (doc, _host, range) = marked("<p>wo[]rd</p>");
    let caret = carets::box_for(&Monospace, &doc, &range.start, &range.end);
    assert!(caret.width > 0.0);
    assert!(caret.height > 0.0);
    assert_eq!(caret.left, 20.0);
}

#[test]
fn test_boundary_ordering() {
    let (doc, _host, range) = marked("<p>a[b</p><p>c]d</p>");
    assert_eq!(
        boundaries::compare(&doc, &range.start, &range.end),
        Ordering::Less
    );
    assert!(boundaries::precedes(&doc, &range.start, &range.end));
    assert!(!boundaries::precedes(&doc, &range.end, &range.start));
    assert_eq!(
        boundaries::compare(&doc, &range.start, &range.start),
        Ordering::Equal
    );
    assert!(boundaries::equals(&range.start, &range.start.clone()));
    assert!(!boundaries::equals(&range.start, &range.end));
    let reversed = Range::new(&doc, range.end.clone(), range.start.clone());
    assert_eq!(reversed, range);
    assert!(Range::collapsed(range.start.clone()).is_collapsed());
}
