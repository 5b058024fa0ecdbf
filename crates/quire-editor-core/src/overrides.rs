//! Pending inline formatting.
//!
//! An override is a formatting instruction that is not reflected in the
//! document yet, like pressing bold with a collapsed selection. Lists of
//! overrides are ordered and later entries win when names collide.
//!
//! [`harvest`] reads the overrides the document already implies at a node,
//! [`consume`] materializes a list as wrapper elements at a boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::boundaries::Boundary;
use crate::dom::Dom;
use crate::mutation::insert_node_at_boundary;
use crate::nodes::{is_editing_host, is_element_node, is_text_node};
use crate::traversing::child_and_parents_until;

/// Value of an override: a format state or a CSS value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    State(bool),
    Css(String),
}

/// A named formatting override.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Override {
    pub name: SmolStr,
    pub value: OverrideValue,
}

impl Override {
    pub fn state(name: &str, on: bool) -> Self {
        Self {
            name: SmolStr::new(name),
            value: OverrideValue::State(on),
        }
    }

    pub fn css(property: &str, value: &str) -> Self {
        Self {
            name: SmolStr::new(property),
            value: OverrideValue::Css(value.to_string()),
        }
    }

    pub fn is_state(&self) -> bool {
        matches!(self.value, OverrideValue::State(_))
    }
}

/// Format states implied by element names.
const NODE_TO_STATE: &[(&str, &str)] = &[
    ("A", "link"),
    ("U", "underline"),
    ("B", "bold"),
    ("STRONG", "bold"),
    ("I", "italic"),
    ("EM", "italic"),
    ("STRIKE", "strikethrough"),
    ("S", "strikethrough"),
    ("SUB", "subscript"),
    ("SUP", "superscript"),
];

/// Element created for a state when it is consumed.
const STATE_TO_NODE: &[(&str, &str)] = &[
    ("link", "a"),
    ("bold", "b"),
    ("italic", "i"),
    ("underline", "u"),
    ("strikethrough", "s"),
    ("subscript", "sub"),
    ("superscript", "sup"),
];

/// `(state, property, on value, explicit off value)` for states that
/// inline styles can set.
const STATE_TO_STYLE: &[(&str, &str, &str, Option<&str>)] = &[
    ("bold", "font-weight", "bold", None),
    ("italic", "font-style", "italic", None),
    ("underline", "text-decoration", "underline", Some("none")),
    ("strikethrough", "text-decoration", "line-through", Some("none")),
];

/// CSS properties carried as overrides.
pub const TRACKED_STYLES: &[&str] = &["color", "background-color", "font-family", "font-size"];

fn is_bold_weight(value: &str) -> bool {
    match value {
        "bold" | "bolder" => true,
        numeric => numeric.parse::<u16>().is_ok_and(|weight| weight >= 600),
    }
}

fn states_from_styles<D: Dom>(dom: &D, element: &D::Node) -> Vec<Override> {
    let mut states = Vec::new();
    for (state, property, on, off) in STATE_TO_STYLE {
        let Some(value) = dom.inline_style(element, property) else {
            continue;
        };
        let value = value.trim().to_ascii_lowercase();
        match off {
            Some(off) if value == *off => states.push(Override::state(state, false)),
            Some(_) if value.contains(on) => states.push(Override::state(state, true)),
            Some(_) => {}
            None if *property == "font-weight" => {
                states.push(Override::state(state, is_bold_weight(&value)));
            }
            None => states.push(Override::state(state, value == *on)),
        }
    }
    states
}

/// Overrides a single element implies, tag state first.
fn node_overrides<D: Dom>(dom: &D, node: &D::Node) -> Vec<Override> {
    if !is_element_node(dom, node) {
        return Vec::new();
    }
    let name = dom.node_name(node);
    let mut overrides: Vec<_> = NODE_TO_STATE
        .iter()
        .filter(|(tag, _)| *tag == name)
        .map(|(_, state)| Override::state(state, true))
        .collect();
    overrides.extend(states_from_styles(dom, node));
    overrides.extend(TRACKED_STYLES.iter().filter_map(|property| {
        dom.inline_style(node, property)
            .map(|value| Override::css(property, &value))
    }));
    overrides
}

/// Overrides the document implies at `node`, innermost first.
///
/// Walks from `node` through its ancestors, stopping before the first one
/// for which `until` holds or at the editing host. When a name appears more
/// than once the closest ancestor wins.
pub fn harvest<D, F>(dom: &D, node: &D::Node, mut until: F) -> Vec<Override>
where
    D: Dom,
    F: FnMut(&D::Node) -> bool,
{
    let nodes = child_and_parents_until(dom, node, |n| until(n) || is_editing_host(dom, n));
    let mut harvested: Vec<Override> = Vec::new();
    for node in &nodes {
        for candidate in node_overrides(dom, node) {
            if !harvested.iter().any(|o| o.name == candidate.name) {
                harvested.push(candidate);
            }
        }
    }
    tracing::trace!(target: "quire::overrides", count = harvested.len(), "harvested overrides");
    harvested
}

/// Drop earlier duplicates, keeping the last override of each name.
pub fn unique(overrides: &[Override]) -> Vec<Override> {
    let mut result: Vec<Override> = Vec::with_capacity(overrides.len());
    for (index, candidate) in overrides.iter().enumerate() {
        let superseded = overrides[index + 1..]
            .iter()
            .any(|later| later.name == candidate.name);
        if !superseded {
            result.push(candidate.clone());
        }
    }
    result
}

/// Combine harvested state with pending overrides; pending ones win.
pub fn joinable(harvested: &[Override], pending: &[Override]) -> Vec<Override> {
    let mut joined = harvested.to_vec();
    joined.extend_from_slice(pending);
    unique(&joined)
}

pub fn names(overrides: &[Override]) -> Vec<SmolStr> {
    overrides.iter().map(|o| o.name.clone()).collect()
}

/// The effective value of `name`, if any override sets it.
pub fn lookup<'a>(overrides: &'a [Override], name: &str) -> Option<&'a OverrideValue> {
    overrides
        .iter()
        .rev()
        .find(|o| o.name == name)
        .map(|o| &o.value)
}

/// Add an override, or remove it when an equal one is already present.
/// Any other override of the same name is replaced.
pub fn toggle(overrides: &[Override], name: &str, value: OverrideValue) -> Vec<Override> {
    let present = overrides
        .iter()
        .any(|o| o.name == name && o.value == value);
    let mut toggled: Vec<_> = overrides
        .iter()
        .filter(|o| o.name != name)
        .cloned()
        .collect();
    if !present {
        toggled.push(Override {
            name: SmolStr::new(name),
            value,
        });
    }
    toggled
}

/// Name to value lookup table. Later overrides win.
pub fn map(overrides: &[Override]) -> BTreeMap<SmolStr, OverrideValue> {
    overrides
        .iter()
        .map(|o| (o.name.clone(), o.value.clone()))
        .collect()
}

/// Lookup table of the state at `node` with `pending` applied on top.
///
/// When nothing sets `color`, the computed colour of the nearest element
/// is reported so colour pickers always have a value.
pub fn map_with_harvest<D: Dom>(
    pending: &[Override],
    dom: &D,
    node: &D::Node,
) -> BTreeMap<SmolStr, OverrideValue> {
    let harvested = harvest(dom, node, |_| false);
    let mut table = map(&joinable(&harvested, pending));
    if !table.contains_key("color") {
        let element = if is_text_node(dom, node) {
            dom.parent(node)
        } else {
            Some(node.clone())
        };
        if let Some(color) = element.and_then(|e| dom.computed_style(&e, "color")) {
            table.insert(SmolStr::new_static("color"), OverrideValue::Css(color));
        }
    }
    table
}

fn state_node_name(state: &str) -> Option<&'static str> {
    STATE_TO_NODE
        .iter()
        .find(|(name, _)| *name == state)
        .map(|(_, node)| *node)
}

/// Materialize `overrides` as wrapper elements at `boundary`.
///
/// Each enabled state gets its own element, CSS overrides share one `span`,
/// and every wrapper is inserted inside the previous one. Returns the
/// boundary inside the innermost wrapper.
pub fn consume<D: Dom>(
    dom: &mut D,
    boundary: &Boundary<D::Node>,
    overrides: &[Override],
) -> Boundary<D::Node> {
    let mut boundary = boundary.clone();
    let mut span: Option<D::Node> = None;
    for o in unique(overrides) {
        match &o.value {
            OverrideValue::State(false) => {
                tracing::trace!(target: "quire::overrides", name = %o.name, "state off, no wrapper");
            }
            OverrideValue::State(true) => {
                let Some(tag) = state_node_name(&o.name) else {
                    tracing::debug!(
                        target: "quire::overrides",
                        name = %o.name,
                        "state has no wrapper element"
                    );
                    continue;
                };
                let wrapper = dom.create_element(tag);
                insert_node_at_boundary(dom, &wrapper, &boundary, false, &mut []);
                boundary = Boundary::new(wrapper, 0);
            }
            OverrideValue::Css(value) => {
                if let Some(span) = &span {
                    dom.set_inline_style(span, &o.name, value);
                    continue;
                }
                let wrapper = dom.create_element("span");
                dom.set_inline_style(&wrapper, &o.name, value);
                insert_node_at_boundary(dom, &wrapper, &boundary, false, &mut []);
                boundary = Boundary::new(wrapper.clone(), 0);
                span = Some(wrapper);
            }
        }
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, NodeId};

    fn innermost(doc: &Document, mut node: NodeId) -> NodeId {
        while let Some(child) = doc.first_child(&node) {
            node = child;
        }
        node
    }

    #[test]
    fn test_harvest_innermost_first() {
        let (doc, host) = Document::editable("<p><b>bold <i>bold-italic</i></b></p>").unwrap();
        let p = doc.children(&host)[0];
        let b = doc.children(&p)[0];
        let i = doc.children(&b)[1];
        let text = doc.children(&i)[0];
        assert_eq!(
            harvest(&doc, &text, |_| false),
            vec![Override::state("italic", true), Override::state("bold", true)]
        );
    }

    #[test]
    fn test_harvest_closest_wins() {
        let (doc, host) = Document::editable("<b><b>x</b></b>").unwrap();
        let text = innermost(&doc, host);
        assert_eq!(harvest(&doc, &text, |_| false), vec![Override::state("bold", true)]);

        let (doc, host) =
            Document::editable(r#"<b><span style="font-weight: normal">x</span></b>"#).unwrap();
        let text = innermost(&doc, host);
        assert_eq!(harvest(&doc, &text, |_| false), vec![Override::state("bold", false)]);
    }

    #[test]
    fn test_harvest_styles_and_limit() {
        let (doc, host) = Document::editable(
            r#"<u><span style="color: red; text-decoration: none; font-size: 12px">x</span></u>"#,
        )
        .unwrap();
        let u = doc.children(&host)[0];
        let text = innermost(&doc, host);
        assert_eq!(
            harvest(&doc, &text, |_| false),
            vec![
                Override::state("underline", false),
                Override::state("strikethrough", false),
                Override::css("color", "red"),
                Override::css("font-size", "12px"),
            ]
        );
        let limited = harvest(&doc, &text, |n| *n == u);
        assert_eq!(lookup(&limited, "underline"), Some(&OverrideValue::State(false)));
    }

    #[test]
    fn test_toggle_round_trip() {
        let pending = toggle(&[], "bold", OverrideValue::State(true));
        assert_eq!(pending, vec![Override::state("bold", true)]);
        let pending = toggle(&pending, "italic", OverrideValue::State(true));
        assert_eq!(names(&pending), ["bold", "italic"]);
        let off = toggle(&pending, "bold", OverrideValue::State(true));
        assert_eq!(off, vec![Override::state("italic", true)]);
        let back = toggle(&off, "bold", OverrideValue::State(true));
        assert_eq!(map(&back), map(&pending));

        let replaced = toggle(&pending, "bold", OverrideValue::State(false));
        assert_eq!(lookup(&replaced, "bold"), Some(&OverrideValue::State(false)));
    }

    #[test]
    fn test_unique_and_joinable() {
        let list = [
            Override::state("bold", true),
            Override::css("color", "red"),
            Override::state("bold", false),
        ];
        assert_eq!(
            unique(&list),
            vec![Override::css("color", "red"), Override::state("bold", false)]
        );
        let joined = joinable(&[Override::state("italic", true)], &list);
        assert_eq!(names(&joined), ["italic", "color", "bold"]);
    }

    #[test]
    fn test_map_with_harvest_falls_back_to_computed_color() {
        let (doc, host) = Document::editable(r#"<p style="color: blue"><b>x</b></p>"#).unwrap();
        let text = innermost(&doc, host);
        let table = map_with_harvest(&[Override::state("italic", true)], &doc, &text);
        assert_eq!(table.get("bold"), Some(&OverrideValue::State(true)));
        assert_eq!(table.get("italic"), Some(&OverrideValue::State(true)));
        assert_eq!(table.get("color"), Some(&OverrideValue::Css("blue".into())));

        let (doc, host) = Document::editable("<p><b>x</b></p>").unwrap();
        let text = innermost(&doc, host);
        let table = map_with_harvest(&[], &doc, &text);
        assert_eq!(
            table.get("color"),
            Some(&OverrideValue::Css("rgb(0, 0, 0)".into()))
        );
    }

    #[test]
    fn test_consume_nests_wrappers() {
        let (mut doc, host) = Document::editable("<p>ab</p>").unwrap();
        let p = doc.children(&host)[0];
        let text = doc.children(&p)[0];
        let overrides = [
            Override::state("bold", true),
            Override::css("color", "red"),
            Override::state("underline", false),
            Override::state("italic", true),
            Override::css("font-size", "12px"),
        ];
        let inside = consume(&mut doc, &Boundary::new(text, 1), &overrides);
        insta::assert_snapshot!(
            doc.inner_html(&p),
            @r#"a<b><span style="color: red; font-size: 12px;"><i></i></span></b>b"#
        );
        assert_eq!(doc.node_name(&inside.container), "I");
        assert_eq!(inside.offset, 0);
    }

    #[test]
    fn test_consume_link_and_unknown_states() {
        let (mut doc, host) = Document::editable("<p>ab</p>").unwrap();
        let p = doc.children(&host)[0];
        let text = doc.children(&p)[0];
        let overrides = [
            Override::state("link", true),
            Override::state("blink", true),
            Override::state("bold", true),
        ];
        let inside = consume(&mut doc, &Boundary::new(text, 1), &overrides);
        insta::assert_snapshot!(doc.inner_html(&p), @"a<a><b></b></a>b");
        assert_eq!(doc.node_name(&inside.container), "B");
    }
}
