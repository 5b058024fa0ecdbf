//! Style-derived node classification.

use crate::dom::{Dom, NodeType};
use crate::nodes::{is_block_node, LIST_ITEMS};

/// Elements that break lines without being blocks.
pub const LINE_BREAKING_VOID_ELEMENTS: &[&str] = &["BR", "HR", "IMG"];

/// `display` values that keep an element in the inline flow.
const NON_BLOCK_DISPLAY: &[&str] = &["inline", "inline-block", "inline-table", "none"];

const NOT_INHERITED: &[&str] = &["background-color", "text-decoration"];

/// Whether `node` renders as a block.
///
/// Documents and fragments always do. Elements do unless their resolved
/// `display` keeps them inline; hosts that cannot resolve styles fall back
/// to the tag name.
pub fn has_block_style<D: Dom>(dom: &D, node: &D::Node) -> bool {
    match dom.node_type(node) {
        NodeType::Document | NodeType::DocumentFragment => true,
        NodeType::Element => match dom.computed_style(node, "display") {
            Some(display) => !NON_BLOCK_DISPLAY.contains(&display.trim()),
            None => is_block_node(dom, node),
        },
        _ => false,
    }
}

pub fn has_inline_style<D: Dom>(dom: &D, node: &D::Node) -> bool {
    !has_block_style(dom, node)
}

/// Whether rendering `node` forces a line break: blocks, list items and
/// the line-breaking void elements.
pub fn has_linebreaking_style<D: Dom>(dom: &D, node: &D::Node) -> bool {
    let name = dom.node_name(node);
    LINE_BREAKING_VOID_ELEMENTS.contains(&name.as_str())
        || LIST_ITEMS.contains(&name.as_str())
        || has_block_style(dom, node)
}

/// Whether a `white-space` value preserves whitespace runs.
pub fn is_white_space_preserve_style(value: &str) -> bool {
    matches!(value, "pre" | "pre-wrap" | "-moz-pre-wrap" | "break-spaces")
}

pub fn is_style_inherited(property: &str) -> bool {
    !NOT_INHERITED.contains(&property)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_block_and_linebreaking() {
        let (mut doc, host) =
            Document::editable("<p>a</p><b>b</b><br><li>c</li><span>d</span>").unwrap();
        let kids = doc.children(&host);
        assert!(has_block_style(&doc, &kids[0]));
        assert!(has_inline_style(&doc, &kids[1]));
        assert!(has_linebreaking_style(&doc, &kids[2]));
        assert!(!has_block_style(&doc, &kids[2]));
        assert!(has_linebreaking_style(&doc, &kids[3]));
        assert!(!has_linebreaking_style(&doc, &kids[4]));

        doc.set_inline_style(&kids[4], "display", "block");
        assert!(has_linebreaking_style(&doc, &kids[4]));
        doc.set_inline_style(&kids[0], "display", "inline-block");
        assert!(!has_block_style(&doc, &kids[0]));

        let text = doc.children(&kids[1])[0];
        assert!(!has_block_style(&doc, &text));
        assert!(has_block_style(&doc, &doc.root()));
    }

    #[test]
    fn test_white_space_values() {
        assert!(is_white_space_preserve_style("pre"));
        assert!(is_white_space_preserve_style("pre-wrap"));
        assert!(!is_white_space_preserve_style("pre-line"));
        assert!(!is_white_space_preserve_style("normal"));
        assert!(!is_style_inherited("background-color"));
        assert!(is_style_inherited("color"));
    }
}
