//! Per-editable configuration.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::dom::Dom;
use crate::nodes::is_element_node;

/// Settings for one editable region.
///
/// Deserializes from a partial document; anything left out keeps its
/// default.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct EditableConfig {
    /// List containers the editable may create, lower-case.
    pub list_types: Vec<SmolStr>,

    /// Format states the editable accepts as overrides.
    pub formats: Vec<SmolStr>,

    /// Element used for new lines created by breaking a line.
    pub default_block: SmolStr,

    /// Attribute marking embedded widgets whose content is never edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opaque_attribute: Option<SmolStr>,
}

impl Default for EditableConfig {
    fn default() -> Self {
        Self {
            list_types: vec![SmolStr::new_static("ul"), SmolStr::new_static("ol")],
            formats: [
                "bold",
                "italic",
                "underline",
                "strikethrough",
                "subscript",
                "superscript",
                "link",
            ]
            .into_iter()
            .map(SmolStr::new_static)
            .collect(),
            default_block: SmolStr::new_static("div"),
            opaque_attribute: None,
        }
    }
}

impl EditableConfig {
    pub fn allows_list(&self, name: &str) -> bool {
        self.list_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(name))
    }

    pub fn allows_format(&self, name: &str) -> bool {
        self.formats.iter().any(|allowed| allowed == name)
    }

    /// Whether `node` carries the configured opaque marker attribute.
    pub fn is_opaque<D: Dom>(&self, dom: &D, node: &D::Node) -> bool {
        let Some(attribute) = &self.opaque_attribute else {
            return false;
        };
        is_element_node(dom, node) && dom.attribute(node, attribute).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EditableConfig =
            serde_json::from_str(r#"{"default_block": "p", "opaque_attribute": "data-widget"}"#)
                .unwrap();
        assert_eq!(config.default_block, "p");
        assert!(config.allows_list("UL"));
        assert!(!config.allows_list("dl"));
        assert!(config.allows_format("bold"));

        let (doc, host) =
            Document::editable(r#"<div data-widget="">x</div><div>y</div>"#).unwrap();
        let kids = doc.children(&host);
        assert!(config.is_opaque(&doc, &kids[0]));
        assert!(!config.is_opaque(&doc, &kids[1]));
        assert!(!EditableConfig::default().is_opaque(&doc, &kids[0]));
    }
}
