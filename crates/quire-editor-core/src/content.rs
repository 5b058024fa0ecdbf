//! HTML content model.
//!
//! Which elements may appear as direct children of which, following the
//! HTML element index. Categories are written as `_FLOW_`, `_PHRASING_` and
//! so on to keep them apart from tag names.

const FLOW: &str = "_FLOW_";
const PHRASING: &str = "_PHRASING_";
const EMPTY: &str = "_EMPTY_";
const TEXT: &str = "#TEXT";

/// What an element accepts as children.
enum Allowed {
    /// A single category or tag name.
    One(&'static str),
    /// Any of several categories or tag names.
    Any(&'static [&'static str]),
}

fn allowed_children(outer: &str) -> Option<Allowed> {
    use Allowed::{Any, One};
    let allowed = match outer {
        "A" | "ABBR" | "B" | "BDI" | "BDO" | "BLOCKQUOTE" | "BUTTON" | "CANVAS" | "CITE"
        | "CODE" | "DEL" | "DT" | "EM" | "FONT" | "H1" | "H2" | "H3" | "H4" | "H5" | "H6"
        | "I" | "INS" | "KBD" | "LABEL" | "LEGEND" | "MARK" | "METER" | "NOSCRIPT" | "OUTPUT"
        | "P" | "PRE" | "PROGRESS" | "Q" | "RP" | "RT" | "S" | "SAMP" | "SMALL" | "SPAN"
        | "STRONG" | "STYLE" | "SUB" | "SUMMARY" | "SUP" | "TH" | "TIME" | "U" | "VAR" => {
            One(PHRASING)
        }
        "ADDRESS" | "ARTICLE" | "ASIDE" | "BODY" | "CAPTION" | "DD" | "DIV" | "DFN"
        | "FIGCAPTION" | "FOOTER" | "FORM" | "HEADER" | "LI" | "MAIN" | "NAV" | "SECTION"
        | "TD" | "#DOCUMENT-FRAGMENT" => One(FLOW),
        "AREA" | "BASE" | "BR" | "COL" | "COMMAND" | "EMBED" | "HR" | "IMG" | "INPUT"
        | "KEYGEN" | "LINK" | "META" | "PARAM" | "SOURCE" | "TRACK" | "WBR" => One(EMPTY),
        "AUDIO" | "VIDEO" => One("SOURCE"),
        "COLGROUP" => One("COL"),
        "MAP" => One("AREA"),
        "OBJECT" => One("PARAM"),
        "OL" | "UL" => One("LI"),
        "OPTGROUP" => One("OPTION"),
        "TBODY" | "TFOOT" | "THEAD" => One("TR"),
        "IFRAME" | "OPTION" | "TEXTAREA" | "TITLE" => One(TEXT),
        "DATALIST" => Any(&[PHRASING, "OPTION"]),
        "DETAILS" => Any(&["SUMMARY", FLOW]),
        "DL" => Any(&["DT", "DD"]),
        "FIELDSET" => Any(&["LEGEND", FLOW]),
        "FIGURE" => Any(&["FIGCAPTION", FLOW]),
        "HGROUP" => Any(&["H1", "H2", "H3", "H4", "H5", "H6"]),
        "MENU" => Any(&["LI", FLOW]),
        "RUBY" => Any(&[PHRASING, "RT", "RP"]),
        "SELECT" => Any(&["OPTION", "OPTGROUP"]),
        "TABLE" => Any(&["CAPTION", "COLGROUP", "THEAD", "TBODY", "TFOOT", "TR"]),
        "TR" => Any(&["TH", "TD"]),
        _ => return None,
    };
    Some(allowed)
}

/// Content categories an element (or text) belongs to.
fn categories(inner: &str) -> &'static [&'static str] {
    const FLOW_PHRASING: &[&str] = &[FLOW, PHRASING];
    match inner {
        "#TEXT" | "A" | "ABBR" | "AREA" | "AUDIO" | "B" | "BDI" | "BDO" | "BR" | "BUTTON"
        | "CANVAS" | "CITE" | "CODE" | "DATALIST" | "DEL" | "DFN" | "EM" | "EMBED" | "FONT"
        | "I" | "IFRAME" | "IMG" | "INPUT" | "INS" | "KBD" | "KEYGEN" | "LABEL" | "LINK"
        | "MAP" | "MARK" | "META" | "METER" | "NOSCRIPT" | "OBJECT" | "OUTPUT" | "PROGRESS"
        | "Q" | "RUBY" | "S" | "SAMP" | "SCRIPT" | "SELECT" | "SMALL" | "SPAN" | "STRONG"
        | "SUB" | "SUP" | "TEXTAREA" | "TIME" | "U" | "VAR" | "VIDEO" | "WBR" => FLOW_PHRASING,
        "ADDRESS" | "ARTICLE" | "ASIDE" | "BLOCKQUOTE" | "DETAILS" | "DIV" | "DL"
        | "FIELDSET" | "FIGURE" | "FOOTER" | "FORM" | "H1" | "H2" | "H3" | "H4" | "H5" | "H6"
        | "HEADER" | "HGROUP" | "HR" | "MAIN" | "MENU" | "NAV" | "OL" | "P" | "PRE"
        | "SECTION" | "TABLE" | "UL" => &[FLOW],
        _ => &[],
    }
}

/// Whether an element named `outer` may hold an element (or `#text`) named
/// `inner` as a direct child. Names are compared case-insensitively.
pub fn allows_nesting(outer: &str, inner: &str) -> bool {
    let outer = outer.to_ascii_uppercase();
    let inner = inner.to_ascii_uppercase();
    let Some(allowed) = allowed_children(&outer) else {
        return false;
    };
    let accepts = |entry: &str| entry == inner || categories(&inner).contains(&entry);
    match allowed {
        Allowed::One(entry) => accepts(entry),
        Allowed::Any(entries) => entries.iter().any(|entry| accepts(entry)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_nest_in_flow_content() {
        assert!(allows_nesting("div", "ul"));
        assert!(allows_nesting("LI", "OL"));
        assert!(allows_nesting("#document-fragment", "ul"));
        assert!(!allows_nesting("p", "ul"));
        assert!(!allows_nesting("h1", "ol"));
        assert!(!allows_nesting("span", "ul"));
    }

    #[test]
    fn test_fixed_children() {
        assert!(allows_nesting("ul", "li"));
        assert!(!allows_nesting("ul", "p"));
        assert!(allows_nesting("dl", "dd"));
        assert!(allows_nesting("tr", "td"));
        assert!(allows_nesting("menu", "li"));
        assert!(allows_nesting("menu", "p"));
    }

    #[test]
    fn test_phrasing_and_empty() {
        assert!(allows_nesting("p", "b"));
        assert!(allows_nesting("p", "#text"));
        assert!(allows_nesting("b", "img"));
        assert!(!allows_nesting("br", "b"));
        assert!(!allows_nesting("blink", "b"));
    }
}
