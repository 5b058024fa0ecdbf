//! HTML fragment parsing and serialization for the arena [`Document`].
//!
//! The parser is small: tags are matched by name on a stack of
//! open elements, void elements never take children, unmatched end tags are
//! dropped and there are no implied end tags. That is enough for editable
//! content produced by the engine itself and for test fixtures.
//!
//! Known limitations:
//! - Tag and attribute names are restricted to ASCII `[A-Za-z0-9:_-]`.
//! - Only `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;` and
//!   semicolon-terminated numeric references are decoded.

use crate::document::{Document, NodeId};
use crate::dom::{Dom, NodeType};
use crate::error::{ParseError, ParseErrorKind};
use crate::nodes::is_void_name;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'-')
}

/// Decode the supported subset of character references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';').filter(|semi| *semi <= 12) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let name = &rest[1..semi];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => name.strip_prefix('#').and_then(|num| {
                let code = match num.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, kind: ParseErrorKind, at: usize) -> ParseError {
        ParseError::new(kind, self.src, at, self.pos.saturating_sub(at).max(1))
    }

    fn name(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn attribute_value(&mut self, tag_start: usize) -> Result<String, ParseError> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                let start = self.pos;
                self.pos += 1;
                let Some(len) = self.src[self.pos..].find(quote as char) else {
                    return Err(self.error(ParseErrorKind::UnterminatedAttribute, start));
                };
                let value = decode_entities(&self.src[self.pos..self.pos + len]);
                self.pos += len + 1;
                Ok(value)
            }
            Some(_) => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| !b.is_ascii_whitespace() && b != b'>')
                {
                    self.pos += 1;
                }
                Ok(decode_entities(&self.src[start..self.pos]))
            }
            None => Err(self.error(ParseErrorKind::UnterminatedTag, tag_start)),
        }
    }

    /// Parse a start tag after its `<`. Returns the name, attributes and
    /// whether it was self-closed.
    #[allow(clippy::type_complexity)]
    fn start_tag(
        &mut self,
        tag_start: usize,
    ) -> Result<(&'a str, Vec<(&'a str, String)>, bool), ParseError> {
        let name = self.name();
        if name.is_empty() || !name.as_bytes()[0].is_ascii_alphabetic() {
            return Err(self.error(ParseErrorKind::InvalidTagName, tag_start));
        }
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnterminatedTag, tag_start)),
                Some(b'>') => {
                    self.pos += 1;
                    return Ok((name, attrs, false));
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek() == Some(b'>') {
                        self.pos += 1;
                        return Ok((name, attrs, true));
                    }
                }
                Some(_) => {
                    let attr = self.name();
                    if attr.is_empty() {
                        // Skip a byte we can't make sense of rather than loop forever.
                        self.pos += self.src[self.pos..]
                            .chars()
                            .next()
                            .map_or(1, char::len_utf8);
                        continue;
                    }
                    self.skip_whitespace();
                    let value = if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.attribute_value(tag_start)?
                    } else {
                        String::new()
                    };
                    attrs.push((attr, value));
                }
            }
        }
    }
}

impl Document {
    /// Parse `html` into a new detached document fragment.
    pub fn parse_fragment(&mut self, html: &str) -> Result<NodeId, ParseError> {
        let fragment = self.create_fragment();
        self.parse_into(&fragment, html)?;
        Ok(fragment)
    }

    /// Parse `html` and append the result to `parent`.
    pub fn parse_into(&mut self, parent: &NodeId, html: &str) -> Result<(), ParseError> {
        let mut parser = Parser { src: html, pos: 0 };
        let mut open: Vec<NodeId> = vec![*parent];

        while parser.pos < html.len() {
            let current = open.last().copied().unwrap_or(*parent);
            let rest = &html[parser.pos..];

            if !rest.starts_with('<') {
                let len = rest.find('<').unwrap_or(rest.len());
                let text = decode_entities(&rest[..len]);
                let node = self.create_text(&text);
                self.append(&current, &node);
                parser.pos += len;
                continue;
            }

            if rest.starts_with(COMMENT_START) {
                let start = parser.pos;
                let body = &rest[COMMENT_START.len()..];
                let Some(end) = body.find(COMMENT_END) else {
                    parser.pos = html.len();
                    return Err(parser.error(ParseErrorKind::UnterminatedComment, start));
                };
                let comment = self.create_comment(&body[..end]);
                self.append(&current, &comment);
                parser.pos += COMMENT_START.len() + end + COMMENT_END.len();
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                // Doctypes and processing instructions carry nothing we edit.
                let start = parser.pos;
                let Some(end) = rest.find('>') else {
                    parser.pos = html.len();
                    return Err(parser.error(ParseErrorKind::UnterminatedTag, start));
                };
                parser.pos += end + 1;
                continue;
            }

            if let Some(after) = rest.strip_prefix("</") {
                let start = parser.pos;
                let Some(end) = after.find('>') else {
                    parser.pos = html.len();
                    return Err(parser.error(ParseErrorKind::UnterminatedTag, start));
                };
                let name = after[..end].trim().to_ascii_uppercase();
                parser.pos += 2 + end + 1;
                if let Some(index) = open
                    .iter()
                    .skip(1)
                    .rposition(|n| self.node_name(n) == name.as_str())
                {
                    open.truncate(index + 1);
                } else {
                    tracing::trace!(target: "quire::parse", %name, "dropping unmatched end tag");
                }
                continue;
            }

            let tag_start = parser.pos;
            parser.pos += 1;
            if !parser.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
                // A lone `<` is text.
                let node = self.create_text("<");
                self.append(&current, &node);
                continue;
            }
            let (name, attrs, self_closing) = parser.start_tag(tag_start)?;
            let element = self.create_element(name);
            for (attr, value) in attrs {
                self.set_attribute(&element, attr, &value);
            }
            self.append(&current, &element);

            let upper = self.node_name(&element);
            if matches!(upper.as_str(), "SCRIPT" | "STYLE") && !self_closing {
                let body = &html[parser.pos..];
                let close = format!("</{}", name.to_ascii_lowercase());
                let end = body.to_ascii_lowercase().find(&close).unwrap_or(body.len());
                if end > 0 {
                    let text = self.create_text(&body[..end]);
                    self.append(&element, &text);
                }
                parser.pos += end;
                if let Some(gt) = html[parser.pos..].find('>') {
                    parser.pos += gt + 1;
                }
                continue;
            }
            if !self_closing && !is_void_name(&upper) {
                open.push(element);
            }
        }
        Ok(())
    }

    /// Parse a complete document body.
    pub fn from_html(html: &str) -> Result<Self, ParseError> {
        let mut doc = Self::new();
        let root = doc.root();
        doc.parse_into(&root, html)?;
        Ok(doc)
    }

    /// Build a document holding a single editing host with `html` as its
    /// content. Returns the document and the host element.
    pub fn editable(html: &str) -> Result<(Self, NodeId), ParseError> {
        let mut doc = Self::new();
        let root = doc.root();
        let host = doc.create_element("div");
        doc.set_attribute(&host, "contenteditable", "true");
        doc.append(&root, &host);
        doc.parse_into(&host, html)?;
        Ok((doc, host))
    }

    /// Serialize the children of `node`.
    pub fn inner_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        for child in self.child_ids(*node) {
            self.serialize(child, &mut out);
        }
        out
    }

    /// Serialize `node` itself and its subtree.
    pub fn outer_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.serialize(node, &mut out);
        out
    }

    fn serialize(&self, node: &NodeId, out: &mut String) {
        match self.node_type(node) {
            NodeType::Text => {
                let text = self.text(node).unwrap_or_default();
                let raw = self
                    .parent(node)
                    .is_some_and(|p| matches!(self.node_name(&p).as_str(), "SCRIPT" | "STYLE"));
                if raw {
                    out.push_str(&text);
                } else {
                    escape_text(&text, out);
                }
            }
            NodeType::Comment => {
                out.push_str(COMMENT_START);
                out.push_str(&self.text(node).unwrap_or_default());
                out.push_str(COMMENT_END);
            }
            NodeType::Element => {
                let name = self.node_name(node).to_ascii_lowercase();
                out.push('<');
                out.push_str(&name);
                for (attr, value) in self.attributes(*node) {
                    out.push(' ');
                    out.push_str(attr);
                    out.push_str("=\"");
                    escape_attribute(value, out);
                    out.push('"');
                }
                out.push('>');
                if is_void_name(&self.node_name(node)) {
                    return;
                }
                for child in self.child_ids(*node) {
                    self.serialize(child, out);
                }
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
            NodeType::Document | NodeType::DocumentFragment | NodeType::Other => {
                for child in self.child_ids(*node) {
                    self.serialize(child, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_simple_markup() {
        let html = r#"<p class="x">one <b>two</b><br>three</p><!-- note -->"#;
        let doc = Document::from_html(html).unwrap();
        assert_eq!(doc.inner_html(&doc.root()), html);
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let doc = Document::from_html("<p>a<br>b<img src=x.png>c</p>").unwrap();
        let p = doc.child_ids(doc.root())[0];
        assert_eq!(doc.child_ids(p).len(), 5);
    }

    #[test]
    fn test_entities_decode_and_escape() {
        let doc = Document::from_html("<p>a&nbsp;&amp;&lt;b&#x41;&#66;&bogus;</p>").unwrap();
        let p = doc.child_ids(doc.root())[0];
        let text = doc.child_ids(p)[0];
        assert_eq!(doc.text(&text).as_deref(), Some("a\u{a0}&<bAB&bogus;"));
        assert_eq!(doc.inner_html(&p), "a&nbsp;&amp;&lt;bAB&amp;bogus;");
    }

    #[test]
    fn test_unmatched_end_tags_are_dropped() {
        let doc = Document::from_html("<div><p>x</span></p></div>").unwrap();
        assert_eq!(doc.inner_html(&doc.root()), "<div><p>x</p></div>");
    }

    #[test]
    fn test_unclosed_elements_close_at_end() {
        let doc = Document::from_html("<ul><li>one<li>two").unwrap();
        assert_eq!(
            doc.inner_html(&doc.root()),
            "<ul><li>one<li>two</li></li></ul>"
        );
    }

    #[test]
    fn test_editable_wraps_host() {
        let (doc, host) = Document::editable("<p>x</p>").unwrap();
        assert_eq!(
            doc.outer_html(&host),
            r#"<div contenteditable="true"><p>x</p></div>"#
        );
    }

    #[test]
    fn test_unterminated_tag_reports_location() {
        let err = Document::from_html("<p>ok</p><b class=\"x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedAttribute);
        assert_eq!(err.offset(), 18);
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let doc = Document::from_html("a < b").unwrap();
        assert_eq!(doc.inner_html(&doc.root()), "a &lt; b");
    }
}
