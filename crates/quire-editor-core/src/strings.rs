//! Character classes used by the rendering rules.

/// Whitespace that CSS collapses under `white-space: normal`.
pub fn is_collapsible_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{c}')
}

pub fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}')
}

pub fn is_non_breaking_space(c: char) -> bool {
    matches!(c, '\u{a0}' | '\u{202f}')
}

/// Whether `text` holds nothing but collapsible whitespace.
pub fn is_collapsible_run(text: &str) -> bool {
    text.chars().all(is_collapsible_space)
}

/// Whether `text` has a character that renders no matter how whitespace
/// collapses around it.
pub fn has_visible_char(text: &str) -> bool {
    text.chars()
        .any(|c| !is_collapsible_space(c) && !is_zero_width(c))
}
