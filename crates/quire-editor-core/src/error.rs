//! Error types for editing operations.

use miette::{Diagnostic, NamedSource, SourceSpan};
use smol_str::SmolStr;
use thiserror::Error;

/// Precondition violations of the list engine.
///
/// These indicate a caller bug: the UI layer is expected to check the
/// editable's configuration before asking for a list.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum ListError {
    /// The requested tag is not a list container.
    #[error("`{0}` is not a list container")]
    #[diagnostic(code(quire::lists::not_a_list))]
    NotAList(SmolStr),

    /// The editable's configuration does not allow this list type.
    #[error("list type `{0}` is not allowed in this editable")]
    #[diagnostic(code(quire::lists::not_allowed))]
    NotAllowed(SmolStr),

    /// The content model forbids a list at the insertion point.
    #[error("`{child}` may not be nested inside `{parent}`")]
    #[diagnostic(code(quire::lists::nesting))]
    NestingDisallowed { parent: SmolStr, child: SmolStr },
}

/// Malformed boundary markers in marked-up text.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum MarkerError {
    #[error("end marker `{0}` found before a start marker")]
    #[diagnostic(code(quire::markers::order))]
    EndBeforeStart(char),

    #[error("start marker `{0}` found where an end marker was expected")]
    #[diagnostic(code(quire::markers::order))]
    StartAfterStart(char),

    #[error("more than two boundary markers")]
    #[diagnostic(code(quire::markers::count))]
    TooMany,

    #[error("expected a start and an end marker, found {0}")]
    #[diagnostic(code(quire::markers::count))]
    Missing(usize),
}

/// What went wrong while parsing an HTML fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("unterminated tag")]
    UnterminatedTag,

    #[error("unterminated attribute value")]
    UnterminatedAttribute,

    #[error("invalid tag name")]
    InvalidTagName,

    #[error("unterminated comment")]
    UnterminatedComment,
}

/// Fragment parse error with source location.
#[derive(Error, Debug, Diagnostic)]
#[error("html parse error: {kind}")]
#[diagnostic(code(quire::parse))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    location: SourceSpan,
    #[help]
    advice: Option<String>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, src: &str, offset: usize, len: usize) -> Self {
        let advice = match kind {
            ParseErrorKind::UnterminatedTag => Some("close the tag with `>`".to_string()),
            ParseErrorKind::UnterminatedAttribute => {
                Some("attribute values must end with the quote they start with".to_string())
            }
            ParseErrorKind::UnterminatedComment => Some("close the comment with `-->`".to_string()),
            ParseErrorKind::InvalidTagName => None,
        };
        Self {
            kind,
            src: NamedSource::new("fragment", src.to_string()),
            location: SourceSpan::new(offset.into(), len),
            advice,
        }
    }

    /// Byte offset of the error in the parsed source.
    pub fn offset(&self) -> usize {
        self.location.offset()
    }
}
