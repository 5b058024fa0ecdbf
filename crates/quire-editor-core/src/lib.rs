//! quire-editor-core: boundary-based rich-text editing, generic over a DOM.
//!
//! This crate provides:
//! - [`Dom`] trait for host document access, with [`Document`] as an
//!   in-memory implementation
//! - [`Boundary`] positions and raw and visual traversal over them
//! - rendering classification: what a browser shows and what collapses
//! - structural edits: line breaks, list formatting, inline overrides
//! - caret geometry over a [`carets::CaretHost`]
//! - selection change detection independent of host event quirks

pub mod boundaries;
pub mod breaking;
pub mod carets;
pub mod config;
pub mod content;
pub mod cursor;
pub mod document;
pub mod dom;
pub mod elements;
pub mod error;
pub mod lists;
pub mod markers;
pub mod mutation;
pub mod nodes;
pub mod overrides;
pub mod parse;
pub mod selection_change;
pub mod strings;
pub mod styles;
pub mod traversal;
pub mod traversing;

pub use boundaries::{Boundary, BoundaryPair, Range};
pub use carets::{CaretHost, Rect};
pub use config::EditableConfig;
pub use document::{Document, NodeId};
pub use dom::{Dom, NodeType};
pub use error::{ListError, MarkerError, ParseError};
pub use overrides::{Override, OverrideValue};
pub use selection_change::{Detection, SelectionEvent, SelectionQuirks, SelectionWatcher};
pub use smol_str::SmolStr;
