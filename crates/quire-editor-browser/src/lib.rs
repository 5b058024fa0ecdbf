//! Browser DOM layer for quire.
//!
//! This crate runs the editing core against the live document. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: [`BrowserDom`], the `Dom` implementation over `web_sys::Node`
//! - `carets`: caret measurement with native ranges
//! - `selection`: reading the window selection and watching it change
//! - `platform`: browser detection for selection event quirks
//!
//! # Re-exports
//!
//! This crate re-exports `quire-editor-core` for convenience, so consumers
//! only need to depend on `quire-editor-browser`.

pub use quire_editor_core;
pub use quire_editor_core::*;

pub mod carets;
pub mod dom;
pub mod error;
pub mod platform;
pub mod selection;

pub use carets::{BrowserCaretHost, caret_box, mark_editable};
pub use dom::BrowserDom;
pub use error::PlatformError;
pub use platform::{Platform, platform};
pub use selection::{SelectionGuard, WatchOptions, read_selection, watch_selection};
