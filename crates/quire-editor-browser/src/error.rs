//! Errors raised while talking to the browser.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PlatformError {
    #[error("no window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    #[error("window has no selection object")]
    NoSelection,

    #[error("{operation} failed: {message}")]
    Js {
        operation: &'static str,
        message: String,
    },
}

impl PlatformError {
    pub(crate) fn js(operation: &'static str, value: JsValue) -> Self {
        Self::Js {
            operation,
            message: format!("{value:?}"),
        }
    }
}
