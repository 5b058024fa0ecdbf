//! Caret geometry from the browser's layout.

use quire_editor_core::carets::{self, BR_STYLE_FIX, CaretHost, EDITABLE_CLASS, OffsetBox, Rect};
use quire_editor_core::Boundary;
use wasm_bindgen::JsCast;
use web_sys::{DomRect, Element, HtmlElement, Node};

use crate::dom::{BrowserDom, native_offset};
use crate::error::PlatformError;

/// Id of the `<style>` element holding the br fix.
pub const BR_STYLE_FIX_ID: &str = "quire-br-style-fix";

/// Measures carets with native ranges and element boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserCaretHost;

fn rect(native: &DomRect) -> Rect {
    Rect {
        top: native.top(),
        left: native.left(),
        width: native.width(),
        height: native.height(),
    }
}

impl CaretHost<BrowserDom> for BrowserCaretHost {
    fn range_rect(
        &self,
        dom: &BrowserDom,
        start: &Boundary<Node>,
        end: &Boundary<Node>,
    ) -> Option<Rect> {
        let range = dom.document().create_range().ok()?;
        range.set_start(&start.container, native_offset(start)).ok()?;
        range.set_end(&end.container, native_offset(end)).ok()?;
        Some(rect(&range.get_bounding_client_rect()))
    }

    fn node_rect(&self, _dom: &BrowserDom, node: &Node) -> Option<Rect> {
        let element = node.dyn_ref::<Element>()?;
        Some(rect(&element.get_bounding_client_rect()))
    }

    fn offset_box(&self, _dom: &BrowserDom, element: &Node) -> OffsetBox {
        match element.dyn_ref::<HtmlElement>() {
            Some(element) => OffsetBox {
                top: f64::from(element.offset_top()),
                left: f64::from(element.offset_left()),
                width: f64::from(element.offset_width()),
            },
            None => OffsetBox::default(),
        }
    }

    fn scroll(&self) -> (f64, f64) {
        let Some(window) = web_sys::window() else {
            return (0.0, 0.0);
        };
        (
            window.scroll_x().unwrap_or_default(),
            window.scroll_y().unwrap_or_default(),
        )
    }

    fn ensure_br_style_fix(&self) {
        if let Err(err) = install_br_style_fix() {
            tracing::warn!(target: "quire::carets", %err, "could not install br style fix");
        }
    }
}

fn install_br_style_fix() -> Result<(), PlatformError> {
    let window = web_sys::window().ok_or(PlatformError::NoWindow)?;
    let document = window.document().ok_or(PlatformError::NoDocument)?;
    if document.get_element_by_id(BR_STYLE_FIX_ID).is_some() {
        return Ok(());
    }
    let head = document.head().ok_or(PlatformError::NoDocument)?;
    let style = document
        .create_element("style")
        .map_err(|e| PlatformError::js("create_element", e))?;
    style.set_id(BR_STYLE_FIX_ID);
    style.set_text_content(Some(BR_STYLE_FIX));
    head.append_child(&style)
        .map_err(|e| PlatformError::js("append_child", e))?;
    tracing::debug!(target: "quire::carets", "installed br style fix");
    Ok(())
}

/// Scope the br fix to `element`.
pub fn mark_editable(element: &Element) -> Result<(), PlatformError> {
    element
        .class_list()
        .add_1(EDITABLE_CLASS)
        .map_err(|e| PlatformError::js("classList.add", e))
}

/// Caret box for `start..end` in document coordinates.
pub fn caret_box(dom: &BrowserDom, start: &Boundary<Node>, end: &Boundary<Node>) -> Rect {
    carets::box_for(&BrowserCaretHost, dom, start, end)
}
