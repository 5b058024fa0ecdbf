//! Native selection reading and change watching.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use quire_editor_core::selection_change::{SelectionWatcher, watched_events};
use quire_editor_core::{BoundaryPair, Detection, Range, SelectionEvent};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, Node};

use crate::dom::{BrowserDom, boundary_from_native};
use crate::error::PlatformError;
use crate::platform::platform;

/// Options for [`watch_selection`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Also listen to `keypress` and `mousemove` where the browser needs
    /// them to catch every caret move.
    pub keypress_mousemove: bool,
}

/// The window selection as boundaries, or `None` when there is no range or
/// it is not inside `editable`.
pub fn read_selection(
    dom: &BrowserDom,
    editable: &Node,
) -> Result<Option<BoundaryPair<Node>>, PlatformError> {
    let window = dom.document().default_view().ok_or(PlatformError::NoWindow)?;
    let selection = window
        .get_selection()
        .map_err(|e| PlatformError::js("get_selection", e))?
        .ok_or(PlatformError::NoSelection)?;
    if selection.range_count() == 0 {
        return Ok(None);
    }
    let range = selection
        .get_range_at(0)
        .map_err(|e| PlatformError::js("get_range_at", e))?;
    let start = range
        .start_container()
        .map_err(|e| PlatformError::js("start_container", e))?;
    let end = range
        .end_container()
        .map_err(|e| PlatformError::js("end_container", e))?;
    if !editable.contains(Some(&start)) || !editable.contains(Some(&end)) {
        return Ok(None);
    }
    let start_offset = range
        .start_offset()
        .map_err(|e| PlatformError::js("start_offset", e))?;
    let end_offset = range
        .end_offset()
        .map_err(|e| PlatformError::js("end_offset", e))?;
    Ok(Some(Range {
        start: boundary_from_native(start, start_offset),
        end: boundary_from_native(end, end_offset),
    }))
}

struct Watch {
    dom: BrowserDom,
    editable: Node,
    watcher: RefCell<SelectionWatcher<Node>>,
}

impl Watch {
    fn read(&self) -> Option<Option<BoundaryPair<Node>>> {
        match read_selection(&self.dom, &self.editable) {
            Ok(selection) => Some(selection),
            Err(err) => {
                tracing::warn!(target: "quire::selection", %err, "could not read selection");
                None
            }
        }
    }

    fn with_watcher(&self, f: impl FnOnce(&mut SelectionWatcher<Node>) -> Detection) -> Detection {
        match self.watcher.try_borrow_mut() {
            Ok(mut watcher) => f(&mut watcher),
            // An event dispatched from inside the callback.
            Err(_) => Detection::Unchanged,
        }
    }
}

fn handle(watch: &Rc<Watch>, event: SelectionEvent) {
    let Some(current) = watch.read() else {
        return;
    };
    if watch.with_watcher(|w| w.observe(event, current)) == Detection::Recheck {
        schedule_recheck(watch, event);
    }
}

/// Read the selection again once the current event has finished.
fn schedule_recheck(watch: &Rc<Watch>, event: SelectionEvent) {
    let watch = Rc::clone(watch);
    let tick = JsFuture::from(js_sys::Promise::resolve(&JsValue::UNDEFINED));
    wasm_bindgen_futures::spawn_local(async move {
        let _ = tick.await;
        if let Some(current) = watch.read() {
            watch.with_watcher(|w| w.recheck(event, current));
        }
    });
}

/// Stops watching when dropped.
#[must_use = "the selection is only watched while the guard is alive"]
pub struct SelectionGuard {
    _listeners: Vec<EventListener>,
}

impl std::fmt::Debug for SelectionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionGuard")
            .field("listeners", &self._listeners.len())
            .finish()
    }
}

/// Call `callback` whenever the selection inside `editable` changes.
///
/// Listeners are registered on `document` in the capture phase so handlers
/// that stop propagation do not hide selection changes.
pub fn watch_selection<F>(
    document: &web_sys::Document,
    editable: &Element,
    options: WatchOptions,
    callback: F,
) -> Result<SelectionGuard, PlatformError>
where
    F: FnMut(Option<&BoundaryPair<Node>>, SelectionEvent) + 'static,
{
    let dom = BrowserDom::new(document.clone());
    let editable: Node = editable.clone().into();
    let quirks = platform().clone();
    let events = watched_events(&quirks, options.keypress_mousemove);
    let initial = read_selection(&dom, &editable)?;
    let watch = Rc::new(Watch {
        dom,
        editable,
        watcher: RefCell::new(SelectionWatcher::new(
            initial,
            Box::new(quirks),
            Box::new(callback),
        )),
    });

    tracing::debug!(target: "quire::selection", ?events, "watching selection");
    let listeners = events
        .into_iter()
        .map(|event| {
            let watch = Rc::clone(&watch);
            EventListener::new_with_options(
                document,
                event.name(),
                EventListenerOptions::run_in_capture_phase(),
                move |_| handle(&watch, event),
            )
        })
        .collect();
    Ok(SelectionGuard {
        _listeners: listeners,
    })
}
