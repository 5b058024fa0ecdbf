//! Selection change detection.
//!
//! Hosts disagree on which events follow a selection change and on whether
//! the selection is already updated when they fire. [`SelectionWatcher`]
//! re-reads the selection on a fixed set of events and reports a change only
//! when the boundaries actually moved. Host differences are described by a
//! [`SelectionQuirks`] policy supplied by the adapter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::boundaries::BoundaryPair;

/// Host events after which the selection may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionEvent {
    SelectionChange,
    KeyUp,
    MouseUp,
    TouchEnd,
    KeyPress,
    MouseMove,
}

impl SelectionEvent {
    /// The DOM event type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::SelectionChange => "selectionchange",
            Self::KeyUp => "keyup",
            Self::MouseUp => "mouseup",
            Self::TouchEnd => "touchend",
            Self::KeyPress => "keypress",
            Self::MouseMove => "mousemove",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "selectionchange" => Self::SelectionChange,
            "keyup" => Self::KeyUp,
            "mouseup" => Self::MouseUp,
            "touchend" => Self::TouchEnd,
            "keypress" => Self::KeyPress,
            "mousemove" => Self::MouseMove,
            _ => return None,
        })
    }
}

impl fmt::Display for SelectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a host reports selection changes.
pub trait SelectionQuirks {
    /// Whether the selection read while handling `event` may still be the
    /// old one, so it has to be read again once the event is done.
    fn reports_late(&self, event: SelectionEvent) -> bool;

    /// Whether key presses need watching to catch caret movement.
    fn needs_keypress(&self) -> bool;

    /// Whether mouse moves need watching to catch drag selection.
    fn needs_mousemove(&self) -> bool;
}

/// A host that fires `selectionchange` reliably and updates the selection
/// before its events run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standard;

impl SelectionQuirks for Standard {
    fn reports_late(&self, _event: SelectionEvent) -> bool {
        false
    }

    fn needs_keypress(&self) -> bool {
        false
    }

    fn needs_mousemove(&self) -> bool {
        false
    }
}

/// Events an adapter should listen to.
///
/// `keypress_mousemove` opts into the extra events for hosts whose quirks
/// ask for them.
pub fn watched_events(quirks: &dyn SelectionQuirks, keypress_mousemove: bool) -> Vec<SelectionEvent> {
    let mut events = vec![
        SelectionEvent::SelectionChange,
        SelectionEvent::KeyUp,
        SelectionEvent::MouseUp,
        SelectionEvent::TouchEnd,
    ];
    if keypress_mousemove && quirks.needs_keypress() {
        events.push(SelectionEvent::KeyPress);
        if quirks.needs_mousemove() {
            events.push(SelectionEvent::MouseMove);
        }
    }
    events
}

/// Outcome of observing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// The selection moved; the callback ran.
    Changed,
    /// Nothing moved.
    Unchanged,
    /// Nothing moved yet, but the host reports late for this event. Read
    /// the selection again once the event is done and pass it to
    /// [`SelectionWatcher::recheck`].
    Recheck,
}

/// Called with the new boundaries (`None` once the selection is gone) and
/// the event that revealed the change.
pub type SelectionCallback<N> = Box<dyn FnMut(Option<&BoundaryPair<N>>, SelectionEvent)>;

/// Remembers the last known selection and reports changes to it.
pub struct SelectionWatcher<N> {
    known: Option<BoundaryPair<N>>,
    quirks: Box<dyn SelectionQuirks>,
    callback: SelectionCallback<N>,
}

impl<N: fmt::Debug> fmt::Debug for SelectionWatcher<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionWatcher")
            .field("known", &self.known)
            .finish_non_exhaustive()
    }
}

impl<N: Clone + PartialEq + fmt::Debug> SelectionWatcher<N> {
    pub fn new(
        initial: Option<BoundaryPair<N>>,
        quirks: Box<dyn SelectionQuirks>,
        callback: SelectionCallback<N>,
    ) -> Self {
        Self {
            known: initial,
            quirks,
            callback,
        }
    }

    /// The last selection reported or given at construction.
    pub fn known(&self) -> Option<&BoundaryPair<N>> {
        self.known.as_ref()
    }

    pub fn quirks(&self) -> &dyn SelectionQuirks {
        self.quirks.as_ref()
    }

    /// Compare the selection read after `event` with the last known one.
    pub fn observe(
        &mut self,
        event: SelectionEvent,
        current: Option<BoundaryPair<N>>,
    ) -> Detection {
        self.detect(event, current, false)
    }

    /// Second read scheduled by [`Detection::Recheck`]. Never asks for
    /// another one.
    pub fn recheck(
        &mut self,
        event: SelectionEvent,
        current: Option<BoundaryPair<N>>,
    ) -> Detection {
        self.detect(event, current, true)
    }

    fn detect(
        &mut self,
        event: SelectionEvent,
        current: Option<BoundaryPair<N>>,
        rechecking: bool,
    ) -> Detection {
        if current != self.known {
            tracing::trace!(
                target: "quire::selection",
                %event,
                rechecking,
                selection = ?current,
                "selection changed"
            );
            self.known = current;
            (self.callback)(self.known.as_ref(), event);
            return Detection::Changed;
        }
        if !rechecking && self.quirks.reports_late(event) {
            tracing::trace!(target: "quire::selection", %event, "scheduling recheck");
            return Detection::Recheck;
        }
        Detection::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::boundaries::{Boundary, Range};

    /// Reports mouse-up and key-press selections late, like gecko.
    struct Late;

    impl SelectionQuirks for Late {
        fn reports_late(&self, event: SelectionEvent) -> bool {
            matches!(event, SelectionEvent::MouseUp | SelectionEvent::KeyPress)
        }

        fn needs_keypress(&self) -> bool {
            true
        }

        fn needs_mousemove(&self) -> bool {
            true
        }
    }

    type Log = Rc<RefCell<Vec<(Option<Range<u32>>, SelectionEvent)>>>;

    fn watcher(quirks: Box<dyn SelectionQuirks>) -> (SelectionWatcher<u32>, Log) {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let watcher = SelectionWatcher::new(
            None,
            quirks,
            Box::new(move |pair: Option<&Range<u32>>, event: SelectionEvent| {
                sink.borrow_mut().push((pair.cloned(), event));
            }),
        );
        (watcher, log)
    }

    fn caret(node: u32, offset: usize) -> Option<Range<u32>> {
        Some(Range::collapsed(Boundary::new(node, offset)))
    }

    #[test]
    fn test_identical_mouseups_notify_once() {
        let (mut watcher, log) = watcher(Box::new(Standard));
        assert_eq!(watcher.observe(SelectionEvent::MouseUp, caret(1, 2)), Detection::Changed);
        assert_eq!(watcher.observe(SelectionEvent::MouseUp, caret(1, 2)), Detection::Unchanged);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0], (caret(1, 2), SelectionEvent::MouseUp));
    }

    #[test]
    fn test_late_host_asks_for_one_recheck() {
        let (mut watcher, log) = watcher(Box::new(Late));
        watcher.observe(SelectionEvent::KeyUp, caret(1, 0));
        assert_eq!(watcher.observe(SelectionEvent::MouseUp, caret(1, 0)), Detection::Recheck);
        assert_eq!(watcher.recheck(SelectionEvent::MouseUp, caret(1, 0)), Detection::Unchanged);
        assert_eq!(watcher.observe(SelectionEvent::KeyUp, caret(1, 0)), Detection::Unchanged);

        assert_eq!(watcher.observe(SelectionEvent::MouseUp, caret(1, 0)), Detection::Recheck);
        assert_eq!(watcher.recheck(SelectionEvent::MouseUp, caret(2, 1)), Detection::Changed);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(watcher.known(), caret(2, 1).as_ref());
    }

    #[test]
    fn test_losing_the_selection_is_a_change() {
        let (mut watcher, log) = watcher(Box::new(Standard));
        watcher.observe(SelectionEvent::SelectionChange, caret(3, 1));
        assert_eq!(watcher.observe(SelectionEvent::TouchEnd, None), Detection::Changed);
        assert_eq!(watcher.observe(SelectionEvent::TouchEnd, None), Detection::Unchanged);
        assert_eq!(log.borrow().last(), Some(&(None, SelectionEvent::TouchEnd)));
    }

    #[test]
    fn test_watched_events() {
        let base = watched_events(&Standard, true);
        assert_eq!(base.len(), 4);
        assert_eq!(watched_events(&Late, false), base);
        let names: Vec<_> = watched_events(&Late, true).into_iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            ["selectionchange", "keyup", "mouseup", "touchend", "keypress", "mousemove"]
        );
        assert_eq!(SelectionEvent::from_name("keyup"), Some(SelectionEvent::KeyUp));
        assert_eq!(SelectionEvent::from_name("focus"), None);
    }
}
