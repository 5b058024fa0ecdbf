//! Browser detection for selection quirks.

use std::sync::OnceLock;

use quire_editor_core::{SelectionEvent, SelectionQuirks};

/// Cached platform detection results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    pub gecko: bool,
    pub webkit: bool,
    pub msie: bool,
}

impl Platform {
    /// Detect the engine from a user agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let user_agent = user_agent.to_lowercase();
        Platform {
            gecko: user_agent.contains("gecko/") && !user_agent.contains("like gecko"),
            webkit: user_agent.contains("applewebkit"),
            msie: user_agent.contains("trident/") || user_agent.contains("msie "),
        }
    }
}

impl SelectionQuirks for Platform {
    /// Gecko runs mouseup and keypress handlers before the selection moves.
    fn reports_late(&self, event: SelectionEvent) -> bool {
        self.gecko && matches!(event, SelectionEvent::MouseUp | SelectionEvent::KeyPress)
    }

    fn needs_keypress(&self) -> bool {
        !self.webkit
    }

    fn needs_mousemove(&self) -> bool {
        !self.webkit && !self.msie
    }
}

static PLATFORM: OnceLock<Platform> = OnceLock::new();

/// Get cached platform info. Detection runs once on first call.
pub fn platform() -> &'static Platform {
    PLATFORM.get_or_init(detect_platform)
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn detect_platform() -> Platform {
    let Some(window) = web_sys::window() else {
        return Platform::default();
    };
    Platform::from_user_agent(&window.navigator().user_agent().unwrap_or_default())
}

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
fn detect_platform() -> Platform {
    Platform::default()
}
