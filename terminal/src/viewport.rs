//! Terminal viewport
//!
//! The feed is printed top to bottom, so the last printed post is visible
//! exactly when the user asks to scroll past it.

use std::sync::{Mutex, MutexGuard};

use postwall_feed::domain::entities::FeedItemId;
use postwall_feed::domain::ports::{ViewportSensor, VisibilityCallback};

#[derive(Default)]
pub struct TerminalViewport {
    observed: Mutex<Option<(FeedItemId, VisibilityCallback)>>,
}

impl TerminalViewport {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<(FeedItemId, VisibilityCallback)>> {
        self.observed.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Scroll to the bottom of the feed. Returns false when nothing is observed.
    pub fn scroll_to_bottom(&self) -> bool {
        match self.slot().as_ref() {
            Some((id, on_visibility)) => {
                tracing::debug!(sentinel = %id, "Sentinel scrolled into view");
                on_visibility(true);
                true
            }
            None => false,
        }
    }
}

impl ViewportSensor for TerminalViewport {
    fn observe(&self, target: &FeedItemId, on_visibility: VisibilityCallback) {
        *self.slot() = Some((target.clone(), on_visibility));
    }

    fn disconnect(&self) {
        *self.slot() = None;
    }
}
