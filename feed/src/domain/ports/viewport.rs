//! Viewport port
//!
//! Abstracts an element visibility observer (an intersection observer in a
//! browser, the bottom of the scrollback in a terminal).

use crate::domain::entities::FeedItemId;

/// Called with `true` when the observed element enters the viewport and
/// `false` when it leaves.
pub type VisibilityCallback = Box<dyn Fn(bool) + Send + Sync>;

/// Observes a single element at a time
pub trait ViewportSensor: Send + Sync {
    /// Start observing `target`, replacing any previous observation
    fn observe(&self, target: &FeedItemId, on_visibility: VisibilityCallback);

    /// Stop observing. Must be safe to call when nothing is observed.
    fn disconnect(&self);
}
