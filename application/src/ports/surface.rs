//! Response surface port
//!
//! The display target for exactly one answer at a time. Every `update`
//! replaces the whole answer body; implementations may diff internally as
//! long as the visible result is identical.

pub trait ResponseSurface: Send + Sync {
    /// A new answer region starts.
    fn begin(&self);

    /// Show the "working" indicator.
    fn show_working(&self);

    /// Hide the "working" indicator.
    fn clear_working(&self);

    /// Replace the answer body with `markup`.
    fn update(&self, markup: &str);

    /// Transient, non-blocking notice (status line).
    fn status(&self, notice: &str);

    /// The answer is complete; no more updates follow.
    fn finish(&self);

    /// The answer was cancelled or superseded. Whatever was drawn stays;
    /// later notices must show immediately.
    fn abandon(&self);
}

/// Surface that discards everything, for headless runs.
pub struct NoSurface;

impl ResponseSurface for NoSurface {
    fn begin(&self) {}
    fn show_working(&self) {}
    fn clear_working(&self) {}
    fn update(&self, _markup: &str) {}
    fn status(&self, _notice: &str) {}
    fn finish(&self) {}
    fn abandon(&self) {}
}
