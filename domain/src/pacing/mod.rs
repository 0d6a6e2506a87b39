//! Reveal pacing.
//!
//! Network delivery is bursty; the [`buffer::PacingBuffer`] smooths it into
//! a fixed number of characters per tick so the answer appears at a steady
//! rate, in arrival order, and completion is reported only once everything
//! queued has been shown.

pub mod buffer;

pub use buffer::{PacingBuffer, PacingConfig, Tick};
