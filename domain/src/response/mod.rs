//! Response stream domain.
//!
//! One [`entities::ResponseStream`] tracks a single answer from the moment a
//! query is submitted until the answer is fully rendered, moving through the
//! [`phase::ResponsePhase`] state machine. Recoverable failures are recorded
//! as [`error::ResponseError`] values rather than raised.

pub mod entities;
pub mod error;
pub mod phase;
