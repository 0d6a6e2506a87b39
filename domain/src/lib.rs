//! Domain layer for chat-relay
//!
//! This crate contains the core entities and pure algorithms of incremental
//! answer delivery. It has no dependencies on I/O, timers or presentation.
//!
//! # Core Concepts
//!
//! ## Response stream
//!
//! A [`ResponseStream`] is the lifecycle of one answer to one query: fragments
//! are appended in arrival order while the stream walks the
//! [`ResponsePhase`] state machine (`idle → awaiting-first-byte → streaming →
//! finalizing → complete`, or `errored`).
//!
//! ## Pacing
//!
//! The [`PacingBuffer`] decouples arrival rate from reveal rate: a fixed
//! number of characters is released per tick, and completion is only
//! reported once everything queued has been released.
//!
//! ## Normalization
//!
//! [`normalize`] repairs the accumulated raw text before every render pass;
//! the final pass also fixes list markup that needs the complete text.

pub mod content;
pub mod core;
pub mod pacing;
pub mod response;
pub mod session;

// Re-export commonly used types
pub use content::normalizer::{CANONICAL_BULLET, normalize};
pub use core::{error::DomainError, query::Query, text::preview};
pub use pacing::{PacingBuffer, PacingConfig, Tick};
pub use response::{
    entities::{ResponseStream, TransportKind},
    error::ResponseError,
    phase::ResponsePhase,
};
pub use session::{
    entities::{Message, Role, SESSION_ID_PREFIX, SessionId},
    stream::StreamEvent,
};
