//! Conversation session domain.
//!
//! - [`entities::SessionId`]: the client-generated conversation identifier
//! - [`entities::Message`]: a single message from stored history
//! - [`stream::StreamEvent`]: one event of a streamed answer

pub mod entities;
pub mod stream;
