//! Application layer for chat-relay
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::DeliveryParams;
pub use ports::{
    chunk_source::{ChunkSource, SingleShotReply, StreamHandle, TransportError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    history::{HistoryError, HistoryPort, NoHistory},
    renderer::{RenderError, Renderer},
    session_store::{InMemorySessionStore, SessionStore, SessionStoreError},
    surface::{NoSurface, ResponseSurface},
};
pub use use_cases::chat_session::{ChatError, ChatSessionUseCase, ResetOutcome};
pub use use_cases::stream_response::{CompletedResponse, ResponseController, ResponseOutcome};
