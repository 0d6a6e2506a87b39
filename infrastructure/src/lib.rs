//! Infrastructure layer for chat-relay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod http;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig, FileOutputFormat,
    FileReplConfig,
};
pub use http::{HttpChunkSource, HttpError, HttpHistoryClient};
pub use logging::JsonlConversationLogger;
pub use session::FileSessionStore;
