//! Presentation layer for chat-relay
//!
//! This crate contains the CLI definition, answer renderers, the terminal
//! surfaces answers are drawn on, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod surface;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, OutputFormat};
pub use config::{OutputConfig, ReplConfig};
pub use output::{HtmlRenderer, PlainRenderer, TerminalRenderer};
pub use surface::{LineSurface, TerminalSurface};
