//! Interactive chat module
//!
//! Provides a line-editor based chat interface on top of
//! [`ChatSessionUseCase`](relay_application::ChatSessionUseCase).

mod command;
mod repl;

pub use command::Command;
pub use repl::ChatRepl;
