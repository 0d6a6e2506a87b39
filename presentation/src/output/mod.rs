//! Answer renderers
//!
//! Implementations of the [`Renderer`](relay_application::Renderer) port for
//! each output format, plus the sanitization they share.

pub mod html;
pub mod plain;
pub mod sanitize;
pub mod terminal;

pub use html::HtmlRenderer;
pub use plain::PlainRenderer;
pub use terminal::TerminalRenderer;
