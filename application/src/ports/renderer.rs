//! Renderer port
//!
//! Converts normalized answer text into sanitized display markup. Parsing
//! and sanitization always happen together; a caller that gets an `Err`
//! must fall back to [`Renderer::render_plain`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Markup conversion failed: {0}")]
    Parse(String),

    #[error("Sanitization failed: {0}")]
    Sanitize(String),

    #[error("Text too large to render as markup ({len} bytes, limit {limit})")]
    TooLarge { len: usize, limit: usize },
}

pub trait Renderer: Send + Sync {
    /// Full re-render of `normalized`; never diffed against earlier output.
    fn render(&self, normalized: &str) -> Result<String, RenderError>;

    /// Unformatted but still sanitized rendering of `raw`.
    fn render_plain(&self, raw: &str) -> String;
}
