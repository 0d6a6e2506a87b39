//! Unformatted output.

use super::sanitize::plain_text;
use relay_application::ports::renderer::{RenderError, Renderer};

/// Shows answers as sanitized text without markdown processing.
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render(&self, normalized: &str) -> Result<String, RenderError> {
        Ok(plain_text(normalized))
    }

    fn render_plain(&self, raw: &str) -> String {
        plain_text(raw)
    }
}
