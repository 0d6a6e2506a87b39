//! Markdown to sanitized HTML.

use super::sanitize::{escape_html, plain_text};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};
use relay_application::ports::renderer::{RenderError, Renderer};

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Renders answers as an HTML fragment.
///
/// Raw HTML in the answer is escaped, never passed through, and link or
/// image targets with script-capable schemes are replaced by `#`.
pub struct HtmlRenderer {
    max_render_bytes: usize,
}

impl HtmlRenderer {
    pub fn new(max_render_bytes: usize) -> Self {
        Self { max_render_bytes }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, normalized: &str) -> Result<String, RenderError> {
        if normalized.len() > self.max_render_bytes {
            return Err(RenderError::TooLarge {
                len: normalized.len(),
                limit: self.max_render_bytes,
            });
        }
        let clean = plain_text(normalized);
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        let events = Parser::new_ext(&clean, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            other => other,
        });

        let mut out = String::with_capacity(clean.len() * 3 / 2);
        html::push_html(&mut out, events);
        Ok(out)
    }

    fn render_plain(&self, raw: &str) -> String {
        format!("<pre>{}</pre>", escape_html(&plain_text(raw)))
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|blocked| scheme.starts_with(blocked)) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}
