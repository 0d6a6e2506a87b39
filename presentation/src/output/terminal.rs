//! Markdown to ANSI-styled terminal text.

use super::sanitize::{plain_text, strip_control};
use colored::{ColoredString, Colorize};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use relay_application::ports::renderer::{RenderError, Renderer};

/// Renders answers for an ANSI terminal.
///
/// Raw HTML in the answer is shown as literal text. With `color` off the
/// output has the same layout without escape sequences.
pub struct TerminalRenderer {
    color: bool,
    max_render_bytes: usize,
}

impl TerminalRenderer {
    pub fn new(color: bool, max_render_bytes: usize) -> Self {
        Self {
            color,
            max_render_bytes,
        }
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, normalized: &str) -> Result<String, RenderError> {
        if normalized.len() > self.max_render_bytes {
            return Err(RenderError::TooLarge {
                len: normalized.len(),
                limit: self.max_render_bytes,
            });
        }
        let clean = strip_control(normalized);
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut writer = Writer::new(self.color);
        for event in Parser::new_ext(&clean, options) {
            writer.event(event);
        }
        Ok(writer.finish())
    }

    fn render_plain(&self, raw: &str) -> String {
        plain_text(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineStyle {
    Emphasis,
    Strong,
    Strikethrough,
    Heading,
    Link,
    Code,
}

struct Writer {
    color: bool,
    out: String,
    styles: Vec<InlineStyle>,
    /// Next number of each open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    /// Destination and visible text of each open link.
    links: Vec<(String, String)>,
    quote_depth: usize,
    in_code_block: bool,
    line_start: bool,
    /// An item marker was just written; its first paragraph continues the line.
    item_open: bool,
}

impl Writer {
    fn new(color: bool) -> Self {
        Self {
            color,
            out: String::new(),
            styles: Vec::new(),
            lists: Vec::new(),
            links: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            line_start: true,
            item_open: false,
        }
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.styles.push(InlineStyle::Code);
                self.text(&code);
                self.styles.pop();
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak | Event::HardBreak => self.newline(),
            Event::Rule => {
                self.block_start();
                let rule = "─".repeat(40);
                let rule = if self.color {
                    rule.dimmed().to_string()
                } else {
                    rule
                };
                self.write_line_content(&rule);
                self.newline();
            }
            Event::TaskListMarker(checked) => {
                self.text(if checked { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.item_open {
                    self.block_start();
                }
            }
            Tag::Heading { .. } => {
                self.block_start();
                self.styles.push(InlineStyle::Heading);
            }
            Tag::BlockQuote => {
                self.block_start();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.block_start();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.block_start();
                } else {
                    self.ensure_newline();
                }
                self.lists.push(start);
            }
            Tag::Item => self.start_item(),
            Tag::Emphasis => self.styles.push(InlineStyle::Emphasis),
            Tag::Strong => self.styles.push(InlineStyle::Strong),
            Tag::Strikethrough => self.styles.push(InlineStyle::Strikethrough),
            Tag::Link { dest_url, .. } => {
                self.styles.push(InlineStyle::Link);
                self.links.push((dest_url.to_string(), String::new()));
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.item_open = false;
                self.ensure_newline();
            }
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.ensure_newline();
            }
            TagEnd::BlockQuote => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.ensure_newline();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.ensure_newline();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.ensure_newline();
            }
            TagEnd::Item => {
                self.item_open = false;
                self.ensure_newline();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                self.end_link();
            }
            _ => {}
        }
    }

    fn start_item(&mut self) {
        self.ensure_newline();
        let depth = self.lists.len().saturating_sub(1);
        let marker = match self.lists.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{n}. ");
                *n += 1;
                marker
            }
            _ => "• ".to_string(),
        };
        let marker = if self.color {
            marker.cyan().to_string()
        } else {
            marker
        };
        let prefix = format!("{}{}{}", self.quote_prefix(), "  ".repeat(depth), marker);
        self.out.push_str(&prefix);
        self.line_start = false;
        self.item_open = true;
    }

    fn end_link(&mut self) {
        let Some((dest, text)) = self.links.pop() else {
            return;
        };
        if dest.is_empty() || text == dest {
            return;
        }
        let suffix = format!(" ({})", strip_control(&dest));
        let suffix = if self.color {
            suffix.dimmed().to_string()
        } else {
            suffix
        };
        self.write_line_content(&suffix);
    }

    fn text(&mut self, text: &str) {
        let mut first = true;
        for segment in text.split('\n') {
            if !first {
                self.newline();
            }
            first = false;
            if segment.is_empty() {
                continue;
            }
            if let Some((_, link_text)) = self.links.last_mut() {
                link_text.push_str(segment);
            }
            let styled = self.styled(segment);
            self.write_line_content(&styled);
        }
    }

    fn write_line_content(&mut self, content: &str) {
        if self.line_start {
            let prefix = self.line_prefix();
            self.out.push_str(&prefix);
            self.line_start = false;
        }
        self.out.push_str(content);
    }

    fn styled(&self, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        if self.in_code_block {
            return text.yellow().to_string();
        }
        let mut styled: ColoredString = text.normal();
        for style in &self.styles {
            styled = match style {
                InlineStyle::Emphasis => styled.italic(),
                InlineStyle::Strong => styled.bold(),
                InlineStyle::Strikethrough => styled.strikethrough(),
                InlineStyle::Heading => styled.bold().cyan(),
                InlineStyle::Link => styled.blue().underline(),
                InlineStyle::Code => styled.yellow(),
            };
        }
        if self.quote_depth > 0 {
            styled = styled.dimmed();
        }
        styled.to_string()
    }

    fn quote_prefix(&self) -> String {
        "│ ".repeat(self.quote_depth)
    }

    fn line_prefix(&self) -> String {
        let mut prefix = self.quote_prefix();
        if !self.lists.is_empty() {
            prefix.push_str(&"  ".repeat(self.lists.len()));
        }
        if self.in_code_block {
            prefix.push_str("    ");
        }
        prefix
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.line_start = true;
    }

    fn ensure_newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.newline();
        }
    }

    /// Separate a new block from the previous one by a blank line.
    fn block_start(&mut self) {
        self.ensure_newline();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.newline();
        }
    }
}
