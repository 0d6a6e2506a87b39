//! Content sanitization shared by every renderer.
//!
//! Answer text is untrusted: it must never move the cursor, recolor the
//! terminal or inject markup. Escape sequences are removed whole, other
//! control characters are dropped, and `\n` and `\t` are kept.

use vte::{Params, Parser, Perform};

/// Collects printable text and drops every sequence the parser recognises.
struct TextOnly {
    out: String,
}

impl Perform for TextOnly {
    fn print(&mut self, c: char) {
        // C1 controls arrive here as decoded UTF-8
        if !c.is_control() {
            self.out.push(c);
        }
    }

    fn execute(&mut self, byte: u8) {
        if byte == b'\n' || byte == b'\t' {
            self.out.push(char::from(byte));
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}

/// Remove ANSI escape sequences and C0/C1 control characters.
pub fn strip_control(text: &str) -> String {
    let mut parser = Parser::new();
    let mut text_only = TextOnly {
        out: String::with_capacity(text.len()),
    };
    for byte in text.bytes() {
        parser.advance(&mut text_only, byte);
    }
    text_only.out
}

/// Unformatted, sanitized text: the plain-text fallback.
pub fn plain_text(raw: &str) -> String {
    strip_control(&raw.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Number of terminal columns `text` occupies, ignoring escape sequences.
pub fn visible_width(text: &str) -> usize {
    strip_control(text).chars().filter(|c| *c != '\n').count()
}
