//! Text helpers for log output.

/// Shorten `s` to at most `max_chars` characters for log output, appending
/// `…` when anything was cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut chars = s.char_indices();
    match chars.nth(max_chars) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…", &s[..cut]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_text_unchanged() {
        assert_eq!(preview("hello", 10), "hello");
        assert_eq!(preview("hello", 5), "hello");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("hello world", 5), "hello…");
        assert_eq!(preview("xin chào bạn", 8), "xin chào…");
    }

    #[test]
    fn preview_empty() {
        assert_eq!(preview("", 3), "");
    }
}
