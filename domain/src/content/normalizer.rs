//! Deterministic text repair run before every render pass.
//!
//! Incremental passes only unify line endings, which is stable on any
//! prefix of the final text. The final pass additionally repairs list markup
//! that upstream generation tends to emit without line breaks. Those repairs
//! need the complete text and are heuristic: a literal ` * ` on a list line
//! is treated as a bullet.

/// Marker every repaired bullet is rewritten to.
pub const CANONICAL_BULLET: &str = "- ";

/// Normalize accumulated answer text.
///
/// With `is_final == false` the result is idempotent and prefix-stable.
/// With `is_final == true` list repairs are applied outside fenced code.
pub fn normalize(raw: &str, is_final: bool) -> String {
    let text = unify_line_endings(raw);
    if is_final { repair_lists(&text) } else { text }
}

fn unify_line_endings(raw: &str) -> String {
    if !raw.contains('\r') {
        return raw.to_string();
    }
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

fn repair_lists(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut open_fence: Option<String> = None;

    for line in text.split('\n') {
        if let Some(marker) = fence_marker(line) {
            match &open_fence {
                None => open_fence = Some(marker),
                Some(open) if marker.starts_with(open.as_str()) => open_fence = None,
                Some(_) => {}
            }
            lines.push(line.to_string());
            continue;
        }
        if open_fence.is_some() {
            lines.push(line.to_string());
            continue;
        }
        for piece in split_after_colon(line) {
            let piece = canonical_leading_marker(&piece);
            lines.extend(split_inline_bullets(&piece));
        }
    }

    lines.join("\n")
}

/// The run of backticks or tildes opening a fenced code line, if any.
fn fence_marker(line: &str) -> Option<String> {
    let trimmed = line.trim_start_matches(' ');
    let fence_char = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run: String = trimmed.chars().take_while(|c| *c == fence_char).collect();
    (run.len() >= 3).then_some(run)
}

fn split_indent(line: &str) -> (&str, &str) {
    let rest = line.trim_start_matches([' ', '\t']);
    line.split_at(line.len() - rest.len())
}

fn is_blank(c: Option<&char>) -> bool {
    matches!(c, Some(' ' | '\t'))
}

/// `* * *`, `***`, `- - -` and friends.
fn is_thematic_break(line: &str) -> bool {
    let body: Vec<char> = line.chars().filter(|c| !matches!(c, ' ' | '\t')).collect();
    body.len() >= 3 && body.iter().all(|c| *c == body[0]) && matches!(body[0], '*' | '-' | '_')
}

/// `Steps:*do this` → `Steps:`, ``, `- do this`.
fn split_after_colon(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        current.push(chars[i]);
        if chars[i] == ':' && chars.get(i + 1) == Some(&'*') {
            let mut j = i + 2;
            while is_blank(chars.get(j)) {
                j += 1;
            }
            if chars.get(j).is_some_and(|c| *c != '*' && !c.is_whitespace()) {
                pieces.push(std::mem::take(&mut current));
                pieces.push(String::new());
                current.push_str(CANONICAL_BULLET);
                i = j;
                continue;
            }
        }
        i += 1;
    }

    pieces.push(current);
    pieces
}

/// `  * item`, `+ item`, `•item` → `  - item`.
fn canonical_leading_marker(line: &str) -> String {
    if is_thematic_break(line) {
        return line.to_string();
    }
    let (indent, rest) = split_indent(line);
    let mut chars = rest.chars();
    match chars.next() {
        Some('*' | '+') if chars.as_str().starts_with([' ', '\t']) => {
            format!(
                "{indent}{CANONICAL_BULLET}{}",
                chars.as_str().trim_start_matches([' ', '\t'])
            )
        }
        Some('•') => format!(
            "{indent}{CANONICAL_BULLET}{}",
            chars.as_str().trim_start_matches([' ', '\t'])
        ),
        _ => line.to_string(),
    }
}

/// `- a * b • c` → `- a`, `- b`, `- c` (same indent).
fn split_inline_bullets(line: &str) -> Vec<String> {
    let (indent, rest) = split_indent(line);
    let Some(body) = rest.strip_prefix(CANONICAL_BULLET) else {
        return vec![line.to_string()];
    };
    if is_thematic_break(line) {
        return vec![line.to_string()];
    }

    let chars: Vec<char> = body.chars().collect();
    let mut items = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        if !is_blank(chars.get(i)) {
            current.push(chars[i]);
            i += 1;
            continue;
        }
        let mut j = i;
        while is_blank(chars.get(j)) {
            j += 1;
        }
        let is_marker = matches!(chars.get(j), Some('*' | '•')) && is_blank(chars.get(j + 1));
        if is_marker && !current.trim().is_empty() {
            let mut k = j + 1;
            while is_blank(chars.get(k)) {
                k += 1;
            }
            if k < chars.len() {
                items.push(std::mem::take(&mut current));
                i = k;
                continue;
            }
        }
        current.extend(&chars[i..j]);
        i = j;
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| format!("{indent}{CANONICAL_BULLET}{item}"))
        .collect()
}
