//! Statement splitting shared by the description parsers.

/// One statement with the 1-based line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<'a> {
    pub line: usize,
    pub text: &'a str,
}

/// Splits a description into trimmed, non-empty statements.
///
/// A leading `---` front-matter block and `%%` comment lines are skipped. With
/// `split_semicolons`, a `;` outside quotes and brackets also ends a statement.
pub fn statements(text: &str, split_semicolons: bool) -> Vec<Statement<'_>> {
    let mut out = Vec::new();
    let mut in_front_matter = false;
    let mut seen_content = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();

        if in_front_matter {
            if trimmed == "---" {
                in_front_matter = false;
            }
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }
        if !seen_content && trimmed == "---" {
            in_front_matter = true;
            continue;
        }
        seen_content = true;

        if split_semicolons {
            out.extend(
                split_outside_brackets(trimmed)
                    .into_iter()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|text| Statement { line, text }),
            );
        } else {
            out.push(Statement {
                line,
                text: trimmed.trim_end_matches(';').trim_end(),
            });
        }
    }
    out
}

fn split_outside_brackets(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_quote = false;
    let mut start = 0;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '[' | '(' | '{' if !in_quote => depth += 1,
            ']' | ')' | '}' if !in_quote => depth = (depth - 1).max(0),
            ';' if !in_quote && depth == 0 => {
                parts.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&line[start..]);
    parts
}

/// First whitespace-delimited word.
pub fn first_word(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

/// Replaces `<br>` variants with newlines and strips one pair of surrounding quotes.
pub fn clean_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n")
}
