// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Cleanup for "JSON-ish" text produced by a language model: code fences,
//! chatty prose around the object, `//` and `/* */` comments, stray newlines.

/// Removes a surrounding markdown code fence (```` ```json ... ``` ````) if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    // Drop the opening fence line, including any language tag.
    let body = match trimmed.find('\n') {
        Some(i) => &trimmed[i + 1..],
        None => return "",
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Slice from the first `{` to the last `}`. `None` when there is no object.
pub fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Removes line and block comments that sit outside string literals.
///
/// Line comments keep their terminating newline; block comments are replaced
/// by a single space so adjacent tokens stay separated.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

/// Collapses runs of whitespace outside string literals into one space.
///
/// Inside literals spacing is kept, but raw control characters (invalid in
/// JSON strings) become a space. Escapes such as `\n` are untouched.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_space = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(if c.is_control() { ' ' } else { c });
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }

    out
}

/// Full cleanup pipeline applied to a textual itinerary before parsing.
pub fn clean_json_text(text: &str) -> String {
    let unfenced = strip_code_fences(text);
    let uncommented = strip_comments(unfenced);
    let object = outermost_object(&uncommented).unwrap_or(&uncommented);
    collapse_whitespace(object)
}
