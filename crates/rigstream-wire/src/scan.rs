//! Top-level splitting of record text
//!
//! The scanner keeps a stack of expected closers: `[` expects `]`, `{`
//! expects `}` and `"` expects the next `"`. A separator only splits when
//! the stack is empty. Quoted text is opaque: brackets inside it are not
//! tracked.

use rigstream_core::{RigError, RigResult};

/// Split `text` at every separator that sits outside brackets, braces
/// and quotes. Empty input yields no parts.
pub fn split_top_level(text: &str, separator: char) -> RigResult<Vec<&str>> {
    let mut parts = Vec::new();
    if text.is_empty() {
        return Ok(parts);
    }

    let mut closers: Vec<char> = Vec::new();
    let mut last = 0;

    for (i, c) in text.char_indices() {
        if closers.last() == Some(&'"') {
            if c == '"' {
                closers.pop();
            }
            continue;
        }

        match c {
            '[' => closers.push(']'),
            '{' => closers.push('}'),
            '"' => closers.push('"'),
            ']' | '}' => {
                if closers.pop() != Some(c) {
                    return Err(RigError::UnbalancedDelimiters(text.to_string()));
                }
            }
            _ if c == separator && closers.is_empty() => {
                parts.push(&text[last..i]);
                last = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if !closers.is_empty() {
        return Err(RigError::UnbalancedDelimiters(text.to_string()));
    }

    parts.push(&text[last..]);
    Ok(parts)
}

/// Strip one pair of outer delimiters
pub fn unwrap_delimited(text: &str, open: char, close: char) -> RigResult<&str> {
    if text.len() >= 2 && text.starts_with(open) && text.ends_with(close) {
        Ok(&text[open.len_utf8()..text.len() - close.len_utf8()])
    } else {
        Err(RigError::MalformedRecord(format!(
            "expected {}...{} around {:?}",
            open, close, text
        )))
    }
}

/// Strip surrounding quotes if present
pub fn unquote(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Split a `key:value` entry on its top-level colon
pub fn split_pair(entry: &str) -> RigResult<(&str, &str)> {
    let parts = split_top_level(entry, ':')?;
    match parts.as_slice() {
        [key, value] => Ok((unquote(key), value)),
        _ => Err(RigError::MalformedRecord(format!(
            "expected key:value, got {} parts in {:?}",
            parts.len(),
            entry
        ))),
    }
}

/// Remove control characters everywhere and whitespace outside quotes.
/// The format is not whitespace-significant.
pub fn strip_insignificant(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quoted = false;

    for c in text.chars() {
        if c.is_control() {
            continue;
        }
        if c == '"' {
            quoted = !quoted;
        } else if !quoted && c.is_whitespace() {
            continue;
        }
        out.push(c);
    }

    out
}
