//! Fault-tolerant recovery of structured comments from model replies.
//!
//! LLM replies wrap the JSON payload in prose or markdown fences, and
//! long replies get truncated mid-stream. This module extracts the
//! payload, repairs common truncation damage, and decodes it into
//! [`LineComment`]s. It never fails: anything unrecoverable yields an
//! empty comment list.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::models::comment::{LineComment, Severity};

/// Content inside markdown code fences. The closing fence must start a
/// line so triple-backticks inside JSON string values don't match.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").unwrap());

/// Recover line comments from a raw model reply.
pub fn parse_line_comments(response: &str) -> Vec<LineComment> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let Some(candidate) = extract_json(trimmed) else {
        debug!("no JSON payload found in model reply");
        return Vec::new();
    };

    let value = match serde_json::from_str::<Value>(&candidate) {
        Ok(v) => v,
        Err(e) if e.is_eof() => {
            let repaired = repair_truncated(&candidate);
            match serde_json::from_str::<Value>(&repaired) {
                Ok(v) => v,
                Err(e) => {
                    debug!(error = %e, "model reply unrecoverable after repair");
                    return Vec::new();
                }
            }
        }
        Err(e) => {
            debug!(error = %e, "model reply is not valid JSON");
            return Vec::new();
        }
    };

    collect_comments(&value)
}

/// Extract the JSON payload: a fenced code block if present, otherwise
/// the minimal balanced substring starting at the first `{` (or the
/// truncated tail if balance is never reached).
fn extract_json(text: &str) -> Option<String> {
    if let Some(caps) = FENCE_RE.captures(text) {
        let inner = caps.get(1)?.as_str().trim();
        if !inner.is_empty() {
            return Some(inner.to_string());
        }
    }

    let start = text.find('{')?;
    Some(balanced_from(&text[start..]))
}

/// Scan forward from an opening brace with a string-aware, escape-aware
/// depth counter, returning the minimal balanced substring. If depth
/// never returns to zero the whole remainder is returned (truncated
/// payload, handled by the repair pass).
fn balanced_from(text: &str) -> String {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return text[..=idx].to_string();
                }
            }
            _ => {}
        }
    }

    text.to_string()
}

/// Repair a JSON payload cut off mid-stream: strip a trailing comma,
/// close an unterminated string when it is safe to do so, then append
/// the missing closers in correct nesting order.
fn repair_truncated(json: &str) -> String {
    let mut repaired = json.trim_end().to_string();

    if let Some(stripped) = repaired.strip_suffix(',') {
        repaired = stripped.to_string();
    }

    if ends_inside_string(&repaired) {
        if let Some(quote_idx) = last_unescaped_quote(&repaired) {
            let tail = &repaired[quote_idx + 1..];
            let safe = !tail.contains([':', '{', '['])
                && tail
                    .chars()
                    .all(|c| c.is_ascii_punctuation() || c.is_whitespace());
            if safe {
                repaired.push('"');
            } else {
                // Truncated mid-content: closing here would fabricate a
                // value, so leave it for the decode to reject.
                return repaired;
            }
        }
    }

    for closer in unclosed_delimiters(&repaired).into_iter().rev() {
        repaired.push(closer);
    }

    repaired
}

/// True if a string-aware scan ends inside an open string literal.
fn ends_inside_string(json: &str) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for ch in json.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ => {}
        }
    }
    in_string
}

/// Byte index of the last quote that toggles string state. The same
/// escape-aware forward scan as [`ends_inside_string`], so a quote
/// after an escaped backslash (`\\"`) counts as real.
fn last_unescaped_quote(json: &str) -> Option<usize> {
    let mut last = None;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in json.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => {
                in_string = !in_string;
                last = Some(idx);
            }
            _ => {}
        }
    }

    last
}

/// The stack of delimiters still open at the end of the text, in
/// opening order, ignoring anything inside string literals.
fn unclosed_delimiters(json: &str) -> Vec<char> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in json.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                stack.pop();
            }
            _ => {}
        }
    }

    stack
}

/// Walk a decoded payload: only the `line_comments` array contributes.
/// Entries missing a required field are dropped individually.
fn collect_comments(value: &Value) -> Vec<LineComment> {
    let Some(entries) = value.get("line_comments").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries.iter().filter_map(comment_from_entry).collect()
}

fn comment_from_entry(entry: &Value) -> Option<LineComment> {
    let file_path = entry.get("file_path")?.as_str()?;
    let new_line = coerce_line(entry.get("new_line")?)?;
    let comment = entry.get("comment")?.as_str()?;
    let severity = entry
        .get("severity")
        .and_then(Value::as_str)
        .map(Severity::from_model_str)
        .unwrap_or(Severity::Info);

    Some(LineComment {
        file_path: file_path.to_string(),
        new_line,
        severity,
        comment: comment.to_string(),
    })
}

/// Coerce a numeric JSON value to a line number (floats are truncated).
fn coerce_line(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f as u32)
}
