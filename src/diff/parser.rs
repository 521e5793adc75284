//! Unified diff hunk parser.
//!
//! Parses a single file's diff text (as delivered by the GitLab changes
//! endpoint: hunks only, no `diff --git` preamble) into ordered
//! [`DiffHunk`]s with per-line number bookkeeping.
//!
//! Malformed input never fails the parse: a header that does not match
//! the hunk pattern is skipped, and a truncated hunk simply yields the
//! lines it had. The worst outcome is fewer hunks.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::diff::{DiffHunk, DiffLine, DiffLineKind};

/// Matches `@@ -oldStart[,oldCount] +newStart[,newCount] @@`; omitted
/// counts default to 1.
static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap()
});

/// Parse a file's diff text into an ordered sequence of hunks.
pub fn parse(diff_text: &str) -> Vec<DiffHunk> {
    let mut hunks = Vec::new();
    let mut lines = diff_text.lines().peekable();

    while let Some(line) = lines.next() {
        if !line.starts_with("@@") {
            continue;
        }
        let Some((old_start, old_count, new_start, new_count)) = parse_header(line) else {
            // Unparseable header: skip it, keep scanning for the next one.
            continue;
        };

        let mut hunk_lines = Vec::new();
        let mut old_line = old_start;
        let mut new_line = new_start;
        // Each side's count covers its removed/added/context lines, so
        // the total line budget for the hunk body is their sum.
        let mut budget = (old_count + new_count) as usize;

        while budget > 0 {
            let Some(&next) = lines.peek() else { break };
            if next.starts_with("@@") {
                break;
            }
            let line = lines.next().unwrap_or_default();

            if let Some(content) = line.strip_prefix('+') {
                hunk_lines.push(DiffLine {
                    kind: DiffLineKind::Added,
                    content: content.to_string(),
                    old_line: None,
                    new_line: Some(new_line),
                });
                new_line += 1;
                budget = budget.saturating_sub(1);
            } else if let Some(content) = line.strip_prefix('-') {
                hunk_lines.push(DiffLine {
                    kind: DiffLineKind::Removed,
                    content: content.to_string(),
                    old_line: Some(old_line),
                    new_line: None,
                });
                old_line += 1;
                budget = budget.saturating_sub(1);
            } else if line.starts_with('\\') {
                // "\ No newline at end of file" marker: dropped, not
                // counted against the budget.
            } else {
                let content = line.strip_prefix(' ').unwrap_or(line);
                hunk_lines.push(DiffLine {
                    kind: DiffLineKind::Context,
                    content: content.to_string(),
                    old_line: Some(old_line),
                    new_line: Some(new_line),
                });
                old_line += 1;
                new_line += 1;
                budget = budget.saturating_sub(2);
            }
        }

        hunks.push(DiffHunk {
            old_start,
            old_count,
            new_start,
            new_count,
            lines: hunk_lines,
        });
    }

    hunks
}

/// Parse a hunk header into (old_start, old_count, new_start, new_count).
fn parse_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    let caps = HUNK_HEADER_RE.captures(line)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    Some((
        num(1)?,
        num(2).unwrap_or(1),
        num(3)?,
        num(4).unwrap_or(1),
    ))
}
