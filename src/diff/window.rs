//! Context windowing over parsed hunks.
//!
//! `changed_lines_with_context` selects every added/removed line plus a
//! bounded window of surrounding context, for building compact prompt
//! excerpts without fabricating lines beyond hunk boundaries.

use crate::models::diff::{DiffHunk, DiffLine, DiffLineKind};

/// Return every non-context line plus up to `window` lines of context
/// immediately before and after it, clipped to each hunk's boundaries.
///
/// The result is an order-preserving union: a line covered by two
/// overlapping windows appears exactly once, in hunk order.
pub fn changed_lines_with_context(hunks: &[DiffHunk], window: usize) -> Vec<DiffLine> {
    let mut selected = Vec::new();

    for hunk in hunks {
        let len = hunk.lines.len();
        let mut keep = vec![false; len];

        for (idx, line) in hunk.lines.iter().enumerate() {
            if line.kind == DiffLineKind::Context {
                continue;
            }
            let start = idx.saturating_sub(window);
            let end = (idx + window).min(len.saturating_sub(1));
            for flag in &mut keep[start..=end] {
                *flag = true;
            }
        }

        selected.extend(
            hunk.lines
                .iter()
                .zip(&keep)
                .filter(|&(_, &kept)| kept)
                .map(|(line, _)| line.clone()),
        );
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parser::parse;

    fn hunk_with_changes() -> Vec<DiffHunk> {
        // 7 lines: ctx ctx add ctx ctx ctx add
        parse("@@ -1,5 +1,7 @@\n a\n b\n+c\n d\n e\n f\n+g")
    }

    #[test]
    fn zero_window_returns_only_changed_lines() {
        let hunks = hunk_with_changes();
        let lines = changed_lines_with_context(&hunks, 0);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.kind == DiffLineKind::Added));
    }

    #[test]
    fn window_adds_bounded_context() {
        let hunks = hunk_with_changes();
        let lines = changed_lines_with_context(&hunks, 1);
        let contents: Vec<&str> = lines.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, vec!["b", "c", "d", "f", "g"]);
    }

    #[test]
    fn overlapping_windows_do_not_duplicate() {
        // Two additions one line apart: their windows overlap on "b".
        let hunks = parse("@@ -1,3 +1,5 @@\n a\n+x\n b\n+y\n c");
        let lines = changed_lines_with_context(&hunks, 1);
        let contents: Vec<&str> = lines.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "x", "b", "y", "c"]);
    }

    #[test]
    fn window_is_clipped_to_hunk_edges() {
        let hunks = parse("@@ -1,1 +1,2 @@\n+first\n last");
        let lines = changed_lines_with_context(&hunks, 10);
        // Only the hunk's own 2 lines, nothing fabricated outside.
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn hunks_with_no_changes_contribute_nothing() {
        let hunks = parse("@@ -1,2 +1,2 @@\n a\n b");
        assert!(changed_lines_with_context(&hunks, 3).is_empty());
    }

    #[test]
    fn lines_stay_within_their_hunk() {
        let diff = "@@ -1,2 +1,3 @@\n a\n+b\n c\n@@ -20,2 +21,3 @@\n x\n+y\n z";
        let hunks = parse(diff);
        let lines = changed_lines_with_context(&hunks, 5);
        // 3 from each hunk; windows never bleed across hunks.
        assert_eq!(lines.len(), 6);
        let news: Vec<u32> = lines.iter().filter_map(|l| l.new_line).collect();
        assert!(news.contains(&1) && news.contains(&21));
    }
}
