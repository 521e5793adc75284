//! Pattern-based symbol extraction from added diff lines.
//!
//! Two independent passes over the added lines of a changed file: one
//! for symbols the change *defines*, one for symbols the new code
//! *uses*. Both are line-oriented regex matching, not parsing; the
//! dialect tables live in [`dialect`].

pub mod dialect;

use indexmap::IndexMap;

use crate::models::diff::{ChangedFile, DiffHunk, DiffLineKind};
use crate::models::symbol::{Symbol, UsageKind, UsedSymbol};

pub use dialect::Dialect;

/// True for lines that carry no extractable code: blanks and line or
/// block comment openers.
fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
}

/// Extract the symbols defined on the added lines of a changed file.
///
/// Deleted files and unsupported dialects yield nothing. Results are
/// deduplicated by name; the first matching rule wins, so dialect rule
/// order decides the kind when a line matches several rules.
pub fn extract_symbols(file: &ChangedFile, hunks: &[DiffHunk]) -> Vec<Symbol> {
    if file.is_deleted {
        return Vec::new();
    }
    let Some(dialect) = Dialect::from_path(file.path()) else {
        return Vec::new();
    };

    let mut by_name: IndexMap<String, Symbol> = IndexMap::new();

    for line in added_lines(hunks) {
        if is_skippable(line) {
            continue;
        }
        let is_public = !dialect.has_non_public_modifier(line);

        for rule in dialect.definition_rules() {
            for caps in rule.regex.captures_iter(line) {
                let Some(name) = caps.get(1) else { continue };
                let name = name.as_str();
                if dialect.is_reserved(name) {
                    continue;
                }
                by_name.entry(name.to_string()).or_insert_with(|| Symbol {
                    name: name.to_string(),
                    kind: rule.kind,
                    file_path: file.path().to_string(),
                    is_public,
                });
            }
        }
    }

    by_name.into_values().collect()
}

/// Extract the symbols *used* on the added lines of a changed file:
/// import targets, call-like tokens, constructor-like tokens, and
/// member accesses. Each usage carries the new-file line number of the
/// added line it appeared on.
pub fn extract_used_symbols(file: &ChangedFile, hunks: &[DiffHunk]) -> Vec<UsedSymbol> {
    if file.is_deleted {
        return Vec::new();
    }
    let Some(dialect) = Dialect::from_path(file.path()) else {
        return Vec::new();
    };

    let mut used = Vec::new();
    let mut seen: IndexMap<(String, UsageKind), ()> = IndexMap::new();

    let mut push = |used: &mut Vec<UsedSymbol>, name: &str, kind: UsageKind, line_no: u32| {
        if dialect.is_reserved(name) {
            return;
        }
        if seen.insert((name.to_string(), kind), ()).is_some() {
            return;
        }
        used.push(UsedSymbol {
            name: name.to_string(),
            kind,
            line: line_no,
            resolved_from: None,
        });
    };

    for hunk in hunks {
        for diff_line in &hunk.lines {
            if diff_line.kind != DiffLineKind::Added {
                continue;
            }
            let Some(line_no) = diff_line.new_line else { continue };
            let line = diff_line.content.as_str();
            if is_skippable(line) {
                continue;
            }

            // Import statements claim the whole line.
            if let Some(caps) = dialect.import_pattern().captures(line) {
                if let Some(target) = caps[1].rsplit('.').next() {
                    if !target.is_empty() && target != "*" {
                        push(&mut used, target, UsageKind::Import, line_no);
                    }
                }
                continue;
            }

            for caps in dialect.call_pattern().captures_iter(line) {
                push(&mut used, &caps[1], UsageKind::Call, line_no);
            }
            for caps in dialect.instantiation_pattern().captures_iter(line) {
                push(&mut used, &caps[1], UsageKind::Instantiation, line_no);
            }
            for caps in dialect.member_pattern().captures_iter(line) {
                push(&mut used, &caps[1], UsageKind::MemberAccess, line_no);
            }
        }
    }

    used
}

/// Iterate the content of every added line across all hunks.
fn added_lines(hunks: &[DiffHunk]) -> impl Iterator<Item = &str> {
    hunks
        .iter()
        .flat_map(|h| &h.lines)
        .filter(|l| l.kind == DiffLineKind::Added)
        .map(|l| l.content.as_str())
}
