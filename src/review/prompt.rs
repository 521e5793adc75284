//! Prompt construction for the review model.
//!
//! One prompt covers a set of changed files: the windowed diff per
//! file, the dependency evidence gathered by the resolver, and the
//! impact summary. The instructions pin the JSON reply format the
//! recovery parser expects.

use crate::diff;
use crate::models::diff::{ChangedFile, DiffLineKind};
use crate::models::symbol::{DependencyInfo, UsedDependencyInfo};

/// Reviewer persona and output contract.
pub const SYSTEM_PROMPT: &str = "\
You are a senior engineer reviewing a merge request. You are given the \
changed files, plus evidence about which other files in the repository \
depend on the changed code. Focus on correctness, cross-file ripple \
effects, and breaking changes to public symbols. Be concrete and brief; \
do not comment on style or formatting.

Reply with JSON only, in this shape:

{\"line_comments\": [{\"file_path\": \"<path>\", \"new_line\": <line in \
the new file>, \"severity\": \"critical\" | \"warning\" | \"suggestion\" \
| \"info\", \"comment\": \"<text>\"}]}

Only comment on lines present in the diffs. If nothing is worth raising, \
reply {\"line_comments\": []}.";

/// Build the user prompt for one set of changed files.
///
/// `impact_summary` is the classifier's textual summary; the chunked
/// path passes the *global* summary so every chunk sees the whole MR's
/// blast radius.
pub fn build_review_prompt(
    files: &[ChangedFile],
    deps: &[DependencyInfo],
    used: &[UsedDependencyInfo],
    impact_summary: &str,
    context_window: usize,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("## Cross-file impact\n\n");
    prompt.push_str(impact_summary);
    prompt.push_str("\n\n");

    for file in files {
        let path = file.path();
        prompt.push_str(&format!("## Diff for: {path}\n\n```diff\n"));
        render_windowed_diff(&mut prompt, file, context_window);
        prompt.push_str("```\n\n");

        let file_deps: Vec<&DependencyInfo> =
            deps.iter().filter(|d| d.symbol.file_path == path).collect();
        if !file_deps.is_empty() {
            prompt.push_str(&format!("### Symbols in {path} used elsewhere\n\n"));
            for dep in file_deps {
                prompt.push_str(&format!(
                    "- `{}` ({}) is referenced by {} file(s): {}\n",
                    dep.symbol.name,
                    dep.symbol.kind,
                    dep.affected_files.len(),
                    dep.affected_files
                        .iter()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            prompt.push('\n');
        }

        if let Some(info) = used.iter().find(|u| u.file_path == path) {
            let resolved: Vec<&crate::models::symbol::UsedSymbol> = info
                .used_symbols
                .iter()
                .filter(|u| u.resolved_from.is_some())
                .collect();
            if !resolved.is_empty() {
                prompt.push_str(&format!("### External symbols {path} now depends on\n\n"));
                for usage in resolved {
                    prompt.push_str(&format!(
                        "- line {}: `{}` defined in {}\n",
                        usage.line,
                        usage.name,
                        usage.resolved_from.as_deref().unwrap_or("?")
                    ));
                }
                prompt.push('\n');
            }
        }
    }

    prompt.push_str(
        "## Instructions\n\n\
         Review the diffs above using the dependency evidence. Flag changes \
         that break or silently alter behavior for the listed dependent \
         files. Reply with the JSON object described in your instructions, \
         anchoring each comment to a `new_line` from the diffs.\n",
    );

    prompt
}

/// Render the changed lines of every hunk plus surrounding context,
/// with new-file line numbers where they exist.
fn render_windowed_diff(out: &mut String, file: &ChangedFile, window: usize) {
    let hunks = diff::parse(&file.diff);
    for line in diff::changed_lines_with_context(&hunks, window) {
        let prefix = match line.kind {
            DiffLineKind::Added => '+',
            DiffLineKind::Removed => '-',
            DiffLineKind::Context => ' ',
        };
        match line.new_line {
            Some(n) => out.push_str(&format!("{n:>5} {prefix}{}\n", line.content)),
            None => out.push_str(&format!("      {prefix}{}\n", line.content)),
        }
    }
}
