//! Diff-related types: changed files, hunks, and diff lines.

use serde::{Deserialize, Serialize};

/// The kind of a line in a diff hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLineKind {
    /// Line exists only in the new version (added).
    Added,
    /// Line exists only in the old version (removed).
    Removed,
    /// Line is unchanged (context).
    Context,
}

/// A single line in a diff hunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLine {
    /// The kind of change.
    pub kind: DiffLineKind,
    /// The content of the line (without the leading +/-/space marker).
    pub content: String,
    /// Line number in the old file (`None` for added lines).
    pub old_line: Option<u32>,
    /// Line number in the new file (`None` for removed lines).
    pub new_line: Option<u32>,
}

/// A contiguous hunk bounded by an `@@ ... @@` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffHunk {
    /// Starting line in the old file.
    pub old_start: u32,
    /// Number of lines on the old side.
    pub old_count: u32,
    /// Starting line in the new file.
    pub new_start: u32,
    /// Number of lines on the new side.
    pub new_count: u32,
    /// The lines in this hunk, in diff order.
    pub lines: Vec<DiffLine>,
}

/// One changed file from a merge request, as delivered by the
/// provider's changes endpoint: the raw per-file diff text plus
/// change flags. Hunks are parsed from `diff` on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file before the change.
    pub old_path: String,
    /// Path of the file after the change.
    pub new_path: String,
    /// Raw unified diff text for this file (hunks only, no `diff --git`
    /// header).
    pub diff: String,
    /// Whether this file was created in the MR.
    pub is_new: bool,
    /// Whether this file was deleted in the MR.
    pub is_deleted: bool,
    /// Whether this file was renamed in the MR.
    pub is_renamed: bool,
}

impl ChangedFile {
    /// Returns the most relevant file path (new path for non-deletes,
    /// old path for deletes).
    pub fn path(&self) -> &str {
        if self.is_deleted {
            &self.old_path
        } else {
            &self.new_path
        }
    }
}

/// Diff reference SHAs for a merge request.
///
/// Required for posting line-anchored comments: GitLab's position
/// payload needs all three to resolve a `new_line` against the diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffRefs {
    /// SHA of the merge base.
    pub base_sha: String,
    /// SHA the MR branched from.
    pub start_sha: String,
    /// SHA of the MR head.
    pub head_sha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(is_deleted: bool) -> ChangedFile {
        ChangedFile {
            old_path: "old.kt".into(),
            new_path: "new.kt".into(),
            diff: String::new(),
            is_new: false,
            is_deleted,
            is_renamed: false,
        }
    }

    #[test]
    fn path_prefers_new_path() {
        assert_eq!(file(false).path(), "new.kt");
    }

    #[test]
    fn path_uses_old_path_for_deletes() {
        assert_eq!(file(true).path(), "old.kt");
    }
}
