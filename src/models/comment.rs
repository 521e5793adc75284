//! Review comment types: the terminal artifact the pipeline produces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a review comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note.
    Info,
    /// Optional improvement.
    Suggestion,
    /// Potential issue that should be addressed.
    Warning,
    /// Issue that must be fixed before merging.
    Critical,
}

/// Custom deserializer that accepts common LLM variations.
///
/// Models sometimes return values like "High", "Major", "Minor", or
/// "Note" instead of the four expected severities. Unrecognized values
/// fall back to `Info` rather than failing the entry.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Severity::from_model_str(&s))
    }
}

impl Severity {
    /// Case-insensitive mapping from free-text model output; defaults
    /// to `Info` for anything unrecognized.
    pub fn from_model_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" | "error" | "blocker" | "high" | "severe" => Severity::Critical,
            "warning" | "warn" | "major" | "medium" => Severity::Warning,
            "suggestion" | "minor" | "style" | "nit" => Severity::Suggestion,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Suggestion => write!(f, "suggestion"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A single line-anchored review comment.
///
/// Handed to the comment-posting collaborator and then discarded;
/// nothing is persisted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineComment {
    /// File path relative to the repo root.
    pub file_path: String,
    /// Target line number in the new file (1-based).
    pub new_line: u32,
    pub severity: Severity,
    /// Free-text comment body.
    pub comment: String,
}

/// Summary statistics for a review run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentSummary {
    pub total: usize,
    pub critical: usize,
    pub warnings: usize,
    pub suggestions: usize,
    pub info: usize,
}

impl CommentSummary {
    /// Compute summary counts from a list of comments.
    pub fn from_comments(comments: &[LineComment]) -> Self {
        let mut s = CommentSummary::default();
        for c in comments {
            s.total += 1;
            match c.severity {
                Severity::Critical => s.critical += 1,
                Severity::Warning => s.warnings += 1,
                Severity::Suggestion => s.suggestions += 1,
                Severity::Info => s.info += 1,
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Suggestion);
        assert!(Severity::Suggestion < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn severity_lenient_mapping() {
        assert_eq!(Severity::from_model_str("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::from_model_str("Major"), Severity::Warning);
        assert_eq!(Severity::from_model_str("nit"), Severity::Suggestion);
        assert_eq!(Severity::from_model_str("info"), Severity::Info);
        // Unrecognized values default to Info
        assert_eq!(Severity::from_model_str("catastrophic"), Severity::Info);
        assert_eq!(Severity::from_model_str(""), Severity::Info);
    }

    #[test]
    fn severity_deserialize_is_lenient() {
        let s: Severity = serde_json::from_str(r#""Blocker""#).unwrap();
        assert_eq!(s, Severity::Critical);
        let s: Severity = serde_json::from_str(r#""whatever""#).unwrap();
        assert_eq!(s, Severity::Info);
    }

    #[test]
    fn summary_from_comments() {
        let make = |severity| LineComment {
            file_path: "a.kt".into(),
            new_line: 1,
            severity,
            comment: "c".into(),
        };
        let comments = vec![
            make(Severity::Critical),
            make(Severity::Warning),
            make(Severity::Warning),
            make(Severity::Info),
        ];
        let s = CommentSummary::from_comments(&comments);
        assert_eq!(s.total, 4);
        assert_eq!(s.critical, 1);
        assert_eq!(s.warnings, 2);
        assert_eq!(s.suggestions, 0);
        assert_eq!(s.info, 1);
    }
}
