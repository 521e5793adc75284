//! Cross-file impact types.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strum::Display;

/// How severely a changed file affects the rest of the codebase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// One changed file's impact verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossFileImpact {
    pub file_path: String,
    pub level: ImpactLevel,
    /// External files affected by this file's changes.
    pub affected_files: IndexSet<String>,
    /// Human-readable breaking-change descriptions.
    pub breaking_changes: Vec<String>,
    /// Natural-language description of the verdict.
    pub description: String,
}

/// Aggregate of all per-file impacts for one review request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossFileAnalysisResult {
    pub impacts: Vec<CrossFileImpact>,
    pub has_critical_impact: bool,
    pub has_breaking_changes: bool,
    /// Textual summary: counts per level plus breaking-change list.
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_level_ordering() {
        assert!(ImpactLevel::Low < ImpactLevel::Medium);
        assert!(ImpactLevel::Medium < ImpactLevel::High);
        assert!(ImpactLevel::High < ImpactLevel::Critical);
    }

    #[test]
    fn impact_level_display() {
        assert_eq!(ImpactLevel::Critical.to_string(), "critical");
        assert_eq!(ImpactLevel::Low.to_string(), "low");
    }
}
