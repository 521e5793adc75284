//! Cross-file impact classification.
//!
//! Assigns an impact level per changed file from its forward-dependency
//! records, and detects breaking changes by re-inspecting the raw diff
//! text around each affected symbol.

use indexmap::IndexSet;
use std::fmt::Write as _;

use crate::models::diff::ChangedFile;
use crate::models::impact::{CrossFileAnalysisResult, CrossFileImpact, ImpactLevel};
use crate::models::symbol::DependencyInfo;

/// How a symbol's declaration moved in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolChange {
    /// Both a deletion and an addition mention the name.
    Modified,
    /// Deletion only.
    Deleted,
    /// Addition only.
    Added,
    Unchanged,
}

/// Classify every changed file against its dependency records.
pub fn classify(files: &[ChangedFile], deps: &[DependencyInfo]) -> CrossFileAnalysisResult {
    let impacts: Vec<CrossFileImpact> = files
        .iter()
        .map(|file| classify_file(file, deps))
        .collect();

    let has_critical_impact = impacts.iter().any(|i| i.level == ImpactLevel::Critical);
    let has_breaking_changes = impacts.iter().any(|i| !i.breaking_changes.is_empty());
    let summary = build_summary(&impacts);

    CrossFileAnalysisResult {
        impacts,
        has_critical_impact,
        has_breaking_changes,
        summary,
    }
}

/// Produce one file's impact verdict.
fn classify_file(file: &ChangedFile, all_deps: &[DependencyInfo]) -> CrossFileImpact {
    let path = file.path();
    let file_deps: Vec<&DependencyInfo> = all_deps
        .iter()
        .filter(|d| d.symbol.file_path == path)
        .collect();

    if file.is_deleted && !file_deps.is_empty() {
        let affected = union_affected(&file_deps);
        let breaking = vec![format!(
            "File {path} was deleted but is still referenced by {} file(s)",
            affected.len()
        )];
        return CrossFileImpact {
            file_path: path.to_string(),
            level: ImpactLevel::Critical,
            affected_files: affected,
            breaking_changes: breaking,
            description: format!("Deleted file {path} still has dependents"),
        };
    }

    if file_deps.is_empty() {
        return CrossFileImpact {
            file_path: path.to_string(),
            level: ImpactLevel::Low,
            affected_files: IndexSet::new(),
            breaking_changes: vec![],
            description: format!("No external dependencies recorded for {path}"),
        };
    }

    let affected = union_affected(&file_deps);
    let usage_count: usize = file_deps.iter().map(|d| d.usages.len()).sum();
    let any_public = file_deps.iter().any(|d| d.symbol.is_public);
    let level = decide_level(affected.len(), usage_count, any_public);
    let breaking_changes = detect_breaking_changes(file, &file_deps);

    let description = format!(
        "{} symbol(s) in {path} are referenced from {} other file(s) ({usage_count} usage(s))",
        file_deps.len(),
        affected.len(),
    );

    CrossFileImpact {
        file_path: path.to_string(),
        level,
        affected_files: affected,
        breaking_changes,
        description,
    }
}

fn union_affected(deps: &[&DependencyInfo]) -> IndexSet<String> {
    deps.iter()
        .flat_map(|d| d.affected_files.iter().cloned())
        .collect()
}

/// Ordered thresholds, checked in precedence order.
fn decide_level(affected_files: usize, usages: usize, any_public: bool) -> ImpactLevel {
    if affected_files >= 10 || usages >= 20 {
        ImpactLevel::Critical
    } else if affected_files >= 5 || (usages >= 10 && any_public) {
        ImpactLevel::High
    } else if affected_files >= 2 || usages >= 5 {
        ImpactLevel::Medium
    } else {
        ImpactLevel::Low
    }
}

/// Re-scan the raw diff for each symbol's name and classify how its
/// declaration moved. Only modified/deleted public symbols that still
/// have external usages surface as breaking changes.
fn detect_breaking_changes(file: &ChangedFile, deps: &[&DependencyInfo]) -> Vec<String> {
    let mut breaking = Vec::new();

    for dep in deps {
        if !dep.symbol.is_public || !dep.has_external_usages() {
            continue;
        }
        match symbol_change(&file.diff, &dep.symbol.name) {
            SymbolChange::Modified => breaking.push(format!(
                "Signature of public symbol `{}` was modified; {} file(s) depend on it",
                dep.symbol.name,
                dep.affected_files.len()
            )),
            SymbolChange::Deleted => breaking.push(format!(
                "Public symbol `{}` was deleted; {} file(s) depend on it",
                dep.symbol.name,
                dep.affected_files.len()
            )),
            SymbolChange::Added | SymbolChange::Unchanged => {}
        }
    }

    breaking
}

fn symbol_change(diff_text: &str, name: &str) -> SymbolChange {
    let mut in_deletion = false;
    let mut in_addition = false;

    for line in diff_text.lines() {
        if !line.contains(name) {
            continue;
        }
        if line.starts_with('-') {
            in_deletion = true;
        } else if line.starts_with('+') {
            in_addition = true;
        }
    }

    match (in_deletion, in_addition) {
        (true, true) => SymbolChange::Modified,
        (true, false) => SymbolChange::Deleted,
        (false, true) => SymbolChange::Added,
        (false, false) => SymbolChange::Unchanged,
    }
}

/// Enumerate counts per level and list breaking changes.
fn build_summary(impacts: &[CrossFileImpact]) -> String {
    let count = |level| impacts.iter().filter(|i| i.level == level).count();
    let mut summary = format!(
        "Cross-file impact: {} critical, {} high, {} medium, {} low",
        count(ImpactLevel::Critical),
        count(ImpactLevel::High),
        count(ImpactLevel::Medium),
        count(ImpactLevel::Low),
    );

    let breaking: Vec<&String> = impacts.iter().flat_map(|i| &i.breaking_changes).collect();
    if !breaking.is_empty() {
        let _ = write!(summary, "\nBreaking changes:");
        for change in breaking {
            let _ = write!(summary, "\n- {change}");
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::symbol::{SearchHit, Symbol, SymbolKind};

    fn changed(path: &str, diff: &str) -> ChangedFile {
        ChangedFile {
            old_path: path.to_string(),
            new_path: path.to_string(),
            diff: diff.to_string(),
            is_new: false,
            is_deleted: false,
            is_renamed: false,
        }
    }

    fn dep(name: &str, file: &str, is_public: bool, affected: &[&str], usages: usize) -> DependencyInfo {
        DependencyInfo {
            symbol: Symbol {
                name: name.to_string(),
                kind: SymbolKind::Function,
                file_path: file.to_string(),
                is_public,
            },
            usages: (0..usages)
                .map(|i| SearchHit {
                    file_path: affected
                        .get(i % affected.len().max(1))
                        .unwrap_or(&"other.kt")
                        .to_string(),
                    snippet: String::new(),
                    line: i as u32 + 1,
                })
                .collect(),
            affected_files: affected.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn no_dependencies_is_low_impact() {
        let file = changed("src/A.kt", "@@ -1,1 +1,1 @@\n-x\n+y");
        let result = classify(&[file], &[]);
        assert_eq!(result.impacts.len(), 1);
        assert_eq!(result.impacts[0].level, ImpactLevel::Low);
        assert!(result.impacts[0].breaking_changes.is_empty());
        assert!(!result.has_critical_impact);
        assert!(!result.has_breaking_changes);
    }

    #[test]
    fn deleted_file_with_dependents_is_critical() {
        let mut file = changed("src/A.kt", "@@ -1,2 +0,0 @@\n-fun gone() {\n-}");
        file.is_deleted = true;
        let deps = vec![dep("gone", "src/A.kt", true, &["src/B.kt"], 1)];
        let result = classify(&[file], &deps);
        assert_eq!(result.impacts[0].level, ImpactLevel::Critical);
        assert!(!result.impacts[0].breaking_changes.is_empty());
        assert!(result.has_critical_impact);
    }

    #[test]
    fn threshold_precedence() {
        assert_eq!(decide_level(10, 0, false), ImpactLevel::Critical);
        assert_eq!(decide_level(0, 20, false), ImpactLevel::Critical);
        assert_eq!(decide_level(5, 0, false), ImpactLevel::High);
        assert_eq!(decide_level(0, 10, true), ImpactLevel::High);
        // 10 usages without a public symbol falls through to Medium.
        assert_eq!(decide_level(0, 10, false), ImpactLevel::Medium);
        assert_eq!(decide_level(2, 0, false), ImpactLevel::Medium);
        assert_eq!(decide_level(0, 5, false), ImpactLevel::Medium);
        assert_eq!(decide_level(1, 4, true), ImpactLevel::Low);
    }

    #[test]
    fn impact_is_monotonic_in_affected_files() {
        let mut previous = ImpactLevel::Low;
        for affected in [1usize, 2, 5, 10] {
            let level = decide_level(affected, 3, true);
            assert!(level >= previous, "level must not decrease as reach grows");
            previous = level;
        }
    }

    #[test]
    fn modified_public_symbol_is_breaking() {
        let diff = "@@ -1,1 +1,1 @@\n-fun chargeCard(id: Long) {\n+fun chargeCard(id: Long, retry: Boolean) {";
        let file = changed("src/Billing.kt", diff);
        let deps = vec![dep("chargeCard", "src/Billing.kt", true, &["src/Checkout.kt"], 1)];
        let result = classify(&[file], &deps);
        let breaking = &result.impacts[0].breaking_changes;
        assert_eq!(breaking.len(), 1);
        assert!(breaking[0].contains("modified"));
        assert!(result.has_breaking_changes);
    }

    #[test]
    fn deleted_symbol_is_breaking() {
        let diff = "@@ -1,1 +1,0 @@\n-fun chargeCard(id: Long) {";
        let file = changed("src/Billing.kt", diff);
        let deps = vec![dep("chargeCard", "src/Billing.kt", true, &["src/Checkout.kt"], 1)];
        let result = classify(&[file], &deps);
        assert!(result.impacts[0].breaking_changes[0].contains("deleted"));
    }

    #[test]
    fn added_symbol_is_not_breaking() {
        let diff = "@@ -1,0 +1,1 @@\n+fun chargeCard(id: Long) {";
        let file = changed("src/Billing.kt", diff);
        let deps = vec![dep("chargeCard", "src/Billing.kt", true, &["src/Checkout.kt"], 1)];
        let result = classify(&[file], &deps);
        assert!(result.impacts[0].breaking_changes.is_empty());
    }

    #[test]
    fn private_symbols_never_surface_as_breaking() {
        let diff = "@@ -1,1 +1,0 @@\n-private fun helper() {";
        let file = changed("src/Billing.kt", diff);
        let deps = vec![dep("helper", "src/Billing.kt", false, &["src/Checkout.kt"], 1)];
        let result = classify(&[file], &deps);
        assert!(result.impacts[0].breaking_changes.is_empty());
    }

    #[test]
    fn summary_lists_counts_and_breaking_changes() {
        let diff = "@@ -1,1 +1,0 @@\n-fun chargeCard(id: Long) {";
        let file = changed("src/Billing.kt", diff);
        let deps = vec![dep("chargeCard", "src/Billing.kt", true, &["src/A.kt", "src/B.kt"], 6)];
        let result = classify(&[file], &deps);
        assert!(result.summary.contains("medium"));
        assert!(result.summary.contains("Breaking changes:"));
        assert!(result.summary.contains("chargeCard"));
    }

    #[test]
    fn dependencies_of_other_files_are_ignored() {
        let file = changed("src/A.kt", "@@ -1,1 +1,1 @@\n-x\n+y");
        let deps = vec![dep("other", "src/Z.kt", true, &["src/B.kt"], 1)];
        let result = classify(&[file], &deps);
        assert_eq!(result.impacts[0].level, ImpactLevel::Low);
    }
}
