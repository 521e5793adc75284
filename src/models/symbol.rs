//! Symbol and dependency types produced by the extraction and
//! resolution passes.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strum::Display;

/// What kind of declaration a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
    Interface,
    DataClass,
    Object,
    Property,
    Constant,
}

/// A symbol defined on an added line of a changed file.
///
/// Uniqueness is by name within one file's extraction pass; the first
/// match wins. Symbols are derived per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// File the symbol was declared in.
    pub file_path: String,
    /// Public unless an explicit restrictive modifier was recognized.
    pub is_public: bool,
}

/// How a used symbol is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UsageKind {
    Call,
    Instantiation,
    MemberAccess,
    Import,
}

/// A symbol that a changed file's new code references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsedSymbol {
    pub name: String,
    pub kind: UsageKind,
    /// New-file line number where the usage appears.
    pub line: u32,
    /// File the symbol resolved to, if a lookup found a definition
    /// outside the using file.
    pub resolved_from: Option<String>,
}

/// One location returned by the code-search collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub file_path: String,
    pub snippet: String,
    pub line: u32,
}

/// Forward-dependency record: one defined symbol plus the external
/// locations that reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub symbol: Symbol,
    /// External usages of the symbol (same-file hits are discarded
    /// during resolution).
    pub usages: Vec<SearchHit>,
    /// Files that reference the symbol, excluding its declaring file.
    pub affected_files: IndexSet<String>,
}

impl DependencyInfo {
    /// True iff the symbol is referenced from at least one other file.
    pub fn has_external_usages(&self) -> bool {
        !self.affected_files.is_empty()
    }
}

/// Backward-dependency record: one changed file plus the symbols its
/// new code uses and the external files those resolve to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsedDependencyInfo {
    pub file_path: String,
    pub used_symbols: Vec<UsedSymbol>,
    /// Files the used symbols resolved to (definitions live there).
    pub source_files: IndexSet<String>,
}
