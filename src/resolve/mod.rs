//! Dependency resolution via an external code-search collaborator.
//!
//! Forward analysis finds where a symbol defined in the changeset is
//! used elsewhere; backward analysis finds where a symbol the changeset
//! uses is defined. Both issue one search per symbol and recover from
//! individual query failures by treating them as "no external usage".

use async_trait::async_trait;
use indexmap::IndexSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::diff;
use crate::models::diff::ChangedFile;
use crate::models::symbol::{DependencyInfo, SearchHit, UsedDependencyInfo};
use crate::symbols;

/// Errors from the code-search collaborator.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search backend returned status {0}")]
    Status(u16),

    #[error("search not configured: {0}")]
    NotConfigured(String),
}

impl SearchError {
    /// Errors that will fail every query in a batch (bad credentials,
    /// missing configuration). Per-symbol recovery is pointless for
    /// these; the batch owner decides whether to abort.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SearchError::NotConfigured(_) | SearchError::Status(401 | 403))
    }
}

/// Code-search capability, scoped to a project and branch.
#[async_trait]
pub trait CodeSearch: Send + Sync {
    /// Search for `query` on `branch_ref`; may return an empty list.
    async fn search(&self, query: &str, branch_ref: &str) -> Result<Vec<SearchHit>, SearchError>;
}

/// Runs forward and backward dependency analysis over a changeset.
pub struct DependencyResolver {
    search: Arc<dyn CodeSearch>,
    branch_ref: String,
}

impl DependencyResolver {
    pub fn new(search: Arc<dyn CodeSearch>, branch_ref: impl Into<String>) -> Self {
        Self {
            search,
            branch_ref: branch_ref.into(),
        }
    }

    /// Forward analysis: for every symbol defined in the changeset,
    /// find the external files that reference it. Symbols with zero
    /// external usages are dropped.
    ///
    /// Individual query failures degrade that symbol to "no external
    /// usage"; fatal collaborator errors (auth, missing config) abort
    /// the batch since every remaining query would fail the same way.
    pub async fn forward(
        &self,
        files: &[ChangedFile],
    ) -> Result<Vec<DependencyInfo>, SearchError> {
        let mut deps = Vec::new();

        for file in files {
            let hunks = diff::parse(&file.diff);
            for symbol in symbols::extract_symbols(file, &hunks) {
                let hits = match self.search.search(&symbol.name, &self.branch_ref).await {
                    Ok(hits) => hits,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!(symbol = %symbol.name, error = %e, "symbol search failed");
                        continue;
                    }
                };

                let external: Vec<SearchHit> = hits
                    .into_iter()
                    .filter(|hit| hit.file_path != symbol.file_path)
                    .collect();
                if external.is_empty() {
                    continue;
                }

                let affected_files: IndexSet<String> =
                    external.iter().map(|h| h.file_path.clone()).collect();
                debug!(
                    symbol = %symbol.name,
                    affected = affected_files.len(),
                    "forward dependency"
                );
                deps.push(DependencyInfo {
                    symbol,
                    usages: external,
                    affected_files,
                });
            }
        }

        Ok(deps)
    }

    /// Backward analysis: for every symbol a changed file's new code
    /// uses, record the first external file that defines it (if any).
    /// Unresolved symbols are kept without a definition; failures never
    /// abort the batch.
    pub async fn backward(&self, files: &[ChangedFile]) -> Vec<UsedDependencyInfo> {
        let mut infos = Vec::new();

        for file in files {
            let hunks = diff::parse(&file.diff);
            let mut used = symbols::extract_used_symbols(file, &hunks);
            if used.is_empty() {
                continue;
            }

            let mut source_files = IndexSet::new();
            for usage in &mut used {
                let hits = match self.search.search(&usage.name, &self.branch_ref).await {
                    Ok(hits) => hits,
                    Err(e) => {
                        warn!(symbol = %usage.name, error = %e, "usage search failed");
                        continue;
                    }
                };
                if let Some(hit) = hits.iter().find(|h| h.file_path != file.path()) {
                    usage.resolved_from = Some(hit.file_path.clone());
                    source_files.insert(hit.file_path.clone());
                }
            }

            infos.push(UsedDependencyInfo {
                file_path: file.path().to_string(),
                used_symbols: used,
                source_files,
            });
        }

        infos
    }
}
