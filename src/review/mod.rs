//! Review engine: the single-pass path and the shared pipeline.
//!
//! One call runs the whole review for a merge request: dependency
//! analysis, impact classification, a model round-trip (chunked via
//! [`crate::orchestrator`] for large MRs), comment recovery, and
//! posting. Failures degrade to fewer comments rather than errors;
//! the engine itself never returns one.

pub mod prompt;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ReviewConfig;
use crate::impact;
use crate::models::comment::{CommentSummary, LineComment};
use crate::models::diff::{ChangedFile, DiffRefs};
use crate::models::symbol::{DependencyInfo, UsedDependencyInfo};
use crate::orchestrator;
use crate::provider::{self, ModelProvider};
use crate::publish::{CommentSink, Publisher};
use crate::recovery;
use crate::resolve::{CodeSearch, DependencyResolver};

/// What a completed review produced.
#[derive(Debug, Default)]
pub struct ReviewOutcome {
    /// Comments recovered from model replies.
    pub recovered: usize,
    /// Comments successfully posted (equals `recovered` in dry-run).
    pub posted: usize,
    /// Per-severity counts over the recovered comments.
    pub severity_counts: CommentSummary,
    pub has_breaking_changes: bool,
    pub impact_summary: String,
}

/// Runs reviews against a code-search collaborator, a model provider,
/// and a comment sink.
pub struct ReviewEngine {
    search: Arc<dyn CodeSearch>,
    model: Arc<dyn ModelProvider>,
    sink: Arc<dyn CommentSink>,
    config: ReviewConfig,
    branch_ref: String,
}

impl ReviewEngine {
    pub fn new(
        search: Arc<dyn CodeSearch>,
        model: Arc<dyn ModelProvider>,
        sink: Arc<dyn CommentSink>,
        config: ReviewConfig,
        branch_ref: impl Into<String>,
    ) -> Self {
        Self {
            search,
            model,
            sink,
            config,
            branch_ref: branch_ref.into(),
        }
    }

    /// Review one changeset and post the results.
    ///
    /// Without diff refs, line-anchored comments cannot be positioned,
    /// so the review is skipped with a warning. A fatal dependency-
    /// analysis failure aborts with zero comments; there is no
    /// degraded no-evidence fallback, since a review without
    /// dependency evidence is the kind of review this tool exists to
    /// avoid.
    pub async fn run(&self, files: &[ChangedFile], refs: Option<&DiffRefs>) -> ReviewOutcome {
        let Some(refs) = refs else {
            warn!("merge request has no diff refs; skipping review");
            return ReviewOutcome::default();
        };
        if files.is_empty() {
            info!("no changed files to review");
            return ReviewOutcome::default();
        }

        let resolver = DependencyResolver::new(Arc::clone(&self.search), &self.branch_ref);
        let deps = match resolver.forward(files).await {
            Ok(deps) => deps,
            Err(e) => {
                warn!(error = %e, "dependency analysis failed; aborting review");
                return ReviewOutcome::default();
            }
        };
        let used = resolver.backward(files).await;
        let analysis = impact::classify(files, &deps);
        info!(
            files = files.len(),
            dependencies = deps.len(),
            breaking = analysis.has_breaking_changes,
            "analysis complete"
        );

        let chunked = self.config.chunking_enabled && files.len() > self.config.chunk_size;
        let comments = if chunked {
            orchestrator::review_chunks(
                Arc::clone(&self.model),
                &self.config,
                files,
                &deps,
                &used,
                &analysis.summary,
            )
            .await
        } else {
            self.review_single(files, &deps, &used, &analysis.summary)
                .await
        };

        let publisher = Publisher::new(Arc::clone(&self.sink), self.config.dry_run);
        let posted = publisher.publish_comments(&comments, refs).await;
        if analysis.has_breaking_changes {
            publisher.publish_summary(&analysis.summary).await;
        }

        ReviewOutcome {
            recovered: comments.len(),
            posted,
            severity_counts: CommentSummary::from_comments(&comments),
            has_breaking_changes: analysis.has_breaking_changes,
            impact_summary: analysis.summary,
        }
    }

    /// One prompt, one model call, one recovery pass.
    async fn review_single(
        &self,
        files: &[ChangedFile],
        deps: &[DependencyInfo],
        used: &[UsedDependencyInfo],
        impact_summary: &str,
    ) -> Vec<LineComment> {
        let user_prompt = prompt::build_review_prompt(
            files,
            deps,
            used,
            impact_summary,
            self.config.context_window,
        );
        match provider::complete_with_retry(self.model.as_ref(), prompt::SYSTEM_PROMPT, &user_prompt)
            .await
        {
            Ok(reply) => recovery::parse_line_comments(&reply),
            Err(e) => {
                warn!(error = %e, "model call failed; no comments for this review");
                Vec::new()
            }
        }
    }
}
