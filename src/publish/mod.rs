//! Posting recovered comments back to the merge request.
//!
//! The [`CommentSink`] trait abstracts the hosting platform; the
//! GitLab implementation lives in [`crate::gitlab`]. The publisher
//! groups comments by file, posts them one at a time, and counts
//! successes. Individual post failures are logged and skipped so one
//! stale line anchor never sinks the rest of the review.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::comment::{LineComment, Severity};
use crate::models::diff::DiffRefs;

/// Errors from the comment sink.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("post request failed: {0}")]
    Request(String),

    #[error("sink returned status {0}: {1}")]
    Status(u16, String),
}

/// Destination for review output: per-line comments and one optional
/// review-wide summary note.
#[async_trait]
pub trait CommentSink: Send + Sync {
    /// Post one line-anchored comment against the given diff refs.
    async fn post_line_comment(
        &self,
        comment: &LineComment,
        refs: &DiffRefs,
    ) -> Result<(), PublishError>;

    /// Post a general (non-anchored) note on the merge request.
    async fn post_summary_note(&self, body: &str) -> Result<(), PublishError>;
}

/// Posts a batch of comments through a sink, grouped by file.
pub struct Publisher {
    sink: Arc<dyn CommentSink>,
    dry_run: bool,
}

impl Publisher {
    pub fn new(sink: Arc<dyn CommentSink>, dry_run: bool) -> Self {
        Self { sink, dry_run }
    }

    /// Post every comment, grouped by file in first-seen order.
    /// Returns the number of successfully posted comments; in dry-run
    /// mode every comment is logged and counted without posting.
    pub async fn publish_comments(&self, comments: &[LineComment], refs: &DiffRefs) -> usize {
        let mut by_file: IndexMap<&str, Vec<&LineComment>> = IndexMap::new();
        for comment in comments {
            by_file
                .entry(comment.file_path.as_str())
                .or_default()
                .push(comment);
        }

        let mut posted = 0usize;
        for (file, file_comments) in by_file {
            info!(file, count = file_comments.len(), "posting comments");
            for comment in file_comments {
                if self.dry_run {
                    info!(
                        file = %comment.file_path,
                        line = comment.new_line,
                        severity = %comment.severity,
                        "dry-run: would post comment"
                    );
                    posted += 1;
                    continue;
                }
                match self.sink.post_line_comment(comment, refs).await {
                    Ok(()) => posted += 1,
                    Err(e) => {
                        warn!(
                            file = %comment.file_path,
                            line = comment.new_line,
                            error = %e,
                            "failed to post comment"
                        );
                    }
                }
            }
        }

        posted
    }

    /// Post one review-wide summary note. Failure is logged, not
    /// propagated.
    pub async fn publish_summary(&self, body: &str) {
        if self.dry_run {
            info!("dry-run: would post summary note");
            return;
        }
        if let Err(e) = self.sink.post_summary_note(body).await {
            warn!(error = %e, "failed to post summary note");
        }
    }
}

/// Render a comment body with a severity badge line, for the MR UI.
pub fn render_comment_body(comment: &LineComment) -> String {
    format!("{}\n\n{}", severity_badge(comment.severity), comment.comment)
}

fn severity_badge(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴 **Critical**",
        Severity::Warning => "🟡 **Warning**",
        Severity::Suggestion => "🔵 **Suggestion**",
        Severity::Info => "⚪ **Info**",
    }
}
