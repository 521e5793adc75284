//! Chunked fan-out for large merge requests.
//!
//! The engine runs dependency and impact analysis once over the whole
//! changeset; this module partitions the files into fixed-size,
//! order-preserving chunks, reviews each chunk concurrently, and
//! merges the recovered comments back in chunk order. Every chunk
//! prompt carries the global impact summary so no chunk reasons from
//! a partial view of the blast radius.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::ReviewConfig;
use crate::models::comment::LineComment;
use crate::models::diff::ChangedFile;
use crate::models::symbol::{DependencyInfo, UsedDependencyInfo};
use crate::provider::{self, ModelProvider};
use crate::recovery;
use crate::review::prompt;

/// Review `files` in fixed-size chunks and return the merged comments.
///
/// A chunk whose model call fails resolves to zero comments; the join
/// barrier is unconditional, so one bad chunk never takes down the
/// others or leaves tasks detached.
pub async fn review_chunks(
    model: Arc<dyn ModelProvider>,
    config: &ReviewConfig,
    files: &[ChangedFile],
    deps: &[DependencyInfo],
    used: &[UsedDependencyInfo],
    global_summary: &str,
) -> Vec<LineComment> {
    let chunk_size = config.chunk_size.max(1);
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
    let mut join_set = JoinSet::new();

    for (index, chunk) in files.chunks(chunk_size).enumerate() {
        let chunk_files: Vec<ChangedFile> = chunk.to_vec();
        let chunk_deps = filter_deps(deps, &chunk_files);
        let chunk_used = filter_used(used, &chunk_files);
        let summary = global_summary.to_string();
        let window = config.context_window;
        let model = Arc::clone(&model);
        let sem = Arc::clone(&semaphore);

        join_set.spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            debug!(chunk = index, files = chunk_files.len(), "reviewing chunk");

            let user_prompt = prompt::build_review_prompt(
                &chunk_files,
                &chunk_deps,
                &chunk_used,
                &summary,
                window,
            );
            let comments = match provider::complete_with_retry(
                model.as_ref(),
                prompt::SYSTEM_PROMPT,
                &user_prompt,
            )
            .await
            {
                Ok(reply) => recovery::parse_line_comments(&reply),
                Err(e) => {
                    warn!(chunk = index, error = %e, "chunk review failed");
                    Vec::new()
                }
            };
            (index, comments)
        });
    }

    let mut per_chunk: Vec<(usize, Vec<LineComment>)> = Vec::new();
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(entry) => per_chunk.push(entry),
            Err(e) => warn!(error = %e, "chunk review task panicked"),
        }
    }

    per_chunk.sort_by_key(|(index, _)| *index);
    per_chunk
        .into_iter()
        .flat_map(|(_, comments)| comments)
        .collect()
}

/// Dependency records whose declaring file is in the chunk.
fn filter_deps(deps: &[DependencyInfo], chunk: &[ChangedFile]) -> Vec<DependencyInfo> {
    deps.iter()
        .filter(|d| chunk.iter().any(|f| f.path() == d.symbol.file_path))
        .cloned()
        .collect()
}

/// Usage records for files in the chunk.
fn filter_used(used: &[UsedDependencyInfo], chunk: &[ChangedFile]) -> Vec<UsedDependencyInfo> {
    used.iter()
        .filter(|u| chunk.iter().any(|f| f.path() == u.file_path))
        .cloned()
        .collect()
}
