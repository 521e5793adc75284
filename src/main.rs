//! ripplecheck — cross-file impact aware AI merge request reviewer.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use ripplecheck::config::Config;
use ripplecheck::constants;
use ripplecheck::env::Env;
use ripplecheck::gitlab::GitLabClient;
use ripplecheck::provider::rig::RigProvider;
use ripplecheck::provider::ModelProvider;
use ripplecheck::publish::CommentSink;
use ripplecheck::resolve::CodeSearch;
use ripplecheck::review::ReviewEngine;

/// Review a GitLab merge request for cross-file impact.
#[derive(Parser, Debug)]
#[command(name = constants::APP_NAME, version, about)]
struct Cli {
    /// GitLab project ID or full path (e.g. `group/app`).
    #[arg(long)]
    project: Option<String>,

    /// Merge request IID to review.
    #[arg(long)]
    mr: u64,

    /// Branch ref to search for dependencies (defaults to the MR's
    /// head SHA).
    #[arg(long)]
    branch: Option<String>,

    /// Files per chunk in the fan-out path.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Force the single-pass path regardless of MR size.
    #[arg(long)]
    no_chunking: bool,

    /// Log comments instead of posting them.
    #[arg(long)]
    dry_run: bool,

    /// Path to a config file (defaults to `.ripplecheck.toml` in the
    /// working directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", constants::APP_NAME))),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{} {err:#}", "Error:".red().bold());
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(Some(Path::new(".")), cli.config.as_deref(), &Env::real())
        .context("failed to load configuration")?;

    // CLI flags take precedence over config and environment.
    if let Some(project) = cli.project {
        config.gitlab.project = Some(project);
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.review.chunk_size = chunk_size;
    }
    if cli.no_chunking {
        config.review.chunking_enabled = false;
    }
    if cli.dry_run {
        config.review.dry_run = true;
    }

    let client = Arc::new(
        GitLabClient::new(&config.gitlab, cli.mr).map_err(|e| anyhow::anyhow!("{e}"))?,
    );
    let changes = client
        .fetch_changes()
        .await
        .context("failed to fetch merge request changes")?;

    let branch_ref = cli
        .branch
        .or_else(|| changes.diff_refs.as_ref().map(|r| r.head_sha.clone()))
        .unwrap_or_else(|| "HEAD".to_string());

    let model: Arc<dyn ModelProvider> = Arc::new(
        RigProvider::new(config.provider.clone()).map_err(|e| anyhow::anyhow!("{e}"))?,
    );
    let search: Arc<dyn CodeSearch> = client.clone();
    let sink: Arc<dyn CommentSink> = client.clone();

    let engine = ReviewEngine::new(search, model, sink, config.review.clone(), branch_ref);
    let outcome = engine
        .run(&changes.files, changes.diff_refs.as_ref())
        .await;

    println!(
        "\n{} reviewed {} file(s)",
        constants::APP_NAME.bold(),
        changes.files.len()
    );
    println!(
        "  {}  {}",
        "comments:".cyan(),
        format!("{} posted / {} recovered", outcome.posted, outcome.recovered)
    );
    let counts = &outcome.severity_counts;
    if counts.total > 0 {
        println!(
            "  {}  {} critical, {} warning, {} suggestion, {} info",
            "severity:".cyan(),
            counts.critical.to_string().red(),
            counts.warnings.to_string().yellow(),
            counts.suggestions,
            counts.info,
        );
    }
    if outcome.has_breaking_changes {
        println!("  {}  {}", "breaking:".cyan(), "yes".red().bold());
    }
    if !outcome.impact_summary.is_empty() {
        println!("\n{}", outcome.impact_summary.dimmed());
    }
    if config.review.dry_run {
        println!("\n{}", "(dry-run: nothing was posted)".yellow());
    }

    Ok(())
}
