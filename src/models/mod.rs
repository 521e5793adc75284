//! Shared types used across all modules.
//!
//! This module defines the core data structures for diffs, symbols,
//! impact analysis, and review comments. Other modules import from
//! here rather than reaching into each other's internals.

pub mod comment;
pub mod diff;
pub mod impact;
pub mod symbol;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use comment::{CommentSummary, LineComment, Severity};
pub use diff::{ChangedFile, DiffHunk, DiffLine, DiffLineKind, DiffRefs};
pub use impact::{CrossFileAnalysisResult, CrossFileImpact, ImpactLevel};
pub use symbol::{
    DependencyInfo, SearchHit, Symbol, SymbolKind, UsageKind, UsedDependencyInfo, UsedSymbol,
};

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    /// Any OpenAI-compatible API (e.g. Ollama, Together, local servers).
    #[serde(rename = "openai-compatible", alias = "openai_compatible")]
    OpenAICompatible,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::Anthropic => write!(f, "anthropic"),
            ProviderName::OpenAI => write!(f, "openai"),
            ProviderName::OpenAICompatible => write!(f, "openai-compatible"),
        }
    }
}

impl ProviderName {
    /// Conventional provider-specific API key environment variable.
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
            ProviderName::OpenAI | ProviderName::OpenAICompatible => "OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(ProviderName::Anthropic),
            "openai" => Ok(ProviderName::OpenAI),
            "openai-compatible" | "openai_compatible" => Ok(ProviderName::OpenAICompatible),
            _ => Err(format!("unknown provider: {s}")),
        }
    }
}
