//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.ripplecheck.toml` in the working directory
//! 4. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants;
use crate::env::Env;
use crate::models::ProviderName;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gitlab: GitLabConfig,
    pub provider: ProviderConfig,
    pub review: ReviewConfig,
}

/// GitLab connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// Numeric project ID or full path (e.g. `group/app`).
    pub project: Option<String>,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gitlab.com".to_string(),
            token: None,
            project: None,
        }
    }
}

/// LLM provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::Anthropic,
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

/// Review pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Files per chunk in the fan-out path.
    pub chunk_size: usize,
    /// Disable to force the single-pass path regardless of MR size.
    pub chunking_enabled: bool,
    /// Context lines kept around changed lines when building prompts.
    pub context_window: usize,
    /// Maximum concurrent chunk reviews.
    pub max_concurrent: usize,
    /// Log comments instead of posting them.
    pub dry_run: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            chunking_enabled: true,
            context_window: 3,
            max_concurrent: 4,
            dry_run: false,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads `.ripplecheck.toml` from `dir` (or the explicit `file`
    /// when given), then applies environment variable overrides.
    pub fn load(dir: Option<&Path>, file: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let local_path = match file {
            Some(path) => Some(path.to_path_buf()),
            None => dir.map(|d| d.join(constants::CONFIG_FILENAME)),
        };
        if let Some(path) = local_path {
            // An explicitly named file must exist; the default one is
            // optional.
            if path.exists() || file.is_some() {
                let local = Self::load_file(&path)?;
                config.merge(local);
            }
        }

        config.apply_env_vars(env);
        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Merge another config into this one (other takes precedence for
    /// non-default values).
    fn merge(&mut self, other: Config) {
        let default_gitlab = GitLabConfig::default();
        if other.gitlab.base_url != default_gitlab.base_url {
            self.gitlab.base_url = other.gitlab.base_url;
        }
        if other.gitlab.token.is_some() {
            self.gitlab.token = other.gitlab.token;
        }
        if other.gitlab.project.is_some() {
            self.gitlab.project = other.gitlab.project;
        }

        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if other.provider.model != default_provider.model {
            self.provider.model = other.provider.model;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }

        let default_review = ReviewConfig::default();
        if other.review.chunk_size != default_review.chunk_size {
            self.review.chunk_size = other.review.chunk_size;
        }
        if other.review.chunking_enabled != default_review.chunking_enabled {
            self.review.chunking_enabled = other.review.chunking_enabled;
        }
        if other.review.context_window != default_review.context_window {
            self.review.context_window = other.review.context_window;
        }
        if other.review.max_concurrent != default_review.max_concurrent {
            self.review.max_concurrent = other.review.max_concurrent;
        }
        if other.review.dry_run {
            self.review.dry_run = true;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Ok(val) = env.var(constants::ENV_GITLAB_URL) {
            self.gitlab.base_url = val;
        }
        let token = env
            .var(constants::ENV_GITLAB_TOKEN)
            .or_else(|_| env.var(constants::ENV_GITLAB_TOKEN_FALLBACK))
            .ok();
        if token.is_some() {
            self.gitlab.token = token;
        }
        if let Ok(val) = env.var(constants::ENV_GITLAB_PROJECT) {
            self.gitlab.project = Some(val);
        }

        if let Ok(val) = env.var(constants::ENV_PROVIDER) {
            if let Ok(name) = val.parse::<ProviderName>() {
                self.provider.name = name;
            } else {
                eprintln!(
                    "Warning: ignoring invalid {} value: {val}",
                    constants::ENV_PROVIDER
                );
            }
        }
        if let Ok(val) = env.var(constants::ENV_MODEL) {
            self.provider.model = val;
        }
        if let Ok(val) = env.var(constants::ENV_PROVIDER_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        // Provider-specific API key resolution
        let api_key = env
            .var(constants::ENV_PROVIDER_API_KEY)
            .or_else(|_| env.var(self.provider.name.api_key_env_var()))
            .ok();
        if api_key.is_some() {
            self.provider.api_key = api_key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.gitlab.base_url, "https://gitlab.com");
        assert_eq!(config.provider.name, ProviderName::Anthropic);
        assert_eq!(config.review.chunk_size, 10);
        assert!(config.review.chunking_enabled);
        assert!(!config.review.dry_run);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[gitlab]
base_url = "https://gitlab.internal.example.com"
project = "platform/billing"

[provider]
name = "openai"
model = "gpt-4o"

[review]
chunk_size = 5
max_concurrent = 2
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.gitlab.base_url,
            "https://gitlab.internal.example.com"
        );
        assert_eq!(config.gitlab.project.as_deref(), Some("platform/billing"));
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.review.chunk_size, 5);
        assert_eq!(config.review.max_concurrent, 2);
    }

    #[test]
    fn provider_name_underscore_spelling_in_toml() {
        let config: Config =
            toml::from_str("[provider]\nname = \"openai_compatible\"\n").unwrap();
        assert_eq!(config.provider.name, ProviderName::OpenAICompatible);
    }

    #[test]
    fn merge_overrides_non_default_values() {
        let mut base = Config::default();
        let mut other = Config::default();
        other.gitlab.token = Some("glpat-test".to_string());
        other.provider.model = "gpt-4o".to_string();
        other.review.chunk_size = 3;
        other.review.dry_run = true;

        base.merge(other);

        assert_eq!(base.gitlab.token.as_deref(), Some("glpat-test"));
        assert_eq!(base.provider.model, "gpt-4o");
        assert_eq!(base.review.chunk_size, 3);
        assert!(base.review.dry_run);
    }

    #[test]
    fn merge_keeps_base_when_other_is_default() {
        let mut base = Config::default();
        base.provider.name = ProviderName::OpenAI;
        base.review.chunk_size = 7;

        base.merge(Config::default());

        assert_eq!(base.provider.name, ProviderName::OpenAI);
        assert_eq!(base.review.chunk_size, 7);
    }

    #[test]
    fn load_from_directory() {
        let env = Env::mock(Vec::<(&str, &str)>::new());
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".ripplecheck.toml"),
            r#"
[provider]
name = "openai"
model = "gpt-4o"
"#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), None, &env).unwrap();
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.provider.model, "gpt-4o");
    }

    #[test]
    fn load_without_config_file_gives_defaults() {
        let env = Env::mock(Vec::<(&str, &str)>::new());
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path()), None, &env).unwrap();
        assert_eq!(config.provider.name, ProviderName::Anthropic);
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let env = Env::mock(Vec::<(&str, &str)>::new());
        let result = Config::load(
            None,
            Some(Path::new("/tmp/ripplecheck_missing_config.toml")),
            &env,
        );
        assert!(result.is_err());
    }

    #[test]
    fn load_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();
        let result = Config::load_file(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("parse"));
    }

    #[test]
    fn env_overrides_file_values() {
        let env = Env::mock([
            ("RIPPLECHECK_PROVIDER", "openai"),
            ("RIPPLECHECK_API_KEY", "sk-env-test"),
            ("RIPPLECHECK_GITLAB_TOKEN", "glpat-env"),
            ("RIPPLECHECK_PROJECT", "group/app"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env-test"));
        assert_eq!(config.gitlab.token.as_deref(), Some("glpat-env"));
        assert_eq!(config.gitlab.project.as_deref(), Some("group/app"));
    }

    #[test]
    fn gitlab_token_fallback_env() {
        let env = Env::mock([("GITLAB_TOKEN", "glpat-ci")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.gitlab.token.as_deref(), Some("glpat-ci"));
    }

    #[test]
    fn provider_specific_api_key_fallback() {
        let env = Env::mock([("ANTHROPIC_API_KEY", "sk-ant-test")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-ant-test"));
    }

    #[test]
    fn invalid_provider_env_is_ignored() {
        let env = Env::mock([("RIPPLECHECK_PROVIDER", "not-a-provider")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::Anthropic);
    }
}
