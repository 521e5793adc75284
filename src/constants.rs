//! App-wide constants.
//!
//! Centralises the tool name, config paths, and environment variable
//! names so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "ripplecheck";

/// Local config filename (e.g. `.ripplecheck.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".ripplecheck.toml";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_GITLAB_URL: &str = "RIPPLECHECK_GITLAB_URL";
pub const ENV_GITLAB_TOKEN: &str = "RIPPLECHECK_GITLAB_TOKEN";
pub const ENV_GITLAB_PROJECT: &str = "RIPPLECHECK_PROJECT";
pub const ENV_PROVIDER: &str = "RIPPLECHECK_PROVIDER";
pub const ENV_MODEL: &str = "RIPPLECHECK_MODEL";
pub const ENV_PROVIDER_API_KEY: &str = "RIPPLECHECK_API_KEY";
pub const ENV_PROVIDER_BASE_URL: &str = "RIPPLECHECK_BASE_URL";

/// Fallback GitLab token variable, as set in CI jobs.
pub const ENV_GITLAB_TOKEN_FALLBACK: &str = "GITLAB_TOKEN";
