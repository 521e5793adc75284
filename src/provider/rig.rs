//! rig-core integration for LLM completions.
//!
//! Uses rig-core's provider clients and Agent abstraction for
//! multi-provider support. Currently supports: Anthropic, OpenAI, and
//! any OpenAI-compatible API.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

use crate::config::ProviderConfig;
use crate::models::ProviderName;

use super::{ModelProvider, ProviderError};

/// Maximum tokens per LLM completion response.
///
/// Set high enough that reviews of large chunks are not truncated
/// mid-JSON; the recovery parser handles the remaining cases.
const MAX_TOKENS: u64 = 65536;

/// Build an agent from a rig-core client and prompt it.
///
/// Always sets `max_tokens` — all rig-core providers support it and
/// without it some default to a low limit that truncates responses.
macro_rules! prompt_completion {
    ($client:expr, $model:expr, $system:expr, $user:expr, $label:expr) => {{
        let agent = $client
            .agent($model)
            .preamble($system)
            .temperature(0.0)
            .max_tokens(MAX_TOKENS)
            .build();
        agent
            .prompt($user)
            .await
            .map_err(|e| ProviderError::ApiError(format!("{} API error: {e}", $label)))
    }};
}

/// rig-core based model provider.
///
/// Wraps rig-core's multi-provider client system. The provider name
/// in config selects which rig-core provider to use.
pub struct RigProvider {
    config: ProviderConfig,
}

impl RigProvider {
    /// Create a new RigProvider with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or the provider-specific env var.",
                config.name,
                crate::constants::ENV_PROVIDER_API_KEY
            )));
        }
        Ok(Self { config })
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(ref base_url) = self.config.base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create OpenAI client: {e}")))?;
        Ok(client)
    }

    /// Require `base_url` for OpenAI-compatible providers.
    fn require_base_url(&self) -> Result<&str, ProviderError> {
        self.config.base_url.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            )
        })
    }

    /// Get the API key or return an error.
    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))
    }
}

#[async_trait]
impl ModelProvider for RigProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let model = self.config.model.as_str();

        match self.config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::ApiError(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_completion!(client, model, system_prompt, user_prompt, "Anthropic")
            }
            ProviderName::OpenAI => {
                let client = self.build_openai_client(api_key)?;
                prompt_completion!(client, model, system_prompt, user_prompt, "OpenAI")
            }
            ProviderName::OpenAICompatible => {
                let base_url = self.require_base_url()?;
                let client: providers::openai::CompletionsClient =
                    providers::openai::CompletionsClient::builder()
                        .api_key(api_key)
                        .base_url(base_url)
                        .build()
                        .map_err(|e| {
                            ProviderError::ApiError(format!(
                                "failed to create OpenAI-compatible client: {e}"
                            ))
                        })?;
                prompt_completion!(
                    client,
                    model,
                    system_prompt,
                    user_prompt,
                    "OpenAI-compatible"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: ProviderName, api_key: Option<&str>, base_url: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name,
            model: "test-model".to_string(),
            base_url: base_url.map(str::to_string),
            api_key: api_key.map(str::to_string),
        }
    }

    #[test]
    fn new_provider_missing_api_key() {
        let result = RigProvider::new(config(ProviderName::Anthropic, None, None));
        match result {
            Err(e) => assert!(e.to_string().contains("API key"), "got: {e}"),
            Ok(_) => panic!("expected error for missing API key"),
        }
    }

    #[test]
    fn new_provider_with_api_key() {
        assert!(RigProvider::new(config(ProviderName::Anthropic, Some("sk-test"), None)).is_ok());
    }

    #[test]
    fn require_base_url_missing() {
        let provider =
            RigProvider::new(config(ProviderName::OpenAICompatible, Some("key"), None)).unwrap();
        let result = provider.require_base_url();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("base_url"));
    }

    #[test]
    fn require_base_url_present() {
        let provider = RigProvider::new(config(
            ProviderName::OpenAICompatible,
            Some("key"),
            Some("https://llm.internal.example.com"),
        ))
        .unwrap();
        assert_eq!(
            provider.require_base_url().unwrap(),
            "https://llm.internal.example.com"
        );
    }
}
