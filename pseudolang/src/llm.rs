//! LLM client wrapper for pseudolang
//!
//! Builds the provider for the active model and sends single-turn requests.

use anyhow::{Context, Result};
use llm_client::{Config, LlmProvider, LlmRequest, ProviderKind, get_provider};
use log::debug;

/// Output token budget for every translation request
pub const MAX_OUTPUT_TOKENS: u32 = 1000;

/// Wrapper around the provider serving the active model
pub struct LlmClient {
    provider: Box<dyn LlmProvider>,
}

impl LlmClient {
    /// Create a client for the configured active model.
    ///
    /// Fails before any network traffic if the model, provider or token is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let active = config.active_selection()?;

        let provider = active
            .provider
            .parse::<ProviderKind>()
            .and_then(|kind| get_provider(kind, active.model, active.settings))
            .context("failed to initialize LLM")?;

        debug!(
            "Using LLM provider: {} (model: {})",
            provider.name(),
            active.model
        );

        Ok(Self { provider })
    }

    /// Wrap an already constructed provider
    #[cfg(test)]
    pub fn with_provider(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Send `prompt` and return the raw response text
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = LlmRequest {
            prompt: prompt.to_string(),
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        debug!("Sending request to {}", self.provider.name());

        let response = self
            .provider
            .complete(request)
            .await
            .context("failed to generate response")?;

        if let Some(usage) = &response.usage {
            debug!(
                "Tokens: {} in, {} out",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(response.content)
    }
}
