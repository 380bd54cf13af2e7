//! LLM provider implementations

mod anthropic;
pub mod mock;
mod openai_compatible;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use openai_compatible::OpenAICompatibleProvider;

use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::config::ProviderConfig;
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Groq,
    Ollama,
    Mistral,
    OpenRouter,
    AzureOpenAI,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 7] = [
        Self::OpenAI,
        Self::Anthropic,
        Self::Groq,
        Self::Ollama,
        Self::Mistral,
        Self::OpenRouter,
        Self::AzureOpenAI,
    ];

    /// Identifier used in the config file and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Groq => "groq",
            Self::Ollama => "ollama",
            Self::Mistral => "mistral",
            Self::OpenRouter => "openrouter",
            Self::AzureOpenAI => "azure-openai",
        }
    }

    /// Human-readable name for logs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic API",
            Self::Groq => "Groq",
            Self::Ollama => "Ollama",
            Self::Mistral => "Mistral",
            Self::OpenRouter => "OpenRouter",
            Self::AzureOpenAI => "Azure OpenAI",
        }
    }

    /// Endpoint used when the provider config has no `base_url`
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("https://api.openai.com/v1"),
            Self::Anthropic => Some("https://api.anthropic.com"),
            Self::Groq => Some("https://api.groq.com/openai/v1"),
            Self::Ollama => Some("http://localhost:11434/v1"),
            Self::Mistral => Some("https://api.mistral.ai/v1"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Self::AzureOpenAI => None,
        }
    }

    /// Model name as the provider's API expects it.
    ///
    /// Strips the `openrouter/` and `azure/` routing prefixes.
    pub fn api_model<'a>(&self, model: &'a str) -> &'a str {
        let prefix = match self {
            Self::OpenRouter => "openrouter/",
            Self::AzureOpenAI => "azure/",
            _ => return model,
        };

        match model.get(..prefix.len()) {
            Some(head) if head.eq_ignore_ascii_case(prefix) => &model[prefix.len()..],
            _ => model,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    /// Exact, case-sensitive match against the provider identifiers
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LlmError::InvalidProvider(s.to_string()))
    }
}

/// Whether `name` is one of the supported provider identifiers
pub fn is_valid_provider(name: &str) -> bool {
    name.parse::<ProviderKind>().is_ok()
}

/// Comma-separated list of every provider identifier
pub fn valid_provider_names() -> String {
    ProviderKind::ALL
        .iter()
        .map(ProviderKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Create a provider instance for `model` from its provider config
pub fn get_provider(
    kind: ProviderKind,
    model: &str,
    settings: &ProviderConfig,
) -> Result<Box<dyn LlmProvider>> {
    let api_key = settings.token.clone();
    let api_model = kind.api_model(model);
    let base_url = settings
        .base_url
        .as_deref()
        .or_else(|| kind.default_base_url());

    debug!(
        "Creating {} provider for model {} (endpoint: {})",
        kind.display_name(),
        api_model,
        base_url.unwrap_or("<unset>")
    );

    match (kind, base_url) {
        (ProviderKind::Anthropic, Some(base_url)) => Ok(Box::new(
            AnthropicProvider::new(api_model, api_key)?.with_base_url(base_url),
        )),
        (ProviderKind::AzureOpenAI, Some(endpoint)) => Ok(Box::new(
            OpenAICompatibleProvider::azure(api_model, endpoint, api_key)?,
        )),
        (ProviderKind::AzureOpenAI, None) => Err(LlmError::ProviderUnavailable(
            "azure-openai requires a base_url (the resource endpoint) in its provider config"
                .into(),
        )),
        (kind, Some(base_url)) => Ok(Box::new(OpenAICompatibleProvider::new(
            api_model,
            base_url,
            api_key,
            kind.display_name(),
        )?)),
        (kind, None) => Err(LlmError::ProviderUnavailable(format!(
            "no endpoint known for provider: {}",
            kind
        ))),
    }
}

fn build_client() -> Result<Client> {
    Client::builder()
        .build()
        .map_err(|e| LlmError::ProviderUnavailable(format!("failed to build HTTP client: {}", e)))
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Convert a non-success HTTP response into an `LlmError`
async fn error_from_response(response: Response) -> LlmError {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        return LlmError::RateLimited { retry_after };
    }

    let error_text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&error_text) {
        Ok(error_response) => error_response.error.message,
        Err(_) => error_text,
    };

    LlmError::ApiError {
        message,
        status_code: Some(status.as_u16()),
    }
}
