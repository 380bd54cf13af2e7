use thiserror::Error;

use crate::providers::valid_provider_names;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("no active model configured. Use 'pseudolang model <model>' to set one")]
    NoActiveModel,

    #[error("no active provider configured")]
    NoActiveProvider,

    #[error("no API token configured for provider: {provider}")]
    MissingToken { provider: String },

    #[error("no token configured for provider: {provider}{}", .model.as_ref().map(|m| format!(" (required for model: {})", m)).unwrap_or_default())]
    NoToken {
        provider: String,
        model: Option<String>,
    },

    #[error("unable to determine provider for model: {0}")]
    UnknownModel(String),

    #[error("invalid provider: {0}\nValid providers: {names}", names = valid_provider_names())]
    InvalidProvider(String),

    #[error("Provider not available: {0}")]
    ProviderUnavailable(String),

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("failed to read config file: {0}")]
    ConfigRead(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ConfigParse(#[source] serde_json::Error),

    #[error("failed to write config file: {0}")]
    ConfigWrite(#[source] std::io::Error),

    #[error("failed to marshal config: {0}")]
    ConfigSerialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LlmError>;
