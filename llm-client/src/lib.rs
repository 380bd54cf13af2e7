//! LLM client library for pseudolang
//!
//! Provides the persisted configuration (provider tokens, active model) and a
//! unified interface over the supported providers:
//! - OpenAI, Groq, Mistral, OpenRouter, Ollama (OpenAI-compatible chat API)
//! - Azure OpenAI (deployment endpoints)
//! - Anthropic API (direct)

pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod providers;

pub use config::{ActiveSelection, Config, ProviderConfig};
pub use error::{LlmError, Result};
pub use models::determine_provider;
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{
    MockProvider, ProviderKind, get_provider, is_valid_provider, valid_provider_names,
};
