//! Model name to provider resolution

use crate::error::{LlmError, Result};
use crate::providers::ProviderKind;

/// Case-insensitive model name prefixes per provider.
///
/// Scanned top to bottom; the first matching prefix wins. Rows with more
/// specific prefixes come before rows whose prefixes they extend
/// (`llama-` before `llama`, `mistral-` before `mistral`), so ollama's bare
/// model names stay last.
const MODEL_PATTERNS: &[(ProviderKind, &[&str])] = &[
    (ProviderKind::Anthropic, &["claude-"]),
    (ProviderKind::OpenAI, &["gpt-", "o1-", "o3-"]),
    (ProviderKind::Groq, &["llama-", "mixtral-", "gemma-"]),
    (ProviderKind::Mistral, &["mistral-"]),
    (ProviderKind::OpenRouter, &["openrouter/"]),
    (ProviderKind::AzureOpenAI, &["azure/"]),
    (
        ProviderKind::Ollama,
        &["llama", "mistral", "codellama", "phi", "qwen"],
    ),
];

/// Resolve the provider serving `model_name`
pub fn determine_provider(model_name: &str) -> Result<ProviderKind> {
    let model_lower = model_name.to_lowercase();

    MODEL_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| model_lower.starts_with(*p)))
        .map(|(provider, _)| *provider)
        .ok_or_else(|| LlmError::UnknownModel(model_name.to_string()))
}
