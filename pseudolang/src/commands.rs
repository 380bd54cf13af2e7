//! Configuration subcommands: `model`, `provider` and `config`

use anyhow::{Result, bail};
use llm_client::{Config, ProviderKind, determine_provider};
use std::path::Path;

/// Switch the active model, optionally storing a token for its provider.
///
/// Returns the confirmation message to print.
pub fn set_model(config: &mut Config, model: &str, token: Option<&str>) -> Result<String> {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => {
            config.set_model_with_token(model, token)?;
            let provider = determine_provider(model)?;
            Ok(format!(
                "Successfully configured {} (provider: {}) with new token",
                model, provider
            ))
        }
        None => {
            config.set_active_model(model)?;
            let provider = determine_provider(model)?;
            Ok(format!("Switched to model {} (provider: {})", model, provider))
        }
    }
}

/// Store the token (and optional endpoint) for a provider
pub fn set_provider(
    config: &mut Config,
    kind: ProviderKind,
    token: &str,
    base_url: Option<&str>,
) -> Result<String> {
    if token.is_empty() {
        bail!("token must not be empty");
    }

    config.set_provider_token(kind.as_str(), token);
    if let Some(base_url) = base_url {
        config.set_provider_base_url(kind.as_str(), Some(base_url.to_string()));
    }

    Ok(format!("Successfully saved API token for {}", kind))
}

/// Render the configuration with tokens masked
pub fn describe_config(config: &Config, path: &Path) -> String {
    let mut text = format!(
        "Config file: {}\nActive model: {}\nActive provider: {}\n",
        path.display(),
        config.active_model.as_deref().unwrap_or("(none)"),
        config.active_provider.as_deref().unwrap_or("(none)")
    );

    if config.providers.is_empty() {
        text.push_str("Providers: (none)\n");
        return text;
    }

    text.push_str("Providers:\n");
    for (name, settings) in &config.providers {
        text.push_str(&format!("  {} - {}", name, mask_token(&settings.token)));
        if let Some(base_url) = &settings.base_url {
            text.push_str(&format!(" @ {}", base_url));
        }
        if config.active_provider.as_deref() == Some(name.as_str()) {
            text.push_str(" (active)");
        }
        text.push('\n');
    }
    text
}

/// Show only the edges of a token
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
