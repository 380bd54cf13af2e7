use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{LlmError, Result};
use crate::models::determine_provider;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "PSEUDOLANG_CONFIG";

/// Persisted CLI configuration: provider tokens plus the active selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Provider resolved from the active model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_provider: Option<String>,

    /// Model used for translation requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_model: Option<String>,

    /// Provider name -> credentials
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API token sent with every request
    pub token: String,

    /// Custom endpoint (required for azure-openai)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Everything needed to build a client for the active model
#[derive(Debug, Clone, Copy)]
pub struct ActiveSelection<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub settings: &'a ProviderConfig,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, returning an empty config if the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(LlmError::ConfigRead(e)),
        };

        debug!("Loaded config from {}", path.display());
        serde_json::from_str(&content).map_err(LlmError::ConfigParse)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Atomically replace the file at `path` with this configuration.
    ///
    /// The file is readable and writable by the owner only.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(LlmError::ConfigWrite)?;

        let mut content = serde_json::to_string_pretty(self).map_err(LlmError::ConfigSerialize)?;
        content.push('\n');

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(LlmError::ConfigWrite)?;
        file.write_all(content.as_bytes())
            .map_err(LlmError::ConfigWrite)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(LlmError::ConfigWrite)?;
        }

        file.persist(path)
            .map_err(|e| LlmError::ConfigWrite(e.error))?;

        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => default_config_path(),
        }
    }

    /// Token stored for `provider`, if any
    pub fn token(&self, provider: &str) -> Option<&str> {
        self.providers.get(provider).map(|p| p.token.as_str())
    }

    fn has_token(&self, provider: &str) -> bool {
        self.token(provider).is_some_and(|t| !t.is_empty())
    }

    /// Insert or replace the token for `provider`, keeping any endpoint override
    pub fn set_provider_token(&mut self, provider: &str, token: &str) {
        self.providers.entry(provider.to_string()).or_default().token = token.to_string();
    }

    /// Set the endpoint override for `provider`
    pub fn set_provider_base_url(&mut self, provider: &str, base_url: Option<String>) {
        self.providers.entry(provider.to_string()).or_default().base_url = base_url;
    }

    /// Make `provider` active. Requires a stored token.
    pub fn set_active_provider(&mut self, provider: &str) -> Result<()> {
        if !self.has_token(provider) {
            return Err(LlmError::NoToken {
                provider: provider.to_string(),
                model: None,
            });
        }
        self.active_provider = Some(provider.to_string());
        Ok(())
    }

    /// Switch to `model`, resolving its provider. Requires a stored token for that provider.
    pub fn set_active_model(&mut self, model: &str) -> Result<()> {
        let provider = determine_provider(model)?;

        if !self.has_token(provider.as_str()) {
            return Err(LlmError::NoToken {
                provider: provider.to_string(),
                model: Some(model.to_string()),
            });
        }

        self.active_provider = Some(provider.to_string());
        self.active_model = Some(model.to_string());
        Ok(())
    }

    /// Switch to `model` and store `token` for its provider in one step.
    /// An empty token is rejected and leaves the config unchanged.
    pub fn set_model_with_token(&mut self, model: &str, token: &str) -> Result<()> {
        let provider = determine_provider(model)?;

        if token.is_empty() {
            return Err(LlmError::NoToken {
                provider: provider.to_string(),
                model: Some(model.to_string()),
            });
        }

        self.set_provider_token(provider.as_str(), token);
        self.active_provider = Some(provider.to_string());
        self.active_model = Some(model.to_string());
        Ok(())
    }

    /// Check that a model, its provider and a non-empty token are all configured
    pub fn active_selection(&self) -> Result<ActiveSelection<'_>> {
        let model = self
            .active_model
            .as_deref()
            .filter(|m| !m.is_empty())
            .ok_or(LlmError::NoActiveModel)?;

        let provider = self
            .active_provider
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(LlmError::NoActiveProvider)?;

        let settings = self
            .providers
            .get(provider)
            .filter(|p| !p.token.is_empty())
            .ok_or_else(|| LlmError::MissingToken {
                provider: provider.to_string(),
            })?;

        Ok(ActiveSelection {
            provider,
            model,
            settings,
        })
    }
}

fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LlmError::ConfigError("failed to get home directory".into()))?;
    Ok(home.join(".config").join("pseudolang").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_token(provider: &str, token: &str) -> Config {
        let mut config = Config::default();
        config.set_provider_token(provider, token);
        config
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path().unwrap();
        assert!(path.ends_with(".config/pseudolang/config.json"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_load_invalid_json_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_load_without_providers_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"active_model": "gpt-4"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.active_model.as_deref(), Some("gpt-4"));
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_save_creates_directory_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("pseudolang").join("config.json");

        let mut config = Config::default();
        config.set_model_with_token("gpt-4", "sk-test123").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"active_provider\": \"openai\""));
        assert!(raw.ends_with('\n'));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        with_token("openai", "sk").save_to(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        with_token("openai", "old").save_to(&path).unwrap();
        with_token("groq", "new").save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.token("openai"), None);
        assert_eq!(loaded.token("groq"), Some("new"));
    }

    #[test]
    fn test_token_lookup() {
        let config = with_token("openai", "sk-test123");
        assert_eq!(config.token("openai"), Some("sk-test123"));
        assert_eq!(config.token("anthropic"), None);
        assert_eq!(Config::default().token("openai"), None);
    }

    #[test]
    fn test_set_provider_token_overrides_and_keeps_base_url() {
        let mut config = with_token("ollama", "old-token");
        config.set_provider_base_url("ollama", Some("http://gpu-box:11434/v1".into()));
        config.set_provider_token("ollama", "new-token");

        let entry = &config.providers["ollama"];
        assert_eq!(entry.token, "new-token");
        assert_eq!(entry.base_url.as_deref(), Some("http://gpu-box:11434/v1"));
    }

    #[test]
    fn test_set_provider_token_accepts_any_name() {
        let mut config = Config::default();
        config.set_provider_token("not-a-provider", "t");
        assert_eq!(config.token("not-a-provider"), Some("t"));
    }

    #[test]
    fn test_set_active_provider() {
        let mut config = with_token("openai", "sk-test123");
        config.set_active_provider("openai").unwrap();
        assert_eq!(config.active_provider.as_deref(), Some("openai"));

        let err = Config::default().set_active_provider("openai").unwrap_err();
        assert!(err.to_string().contains("no token configured"));
    }

    #[test]
    fn test_set_active_model_requires_token() {
        let mut config = with_token("anthropic", "sk-ant-test");
        let err = config.set_active_model("gpt-4").unwrap_err();
        assert_eq!(
            err.to_string(),
            "no token configured for provider: openai (required for model: gpt-4)"
        );
        assert_eq!(config.active_model, None);
        assert_eq!(config.active_provider, None);
    }

    #[test]
    fn test_set_active_model_sets_both_fields() {
        let mut config = with_token("openai", "sk-test123");
        config.set_active_model("gpt-4").unwrap();
        assert_eq!(config.active_model.as_deref(), Some("gpt-4"));
        assert_eq!(config.active_provider.as_deref(), Some("openai"));
    }

    #[test]
    fn test_set_active_model_unknown() {
        let err = Config::default().set_active_model("unknown-model").unwrap_err();
        assert!(err.to_string().contains("unable to determine provider"));
    }

    #[test]
    fn test_set_model_with_token_without_prior_token() {
        let mut config = Config::default();
        config.set_model_with_token("claude-3-opus", "sk-ant-test").unwrap();

        assert_eq!(config.active_model.as_deref(), Some("claude-3-opus"));
        assert_eq!(config.active_provider.as_deref(), Some("anthropic"));
        assert_eq!(config.token("anthropic"), Some("sk-ant-test"));
    }

    #[test]
    fn test_set_model_with_token_rejects_empty_token() {
        let mut config = Config::default();
        let err = config.set_model_with_token("gpt-4", "").unwrap_err();

        assert_eq!(
            err.to_string(),
            "no token configured for provider: openai (required for model: gpt-4)"
        );
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_set_model_with_token_unknown_model() {
        let mut config = Config::default();
        assert!(config.set_model_with_token("unknown-model", "t").is_err());
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_active_selection_checks_in_order() {
        let mut config = Config::default();
        assert!(matches!(
            config.active_selection(),
            Err(LlmError::NoActiveModel)
        ));

        config.active_model = Some("gpt-4".into());
        assert!(matches!(
            config.active_selection(),
            Err(LlmError::NoActiveProvider)
        ));

        config.active_provider = Some("openai".into());
        assert!(matches!(
            config.active_selection(),
            Err(LlmError::MissingToken { .. })
        ));

        config.set_provider_token("openai", "");
        assert!(matches!(
            config.active_selection(),
            Err(LlmError::MissingToken { .. })
        ));

        config.set_provider_token("openai", "sk-test123");
        let active = config.active_selection().unwrap();
        assert_eq!(active.provider, "openai");
        assert_eq!(active.model, "gpt-4");
        assert_eq!(active.settings.token, "sk-test123");
    }
}
