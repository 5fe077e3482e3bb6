//! Configuration loading, validation, and management for Helpdesk.
//!
//! Loads configuration from a TOML file (default `./helpdesk.toml`) with
//! environment variable overrides. Validates all settings at startup.
//!
//! A provider without a credential is a normal state, not an error: the
//! fallback chain simply skips it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "HELPDESK_CONFIG";

/// Config file used when neither `--config` nor [`CONFIG_ENV`] is given.
pub const DEFAULT_CONFIG_FILE: &str = "helpdesk.toml";

/// The root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file for sessions and messages
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// JSON documentation corpus
    #[serde(default = "default_docs_path")]
    pub docs_path: String,

    /// Maximum persisted messages fetched as conversational context
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// LLM providers, tried in fixed priority order
    #[serde(default)]
    pub providers: ProvidersConfig,
}

fn default_database_path() -> String {
    "helpdesk.db".into()
}
fn default_docs_path() -> String {
    "docs.json".into()
}
fn default_history_window() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Requests allowed per client per minute
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: usize,

    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Built frontend served as static files when the directory exists
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// CORS origins. Empty = any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3001
}
fn default_rate_limit() -> usize {
    30
}
fn default_body_limit() -> usize {
    1024 * 1024
}
fn default_static_dir() -> String {
    "frontend/dist".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rate_limit_per_minute: default_rate_limit(),
            body_limit_bytes: default_body_limit(),
            static_dir: default_static_dir(),
            allowed_origins: vec![],
        }
    }
}

/// The two supported backends, in priority order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openrouter: ProviderConfig,

    #[serde(default)]
    pub gemini: ProviderConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override the backend's base URL (proxies, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Override the backend's default model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-call deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// The credential, if present and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from [`CONFIG_ENV`], or from
    /// [`DEFAULT_CONFIG_FILE`], then apply environment overrides:
    /// - `OPENROUTER_API_KEY`, `GEMINI_API_KEY`
    /// - `PORT`
    /// - `HELPDESK_DATABASE`, `HELPDESK_DOCS`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var(CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };

        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment-like lookup.
    ///
    /// Credentials from the environment take precedence over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENROUTER_API_KEY") {
            self.providers.openrouter.api_key = Some(key);
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.providers.gemini.api_key = Some(key);
        }
        if let Some(port) = lookup("PORT") {
            self.gateway.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(path) = lookup("HELPDESK_DATABASE") {
            self.database_path = path;
        }
        if let Some(path) = lookup("HELPDESK_DOCS") {
            self.docs_path = path;
        }
        Ok(())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, provider) in self.provider_entries() {
            if !(0.0..=2.0).contains(&provider.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "providers.{name}.temperature must be between 0.0 and 2.0"
                )));
            }
            if provider.timeout_secs == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "providers.{name}.timeout_secs must be > 0"
                )));
            }
        }

        // The current user turn is excluded from the window, so 1 would
        // never carry any history.
        if self.history_window < 2 {
            return Err(ConfigError::ValidationError(
                "history_window must be at least 2".into(),
            ));
        }

        if self.gateway.rate_limit_per_minute == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.rate_limit_per_minute must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Providers in fallback priority order.
    pub fn provider_entries(&self) -> [(&'static str, &ProviderConfig); 2] {
        [
            ("openrouter", &self.providers.openrouter),
            ("gemini", &self.providers.gemini),
        ]
    }

    /// Whether at least one provider has a credential.
    pub fn has_any_credential(&self) -> bool {
        self.provider_entries()
            .iter()
            .any(|(_, p)| p.credential().is_some())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            docs_path: default_docs_path(),
            history_window: default_history_window(),
            gateway: GatewayConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.port, 3001);
        assert_eq!(config.history_window, 10);
        assert_eq!(config.gateway.rate_limit_per_minute, 30);
        assert!(config.validate().is_ok());
        assert!(!config.has_any_credential());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.docs_path, config.docs_path);
    }

    #[test]
    fn partial_provider_table_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[providers.gemini]
api_key = "g-key"
"#,
        )
        .unwrap();
        assert_eq!(config.providers.gemini.credential(), Some("g-key"));
        assert!((config.providers.gemini.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.providers.gemini.max_tokens, 1024);
        assert!(config.providers.openrouter.credential().is_none());
    }

    #[test]
    fn blank_credential_counts_as_absent() {
        let provider = ProviderConfig {
            api_key: Some("   ".into()),
            ..ProviderConfig::default()
        };
        assert!(provider.credential().is_none());
    }

    #[test]
    fn env_overrides_credentials_and_port() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("OPENROUTER_API_KEY", "or-key"),
                ("PORT", "8080"),
                ("HELPDESK_DOCS", "/srv/docs.json"),
            ]))
            .unwrap();
        assert_eq!(config.providers.openrouter.credential(), Some("or-key"));
        assert!(config.providers.gemini.credential().is_none());
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.docs_path, "/srv/docs.json");
        assert!(config.has_any_credential());
    }

    #[test]
    fn invalid_port_override_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(env(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.providers.openrouter.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn tiny_history_window_rejected() {
        let config = AppConfig {
            history_window: 1,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/helpdesk.toml")).unwrap();
        assert_eq!(config.gateway.port, 3001);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
history_window = 6

[gateway]
port = 4000
allowed_origins = ["http://localhost:5173"]

[providers.openrouter]
api_key = "sk-or"
model = "openai/gpt-4o-mini"
timeout_secs = 15
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.history_window, 6);
        assert_eq!(config.gateway.port, 4000);
        assert_eq!(config.gateway.allowed_origins.len(), 1);
        assert_eq!(config.providers.openrouter.model.as_deref(), Some("openai/gpt-4o-mini"));
        assert_eq!(config.providers.openrouter.timeout_secs, 15);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gateway = [not toml").unwrap();
        let result = AppConfig::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn debug_redacts_credentials() {
        let mut config = AppConfig::default();
        config.providers.gemini.api_key = Some("super-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
