//! Configuration loading and validation for Confab.
//!
//! Loads configuration from `confab.toml` (or `$CONFAB_CONFIG`) with
//! environment variable overrides. Validates all settings at startup, so
//! every consumer downstream can trust the values it is handed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use confab_core::ConfigError;

/// The root configuration structure.
///
/// Maps directly to `confab.toml`. Every field has a default, so an absent
/// config file yields a working setup (the API key can come from the
/// environment).
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model to request from the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per reply (backend default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Override the built-in assistant persona
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Path to the tool descriptor file
    #[serde(default = "default_tools_path")]
    pub tools_path: PathBuf,

    /// Model backend configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Conversation memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_model() -> String {
    "llama3-8b-8192".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_tools_path() -> PathBuf {
    PathBuf::from("tools.toml")
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt)
            .field("tools_path", &self.tools_path)
            .field("provider", &self.provider)
            .field("memory", &self.memory)
            .field("server", &self.server)
            .finish()
    }
}

/// Which backend to talk to and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend name: "groq", "openai", or "custom" (requires api_url)
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Override the backend base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Request timeout for a single completion call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "groq".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// How many of the most recent exchanges (user + assistant pairs) to
    /// keep and replay on each request
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_window() -> usize {
    5
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by the CORS layer
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Include the full error chain in 500 response bodies. Handy during
    /// development, leaks internals in production.
    #[serde(default = "default_true")]
    pub expose_error_detail: bool,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8002
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".into()]
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            expose_error_detail: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from `$CONFAB_CONFIG` or `./confab.toml`.
    ///
    /// Environment variables override file values:
    /// - `CONFAB_API_KEY` / `GROQ_API_KEY` / `OPENAI_API_KEY` — API key
    /// - `CONFAB_MODEL` / `CHAT_MODEL_NAME` — model name
    /// - `CONFAB_PROVIDER` — backend name
    /// - `CONFAB_MEMORY_WINDOW` — memory window size
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("CONFAB_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("confab.toml"));
        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides through an injectable lookup.
    ///
    /// `load()` passes `std::env::var`; tests pass a closure over a map so
    /// they stay deterministic under parallel execution.
    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            self.api_key = lookup("CONFAB_API_KEY")
                .or_else(|| lookup("GROQ_API_KEY"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(model) = lookup("CONFAB_MODEL").or_else(|| lookup("CHAT_MODEL_NAME")) {
            self.model = model;
        }

        if let Some(provider) = lookup("CONFAB_PROVIDER") {
            self.provider.name = provider;
        }

        if let Some(window) = lookup("CONFAB_MEMORY_WINDOW") {
            self.memory.window = window.parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "CONFAB_MEMORY_WINDOW must be a positive integer, got {window:?}"
                ))
            })?;
        }

        self.validate()
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::Invalid(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.memory.window == 0 {
            return Err(ConfigError::Invalid(
                "memory.window must be at least 1".into(),
            ));
        }

        if self.server.allowed_origins.is_empty() {
            return Err(ConfigError::Invalid(
                "server.allowed_origins must list at least one origin".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The API key, or the error every backend constructor reports when
    /// none is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    /// The address the HTTP server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            system_prompt: None,
            tools_path: default_tools_path(),
            provider: ProviderConfig::default(),
            memory: MemoryConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.model, "llama3-8b-8192");
        assert_eq!(config.memory.window, 5);
        assert_eq!(config.server.port, 8002);
        assert_eq!(config.server.allowed_origins, ["http://localhost:5173"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.server.port, config.server.port);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let mut config = AppConfig::default();
        config.memory.window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/confab.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().model, "llama3-8b-8192");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
model = "mixtral-8x7b-32768"

[server]
port = 9000
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.model, "mixtral-8x7b-32768");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.memory.window, 5);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "model = [not toml").unwrap();

        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GROQ_API_KEY", "gsk_test123"),
            ("CHAT_MODEL_NAME", "llama3-70b-8192"),
            ("CONFAB_MEMORY_WINDOW", "3"),
        ]);

        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("gsk_test123"));
        assert_eq!(config.model, "llama3-70b-8192");
        assert_eq!(config.memory.window, 3);
    }

    #[test]
    fn explicit_api_key_wins_over_env() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config
            .apply_overrides(|key| (key == "GROQ_API_KEY").then(|| "from-env".to_string()))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn garbage_window_override_rejected() {
        let mut config = AppConfig::default();
        let result =
            config.apply_overrides(|key| (key == "CONFAB_MEMORY_WINDOW").then(|| "lots".into()));
        assert!(result.is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("gsk_supersecret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn require_api_key_reports_missing() {
        let config = AppConfig::default();
        assert!(config.require_api_key().is_err());
    }
}
