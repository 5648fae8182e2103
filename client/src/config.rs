use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::pipeline::ResponseOrdering;

/// Deployment settings for a playground session.
///
/// Every field has a default, so a TOML file only needs the values it
/// changes:
///
/// ```toml
/// endpoint = "https://play.example.dev"
/// debounce_ms = 200
/// require_config = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Base URL of the generation service; requests go to `<endpoint>/generate`.
    pub endpoint: String,
    /// Quiet period after the last edit before a request is issued.
    pub debounce_ms: u64,
    /// Whether a request needs the config document to be loaded.
    pub require_config: bool,
    /// Suffix identifying the query document in the input pane.
    pub query_document: String,
    /// Name of the config document in the input pane.
    pub config_document: String,
    /// Suffix of the output file selected after each render.
    pub output_suffix: String,
    pub ordering: ResponseOrdering,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8086".to_string(),
            debounce_ms: 500,
            require_config: false,
            query_document: "query.sql".to_string(),
            config_document: "sqlc.json".to_string(),
            output_suffix: ".sql.go".to_string(),
            ordering: ResponseOrdering::default(),
            log_level: "info".to_string(),
        }
    }
}

impl PlaygroundConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid("debounce_ms must be positive".into()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint is empty".into()));
        }
        if self.query_document.is_empty() {
            return Err(ConfigError::Invalid("query_document is empty".into()));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
