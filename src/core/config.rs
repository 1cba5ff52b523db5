//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::core::errors::{Result, TranslationError};

/// Default Gemini REST base URL
pub const DEFAULT_API_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub api_key: String,
    pub api_endpoint: String,
    pub model: String,
    /// Bounded wait on one backend call
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Reject replies whose key set differs from the source document
    pub enforce_key_match: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: 30000,
            connect_timeout_ms: 10000,
            enforce_key_match: false,
        }
    }
}

impl TranslatorConfig {
    /// Create a config with defaults and the given credential
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_key(None)
    }

    /// Load configuration from environment variables, taking the credential
    /// from `api_key` instead of `GOOGLE_API_KEY` when given
    pub fn from_env_with_key(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| TranslationError::ConfigError {
                message: "GOOGLE_API_KEY environment variable is required".to_string(),
            })?;

        let defaults = Self::default();

        let config = Self {
            api_key,
            api_endpoint: std::env::var("API_ENDPOINT").unwrap_or(defaults.api_endpoint),
            model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            timeout_ms: env_or("REQUEST_TIMEOUT_MS", defaults.timeout_ms)?,
            connect_timeout_ms: env_or("CONNECT_TIMEOUT_MS", defaults.connect_timeout_ms)?,
            enforce_key_match: env_or("ENFORCE_KEY_MATCH", defaults.enforce_key_match)?,
        };

        info!("Loaded configuration for model {}", config.model);
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| TranslationError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(config_error("API key is required"));
        }

        if self.api_endpoint.trim().is_empty() {
            return Err(config_error("API endpoint is required"));
        }

        if self.model.trim().is_empty() {
            return Err(config_error("Model identifier is required"));
        }

        if self.timeout_ms == 0 {
            return Err(config_error("timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn config_error(message: &str) -> TranslationError {
    TranslationError::ConfigError {
        message: message.to_string(),
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| TranslationError::ConfigError {
            message: format!("{} has an invalid value '{}': {}", name, raw, e),
        }),
        Err(_) => Ok(default),
    }
}
