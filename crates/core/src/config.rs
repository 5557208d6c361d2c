use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::CoreError;

/// Longest UTC offset in use anywhere (±18:00).
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Client settings for talking to the ledger backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the ledger backend, without a trailing slash
    pub base_url: String,

    /// Hard upper bound on every request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Display currency code
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Offset applied to UTC timestamps before taking their calendar date
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Bearer token attached to every request
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_currency() -> String {
    "IDR".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
            currency: default_currency(),
            utc_offset_minutes: 0,
            auth_token: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load and validate a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let path_ref = path.as_ref();
        tracing::debug!("Loading client configuration from {:?}", path_ref);
        let contents = std::fs::read_to_string(path_ref).map_err(|e| {
            CoreError::Config(format!("Failed to read config file {path_ref:?}: {e}"))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let config: ClientConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.base_url.trim().is_empty() {
            return Err(CoreError::Config("base_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(CoreError::Config(format!(
                "utc_offset_minutes {} is outside ±{MAX_UTC_OFFSET_MINUTES}",
                self.utc_offset_minutes
            )));
        }
        let code = self.currency.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::Config(format!(
                "Invalid currency code '{}': must be exactly 3 ASCII letters",
                self.currency
            )));
        }
        Ok(())
    }

    /// `base_url` with any trailing slash removed.
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
