use thiserror::Error;

/// Unified error type for the entire pocket-ledger-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
///
/// Carry-over and balance math never produce one of these: a month with no
/// prior data is a zero state, not a failure.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Network / Backend ───────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request to {endpoint} timed out after {secs}s")]
    Timeout { endpoint: String, secs: u64 },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("API error ({endpoint}): {message}")]
    Api { endpoint: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Change feed closed")]
    FeedClosed,

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    // ── Encoding / Config ───────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Network failures and timeouts may succeed on retry; everything else
    /// needs a change on either side before trying again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Network(_) | CoreError::Timeout { .. })
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(e: toml::de::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Query strings can carry tokens; never let them reach logs or toasts.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
