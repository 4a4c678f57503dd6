//! Error types for canopy services.

use thiserror::Error;

/// Result type alias using CanopyError.
pub type CanopyResult<T> = Result<T, CanopyError>;

/// Primary error type for canopy operations.
///
/// None of these is fatal: spatial failures degrade to stale data and
/// enrichment failures degrade to "no data".
#[derive(Debug, Error)]
pub enum CanopyError {
    // === Network Errors ===
    #[error("Network request failed: {0}")]
    Network(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Request timeout")]
    Timeout,

    // === Data Errors ===
    #[error("Malformed response: {0}")]
    Parse(String),

    // === Control Flow ===
    #[error("Request superseded by a newer one")]
    Cancelled,

    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CanopyError {
    /// Cancellation is not a failure and must never be cached as one.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CanopyError::Cancelled)
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CanopyError::Network(_) => "network",
            CanopyError::HttpStatus { .. } => "http_status",
            CanopyError::Timeout => "timeout",
            CanopyError::Parse(_) => "parse",
            CanopyError::Cancelled => "cancelled",
            CanopyError::InvalidConfig(_) => "config",
        }
    }
}

impl From<serde_json::Error> for CanopyError {
    fn from(err: serde_json::Error) -> Self {
        CanopyError::Parse(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for CanopyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return CanopyError::Timeout;
        }
        if let Some(status) = err.status() {
            return CanopyError::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        if err.is_decode() {
            return CanopyError::Parse(err.to_string());
        }
        CanopyError::Network(err.to_string())
    }
}

impl From<serde_yaml::Error> for CanopyError {
    fn from(err: serde_yaml::Error) -> Self {
        CanopyError::InvalidConfig(format!("YAML error: {}", err))
    }
}

impl From<std::io::Error> for CanopyError {
    fn from(err: std::io::Error) -> Self {
        CanopyError::InvalidConfig(format!("IO error: {}", err))
    }
}
