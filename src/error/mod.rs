//! Error types for Prospect.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for all Prospect operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported CRM: {0}")]
    UnsupportedCrm(String),

    #[error("CRM API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limit exceeded: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid lead: {0}")]
    InvalidLead(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an API error from a provider's status and raw body.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Canonical HTTP status for surfacing this error to a presentation layer.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnsupportedCrm(_) | Self::InvalidLead(_) | Self::InvalidArgument(_) => 400,
            Self::Auth(_) => 401,
            Self::RateLimited { .. } => 429,
            _ => 500,
        }
    }

    /// Whether this error is plausibly transient.
    ///
    /// No automatic retry is performed anywhere in the crate; this exposes the
    /// classification so a caller can layer its own backoff policy. 4xx
    /// provider responses are caller errors and are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, Error>;
