use thiserror::Error;

/// Normalized credential-handshake errors across CRM providers.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No stored credentials for this user and CRM")]
    NotConnected,
    #[error("Access token expired and no refresh token is available")]
    TokenExpired,
    #[error("{crm} does not support refresh tokens")]
    RefreshUnsupported { crm: String },
    #[error("Token exchange rejected (status {status}): {body}")]
    Exchange { status: u16, body: String },
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
