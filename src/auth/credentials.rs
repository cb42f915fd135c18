use chrono::Utc;
use serde::{Deserialize, Serialize};

/// OAuth token set held per (user, CRM) pair.
///
/// Instances are immutable: a refresh produces a new value that supersedes
/// the stored one, it never mutates in place. All three fields round-trip
/// losslessly through serde, including absence (as opposed to zero) of
/// `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry instant in epoch seconds. Absent means the token never
    /// expires; that is the documented policy for providers that omit
    /// `expires_in` from their token responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl OAuthCredentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expires_at(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the expiry `lifetime_secs` from now.
    pub fn expires_in(self, lifetime_secs: i64) -> Self {
        let at = Utc::now().timestamp() + lifetime_secs;
        self.with_expires_at(at)
    }

    /// True iff an expiry is recorded and it has passed.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now().timestamp() > at,
            None => false,
        }
    }
}
