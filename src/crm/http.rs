//! Shared HTTP client and token-endpoint plumbing for CRM adapters.

use std::sync::OnceLock;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use crate::auth::{AuthError, OAuthCredentials};
use crate::error::{Error, Result};

/// Lifetime assumed when a token endpoint omits `expires_in`.
pub(crate) const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3_600;

/// Bounded timeout for every outbound call; a timeout surfaces as a network
/// error, never as a provider API error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(access_token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {access_token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Wire shape shared by all four platforms' token endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Convert into credentials, computing the absolute expiry.
    ///
    /// `fallback_refresh` carries the previous refresh token forward for
    /// platforms that omit it from refresh responses instead of rotating it.
    pub(crate) fn into_credentials(self, fallback_refresh: Option<&str>) -> OAuthCredentials {
        let lifetime = self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        OAuthCredentials {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| fallback_refresh.map(str::to_string)),
            expires_at: Some(Utc::now().timestamp() + lifetime),
        }
    }
}

/// POST an OAuth grant as form data and parse the token response.
pub(crate) async fn post_token_form(
    url: &str,
    params: &[(&str, &str)],
) -> std::result::Result<TokenResponse, AuthError> {
    let resp = shared_client().post(url).form(params).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::Exchange {
            status: status.as_u16(),
            body,
        });
    }
    let payload = resp
        .json::<TokenResponse>()
        .await
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
    Ok(payload)
}

/// Authenticated lead-creation POST shared by the adapters.
///
/// `success` lists the statuses the platform uses for a created record.
/// Anything else fails with `Error::Api { status, body }`; transport
/// failures become `Error::Network` via the reqwest conversion.
pub(crate) async fn post_lead_json(
    url: &str,
    access_token: &str,
    body: &serde_json::Value,
    success: &[u16],
) -> Result<serde_json::Value> {
    let resp = shared_client()
        .post(url)
        .headers(bearer_headers(access_token))
        .json(body)
        .send()
        .await?;

    let status = resp.status().as_u16();
    if !success.contains(&status) {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::api(status, body));
    }

    let text = resp.text().await?;
    if text.trim().is_empty() {
        // 204-style creation: nothing to parse.
        return Ok(serde_json::json!({}));
    }
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_computes_absolute_expiry() {
        let resp = TokenResponse {
            access_token: "tok".into(),
            refresh_token: Some("ref".into()),
            expires_in: Some(600),
        };
        let before = Utc::now().timestamp();
        let creds = resp.into_credentials(None);
        let at = creds.expires_at.unwrap();
        assert!(at >= before + 600 && at <= before + 602);
        assert_eq!(creds.refresh_token.as_deref(), Some("ref"));
    }

    #[test]
    fn token_response_defaults_lifetime_when_omitted() {
        let resp = TokenResponse {
            access_token: "tok".into(),
            refresh_token: None,
            expires_in: None,
        };
        let before = Utc::now().timestamp();
        let creds = resp.into_credentials(None);
        let at = creds.expires_at.unwrap();
        assert!(at >= before + DEFAULT_TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn refresh_token_falls_back_to_previous_value() {
        let resp = TokenResponse {
            access_token: "tok".into(),
            refresh_token: None,
            expires_in: Some(60),
        };
        let creds = resp.into_credentials(Some("old-refresh"));
        assert_eq!(creds.refresh_token.as_deref(), Some("old-refresh"));

        let rotated = TokenResponse {
            access_token: "tok".into(),
            refresh_token: Some("new-refresh".into()),
            expires_in: Some(60),
        };
        let creds = rotated.into_credentials(Some("old-refresh"));
        assert_eq!(creds.refresh_token.as_deref(), Some("new-refresh"));
    }

    #[test]
    fn bearer_headers_set_authorization_and_content_type() {
        let headers = bearer_headers("abc");
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }
}
