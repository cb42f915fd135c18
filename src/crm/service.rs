//! Provider-agnostic entry points for the OAuth flow and lead submission.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{create_provider, CrmName};
use crate::auth::{CredentialService, CredentialStore, OAuthCredentials};
use crate::config::ProspectConfig;
use crate::error::Result;
use crate::models::Lead;
use crate::util::RateLimiter;

const DEFAULT_MAX_REQUESTS: usize = 10;
const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of a successful lead submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadReceipt {
    pub message: String,
    /// The platform's raw response body.
    pub result: Value,
}

/// Facade over the adapter registry, credential store, and rate limiter.
///
/// Every entry point validates the CRM name before touching credentials or
/// the network, so an unsupported name never consumes quota or I/O.
pub struct CrmService {
    config: ProspectConfig,
    credentials: CredentialService,
    limiter: RateLimiter,
}

impl CrmService {
    pub fn new(config: ProspectConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            config,
            credentials: CredentialService::new(store),
            limiter: RateLimiter::new(DEFAULT_MAX_REQUESTS, DEFAULT_INTERVAL),
        }
    }

    /// Replace the default limit (10 per 60s, per operation and CRM).
    pub fn with_rate_limit(mut self, max_requests: usize, interval: Duration) -> Self {
        self.limiter = RateLimiter::new(max_requests, interval);
        self
    }

    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        self.credentials.store()
    }

    /// Compose the authorization URL the user visits to connect a CRM.
    pub fn initiate_oauth(&self, crm_name: &str) -> Result<Url> {
        let crm = CrmName::parse(crm_name)?;
        self.limiter.check(&format!("oauth-initiate/{crm}"))?;
        let provider = create_provider(crm, &self.config)?;
        let url = provider.build_auth_url()?;
        debug!(%crm, "composed authorization URL");
        Ok(url)
    }

    /// Finish the OAuth flow: trade the callback code for credentials and
    /// persist them. Nothing is stored if the exchange fails.
    pub async fn complete_oauth(
        &self,
        user_id: &str,
        crm_name: &str,
        code: &str,
    ) -> Result<OAuthCredentials> {
        let crm = CrmName::parse(crm_name)?;
        self.limiter.check(&format!("oauth-callback/{crm}"))?;
        let provider = create_provider(crm, &self.config)?;
        let credentials = self
            .credentials
            .complete_exchange(user_id, provider.as_ref(), code)
            .await?;
        info!(%crm, user_id, "connected CRM account");
        Ok(credentials)
    }

    /// Send a lead to the named CRM.
    ///
    /// Order of checks: CRM name, rate limit, lead validity, credentials,
    /// then the network call. A rate-limited or invalid request never
    /// reaches the platform.
    pub async fn submit_lead(
        &self,
        user_id: &str,
        crm_name: &str,
        lead: &Lead,
    ) -> Result<LeadReceipt> {
        let crm = CrmName::parse(crm_name)?;
        self.limiter.check(&format!("send-to-crm/{crm}"))?;
        lead.validate()?;

        let provider = create_provider(crm, &self.config)?;
        let credentials = self.credentials.resolve_valid(user_id, provider.as_ref()).await?;
        let result = provider.submit_lead(lead, &credentials).await?;

        info!(%crm, user_id, lead = %lead.full_name(), "lead submitted");
        Ok(LeadReceipt {
            message: format!("Lead sent to {crm} CRM"),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;

    fn service() -> CrmService {
        CrmService::new(ProspectConfig::new(), Arc::new(MemoryCredentialStore::new()))
    }

    #[tokio::test]
    async fn unsupported_crm_is_rejected_before_anything_else() {
        let svc = service();
        let lead = Lead::from_full_name("John Doe");
        let err = svc.submit_lead("user-1", "pipedrive", &lead).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::UnsupportedCrm(name) if name == "pipedrive"));
    }

    #[test]
    fn initiate_oauth_needs_app_configuration() {
        let svc = service();
        assert!(matches!(
            svc.initiate_oauth("hubspot"),
            Err(crate::error::Error::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn rate_limit_applies_per_crm() {
        let mut config = ProspectConfig::new();
        for crm in [CrmName::Zoho, CrmName::HubSpot] {
            config.set_crm_app(
                crm,
                crate::config::CrmApp {
                    client_id: "id".into(),
                    client_secret: "secret".into(),
                    redirect_uri: "https://app.example.com/cb".into(),
                },
            );
        }
        let svc = CrmService::new(config, Arc::new(MemoryCredentialStore::new()))
            .with_rate_limit(1, Duration::from_secs(60));
        let lead = Lead::from_full_name("John Doe");

        // first zoho attempt consumes the window and then fails on credentials
        let err = svc.submit_lead("user-1", "zoho", &lead).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Auth(_)));

        let err = svc.submit_lead("user-1", "zoho", &lead).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::RateLimited { .. }));

        // hubspot has its own window
        let err = svc.submit_lead("user-1", "hubspot", &lead).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Auth(_)));
    }
}
