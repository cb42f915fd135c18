//! CRM provider trait and per-platform adapters.
//!
//! Each adapter owns its platform's wire format: endpoint URLs, header
//! conventions, and the lead field-mapping table. Everything above the
//! adapters ([`CrmService`], the credential layer) stays provider-agnostic.

pub mod dynamics;
pub mod format;
pub mod http;
pub mod hubspot;
pub mod salesforce;
pub mod service;
pub mod zoho;

use async_trait::async_trait;
use reqwest::Url;

use crate::auth::{AuthError, OAuthCredentials};
use crate::config::ProspectConfig;
use crate::error::{Error, Result};
use crate::models::Lead;

pub use dynamics::DynamicsProvider;
pub use hubspot::HubSpotProvider;
pub use salesforce::SalesforceProvider;
pub use service::{CrmService, LeadReceipt};
pub use zoho::ZohoProvider;

/// Supported CRM platforms.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CrmName {
    Zoho,
    HubSpot,
    Salesforce,
    Dynamics,
}

impl CrmName {
    /// Validate a provider name from the request path.
    ///
    /// Unknown names fail with [`Error::UnsupportedCrm`]; callers run this
    /// before any credential lookup or network call.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| Error::UnsupportedCrm(name.to_string()))
    }
}

/// Core trait implemented by all CRM adapters.
#[async_trait]
pub trait CrmProvider: Send + Sync {
    /// Which platform this adapter serves.
    fn crm_name(&self) -> CrmName;

    /// Compose the platform's authorization URL. Pure, no I/O; every query
    /// parameter is percent-encoded by the URL builder.
    fn build_auth_url(&self) -> Result<Url>;

    /// Exchange an authorization code for credentials (authorization_code
    /// grant). Non-2xx responses fail with [`AuthError::Exchange`] carrying
    /// the platform's raw error body.
    async fn exchange_code(&self, code: &str) -> std::result::Result<OAuthCredentials, AuthError>;

    /// Trade a refresh token for a superseding credential set.
    ///
    /// Adapters preserve whichever refresh token the platform returns: some
    /// rotate it, others omit it from the response to mean "keep using the
    /// old one".
    async fn refresh_token(&self, _refresh_token: &str) -> std::result::Result<OAuthCredentials, AuthError> {
        Err(AuthError::RefreshUnsupported {
            crm: self.crm_name().to_string(),
        })
    }

    /// Map the lead to the platform schema and create it via authenticated
    /// POST. Returns the parsed response body on success; non-success status
    /// fails with [`Error::Api`], transport failure with [`Error::Network`].
    async fn submit_lead(
        &self,
        lead: &Lead,
        credentials: &OAuthCredentials,
    ) -> Result<serde_json::Value>;
}

/// Create the adapter for the given platform, using the provided config.
///
/// Static dispatch table; no runtime registration, so support for a
/// platform never depends on initialization order.
pub fn create_provider(crm: CrmName, config: &ProspectConfig) -> Result<Box<dyn CrmProvider>> {
    let app = config
        .crm_app(crm)
        .cloned()
        .ok_or_else(|| Error::Configuration(format!("missing OAuth app configuration for {crm}")))?;

    Ok(match crm {
        CrmName::Zoho => {
            let mut provider = ZohoProvider::new(app);
            if let Some(base) = config.api_base(crm) {
                provider = provider.with_api_base(base);
            }
            if let Some(base) = config.auth_base(crm) {
                provider = provider.with_accounts_base(base);
            }
            Box::new(provider)
        }
        CrmName::HubSpot => {
            let mut provider = HubSpotProvider::new(app);
            if let Some(base) = config.api_base(crm) {
                provider = provider.with_api_base(base);
            }
            if let Some(base) = config.auth_base(crm) {
                provider = provider.with_auth_base(base);
            }
            Box::new(provider)
        }
        CrmName::Salesforce => {
            let mut provider = SalesforceProvider::new(app);
            if let Some(base) = config.auth_base(crm) {
                provider = provider.with_login_base(base);
            }
            if let Some(base) = config
                .api_base(crm)
                .or_else(|| config.salesforce_instance_url())
            {
                provider = provider.with_instance_base(base);
            }
            Box::new(provider)
        }
        CrmName::Dynamics => {
            let tenant = config
                .dynamics_tenant_id()
                .unwrap_or_else(|| "common".to_string());
            let org_url = config.dynamics_org_url().ok_or_else(|| {
                Error::Configuration("missing DYNAMICS_ORG_URL for the dynamics CRM".into())
            })?;
            let mut provider = DynamicsProvider::new(app, tenant, org_url)?;
            if let Some(base) = config.api_base(crm) {
                provider = provider.with_api_base(base);
            }
            if let Some(base) = config.auth_base(crm) {
                provider = provider.with_login_base(base);
            }
            Box::new(provider)
        }
    })
}
