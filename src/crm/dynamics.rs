//! Microsoft Dynamics 365 adapter (leads entity, Web API v9.2).

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::debug;

use super::format::{insert_opt, insert_str, public_data_notes};
use super::http::{post_lead_json, post_token_form};
use super::{CrmName, CrmProvider};
use crate::auth::{AuthError, OAuthCredentials};
use crate::config::CrmApp;
use crate::error::{Error, Result};
use crate::models::Lead;

const DEFAULT_LOGIN_BASE: &str = "https://login.microsoftonline.com";

pub struct DynamicsProvider {
    app: CrmApp,
    login_base: String,
    /// Entra tenant, or `common` for multi-tenant apps.
    tenant: String,
    /// Org root used in the OAuth scope, e.g. `https://contoso.crm.dynamics.com`.
    org_url: String,
    api_base: String,
}

impl DynamicsProvider {
    /// Fails if `org_url` is not a valid absolute URL; the Web API host is
    /// derived from it (`contoso.crm.dynamics.com` serves its API from
    /// `contoso.api.crm.dynamics.com`).
    pub fn new(
        app: CrmApp,
        tenant: impl Into<String>,
        org_url: impl Into<String>,
    ) -> Result<Self> {
        let org_url = org_url.into();
        let api_base = derive_api_base(&org_url)?;
        Ok(Self {
            app,
            login_base: DEFAULT_LOGIN_BASE.to_string(),
            tenant: tenant.into(),
            org_url,
            api_base,
        })
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_login_base(mut self, base: impl Into<String>) -> Self {
        self.login_base = base.into();
        self
    }

    fn scope(&self) -> String {
        format!("{}/.default offline_access", self.org_url)
    }

    fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_base, self.tenant)
    }

    /// Map a lead onto Dynamics lead entity attributes.
    fn lead_attributes(lead: &Lead) -> Map<String, Value> {
        let mut attrs = Map::new();
        insert_str(&mut attrs, "firstname", &lead.first_name);
        insert_str(&mut attrs, "lastname", &lead.last_name);
        insert_opt(&mut attrs, "emailaddress1", lead.email.as_ref());
        insert_opt(&mut attrs, "telephone1", lead.phone.as_ref());
        insert_opt(&mut attrs, "companyname", lead.company.as_ref());
        insert_opt(&mut attrs, "jobtitle", lead.job_title.as_ref());
        insert_opt(&mut attrs, "websiteurl", lead.website.as_ref());
        if let Some(address) = &lead.address {
            insert_opt(&mut attrs, "address1_line1", address.street.as_ref());
            insert_opt(&mut attrs, "address1_city", address.city.as_ref());
            insert_opt(
                &mut attrs,
                "address1_stateorprovince",
                address.state.as_ref(),
            );
            insert_opt(&mut attrs, "address1_postalcode", address.postal_code.as_ref());
            insert_opt(&mut attrs, "address1_country", address.country.as_ref());
        }
        if let Some(notes) = lead.public_data.as_ref().and_then(public_data_notes) {
            attrs.insert("description".into(), Value::String(notes));
        }
        attrs
    }
}

fn derive_api_base(org_url: &str) -> Result<String> {
    let parsed = Url::parse(org_url)
        .map_err(|e| Error::Configuration(format!("invalid Dynamics org URL {org_url:?}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::Configuration(format!("Dynamics org URL {org_url:?} has no host")))?;
    if host.contains(".api.") {
        return Ok(format!("{}://{host}", parsed.scheme()));
    }
    match host.split_once('.') {
        Some((org, rest)) => Ok(format!("{}://{org}.api.{rest}", parsed.scheme())),
        None => Err(Error::Configuration(format!(
            "Dynamics org URL {org_url:?} has no org subdomain"
        ))),
    }
}

#[async_trait]
impl CrmProvider for DynamicsProvider {
    fn crm_name(&self) -> CrmName {
        CrmName::Dynamics
    }

    fn build_auth_url(&self) -> Result<Url> {
        let scope = self.scope();
        let url = Url::parse_with_params(
            &format!("{}/{}/oauth2/v2.0/authorize", self.login_base, self.tenant),
            &[
                ("client_id", self.app.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.app.redirect_uri.as_str()),
                ("response_mode", "query"),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| Error::Configuration(format!("invalid Dynamics auth URL: {e}")))?;
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> std::result::Result<OAuthCredentials, AuthError> {
        debug!(crm = "dynamics", "exchanging authorization code");
        let scope = self.scope();
        let resp = post_token_form(
            &self.token_url(),
            &[
                ("grant_type", "authorization_code"),
                ("client_id", &self.app.client_id),
                ("client_secret", &self.app.client_secret),
                ("redirect_uri", &self.app.redirect_uri),
                ("scope", &scope),
                ("code", code),
            ],
        )
        .await?;
        Ok(resp.into_credentials(None))
    }

    async fn refresh_token(&self, refresh_token: &str) -> std::result::Result<OAuthCredentials, AuthError> {
        debug!(crm = "dynamics", "refreshing access token");
        let scope = self.scope();
        let resp = post_token_form(
            &self.token_url(),
            &[
                ("grant_type", "refresh_token"),
                ("client_id", &self.app.client_id),
                ("client_secret", &self.app.client_secret),
                ("scope", &scope),
                ("refresh_token", refresh_token),
            ],
        )
        .await?;
        Ok(resp.into_credentials(Some(refresh_token)))
    }

    async fn submit_lead(
        &self,
        lead: &Lead,
        credentials: &OAuthCredentials,
    ) -> Result<Value> {
        let body = Value::Object(Self::lead_attributes(lead));
        debug!(crm = "dynamics", "creating lead entity");
        // a default Web API create returns 204 No Content
        post_lead_json(
            &format!("{}/api/data/v9.2/leads", self.api_base),
            &credentials.access_token,
            &body,
            &[200, 201, 204],
        )
        .await
    }
}
