//! Salesforce adapter (Lead sObject, REST API v52.0).

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

const DEFAULT_LOGIN_BASE: &str = "https://login.salesforce.com";

const API_VERSION: &str = "v52.0";
const SCOPE: &str = "api refresh_token";

pub struct SalesforceProvider {
    app: CrmApp,
    login_base: String,
    /// Org instance host, e.g. `https://acme.my.salesforce.com`. Defaults to
    /// the login host until [`with_instance_base`](Self::with_instance_base)
    /// points it at the org.
    instance_base: String,
}

impl SalesforceProvider {
    pub fn new(app: CrmApp) -> Self {
        Self {
            app,
            login_base: DEFAULT_LOGIN_BASE.to_string(),
            instance_base: DEFAULT_LOGIN_BASE.to_string(),
        }
    }

    pub fn with_login_base(mut self, base: impl Into<String>) -> Self {
        self.login_base = base.into();
        self
    }

    pub fn with_instance_base(mut self, base: impl Into<String>) -> Self {
        self.instance_base = base.into();
        self
    }

    /// Map a lead onto Salesforce Lead fields.
    ///
    /// `LastName` and `Company` are required by the sObject; both are sent
    /// unconditionally, with `Unknown` standing in for a missing company.
    fn lead_fields(lead: &Lead) -> Map<String, Value> {
        let mut fields = Map::new();
        insert_str(&mut fields, "FirstName", &lead.first_name);
        insert_str(&mut fields, "LastName", &lead.last_name);
        insert_opt(&mut fields, "Email", lead.email.as_ref());
        insert_opt(&mut fields, "Phone", lead.phone.as_ref());
        let company = lead.company.as_deref().unwrap_or("Unknown");
        insert_str(&mut fields, "Company", company);
        insert_opt(&mut fields, "Title", lead.job_title.as_ref());
        insert_opt(&mut fields, "Website", lead.website.as_ref());
        if let Some(address) = &lead.address {
            insert_opt(&mut fields, "Street", address.street.as_ref());
            insert_opt(&mut fields, "City", address.city.as_ref());
            insert_opt(&mut fields, "State", address.state.as_ref());
            insert_opt(&mut fields, "PostalCode", address.postal_code.as_ref());
            insert_opt(&mut fields, "Country", address.country.as_ref());
        }
        insert_str(&mut fields, "LeadSource", &lead.source);
        if let Some(notes) = lead.public_data.as_ref().and_then(public_data_notes) {
            fields.insert("Description".into(), Value::String(notes));
        }
        fields
    }
}

#[async_trait]
impl CrmProvider for SalesforceProvider {
    fn crm_name(&self) -> CrmName {
        CrmName::Salesforce
    }

    fn build_auth_url(&self) -> Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/services/oauth2/authorize", self.login_base),
            &[
                ("response_type", "code"),
                ("client_id", self.app.client_id.as_str()),
                ("redirect_uri", self.app.redirect_uri.as_str()),
                ("scope", SCOPE),
            ],
        )
        .map_err(|e| Error::Configuration(format!("invalid Salesforce auth URL: {e}")))?;
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> std::result::Result<OAuthCredentials, AuthError> {
        debug!(crm = "salesforce", "exchanging authorization code");
        let resp = post_token_form(
            &format!("{}/services/oauth2/token", self.login_base),
            &[
                ("grant_type", "authorization_code"),
                ("client_id", &self.app.client_id),
                ("client_secret", &self.app.client_secret),
                ("redirect_uri", &self.app.redirect_uri),
                ("code", code),
            ],
        )
        .await?;
        Ok(resp.into_credentials(None))
    }

    async fn refresh_token(&self, refresh_token: &str) -> std::result::Result<OAuthCredentials, AuthError> {
        debug!(crm = "salesforce", "refreshing access token");
        let resp = post_token_form(
            &format!("{}/services/oauth2/token", self.login_base),
            &[
                ("grant_type", "refresh_token"),
                ("client_id", &self.app.client_id),
                ("client_secret", &self.app.client_secret),
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
        let body = Value::Object(Self::lead_fields(lead));
        debug!(crm = "salesforce", "creating lead record");
        post_lead_json(
            &format!(
                "{}/services/data/{}/sobjects/Lead",
                self.instance_base, API_VERSION
            ),
            &credentials.access_token,
            &body,
            &[200, 201],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_splits_across_first_and_last() {
        let lead = Lead::from_full_name("Ada King Lovelace");
        let fields = SalesforceProvider::lead_fields(&lead);
        assert_eq!(fields["FirstName"], "Ada");
        assert_eq!(fields["LastName"], "King Lovelace");
    }

    #[test]
    fn missing_company_falls_back_to_unknown() {
        let lead = Lead::from_full_name("Ada Lovelace");
        let fields = SalesforceProvider::lead_fields(&lead);
        assert_eq!(fields["Company"], "Unknown");

        let lead = lead.with_company("Analytical Engines Ltd");
        let fields = SalesforceProvider::lead_fields(&lead);
        assert_eq!(fields["Company"], "Analytical Engines Ltd");
    }

    #[test]
    fn address_maps_to_lead_address_fields() {
        let lead = Lead::from_full_name("Ada Lovelace").with_address(crate::models::Address {
            street: Some("12 St James Sq".into()),
            country: Some("UK".into()),
            ..Default::default()
        });
        let fields = SalesforceProvider::lead_fields(&lead);
        assert_eq!(fields["Street"], "12 St James Sq");
        assert_eq!(fields["Country"], "UK");
        assert!(!fields.contains_key("City"));
    }

    #[test]
    fn submit_targets_the_instance_not_the_login_host() {
        let provider = SalesforceProvider::new(CrmApp {
            client_id: "sf-id".into(),
            client_secret: "sf-secret".into(),
            redirect_uri: "https://app.example.com/oauth/callback".into(),
        })
        .with_instance_base("https://acme.my.salesforce.com");
        assert_eq!(provider.instance_base, "https://acme.my.salesforce.com");
        let url = provider.build_auth_url().unwrap();
        assert!(url.as_str().starts_with("https://login.salesforce.com/"));
    }
}
