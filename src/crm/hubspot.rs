//! HubSpot adapter (contacts API v3).

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::format::{insert_opt, insert_str};
use super::http::{post_lead_json, post_token_form};
use super::{CrmName, CrmProvider};
use crate::auth::{AuthError, OAuthCredentials};
use crate::config::CrmApp;
use crate::error::Result;
use crate::models::Lead;

const DEFAULT_API_BASE: &str = "https://api.hubapi.com";
const DEFAULT_AUTH_BASE: &str = "https://app.hubspot.com";

const SCOPES: &[&str] = &[
    "crm.objects.contacts.read",
    "crm.objects.contacts.write",
    "crm.schemas.contacts.read",
    "crm.schemas.contacts.write",
    "oauth",
];

pub struct HubSpotProvider {
    app: CrmApp,
    api_base: String,
    auth_base: String,
}

impl HubSpotProvider {
    pub fn new(app: CrmApp) -> Self {
        Self {
            app,
            api_base: DEFAULT_API_BASE.to_string(),
            auth_base: DEFAULT_AUTH_BASE.to_string(),
        }
    }

    /// Override the API host (contacts + token endpoints).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Override the authorization host.
    pub fn with_auth_base(mut self, base: impl Into<String>) -> Self {
        self.auth_base = base.into();
        self
    }

    /// Map a lead onto HubSpot contact properties.
    ///
    /// `lastname` is always present, empty-string included, so a
    /// single-token name round-trips as `lastname=""` rather than vanishing.
    fn contact_properties(lead: &Lead) -> Map<String, Value> {
        let mut props = Map::new();
        insert_str(&mut props, "firstname", &lead.first_name);
        insert_str(&mut props, "lastname", &lead.last_name);
        insert_opt(&mut props, "email", lead.email.as_ref());
        insert_opt(&mut props, "phone", lead.phone.as_ref());
        insert_opt(&mut props, "company", lead.company.as_ref());
        insert_opt(&mut props, "jobtitle", lead.job_title.as_ref());
        insert_opt(&mut props, "website", lead.website.as_ref());
        insert_opt(&mut props, "twitterhandle", lead.twitter_handle.as_ref());
        if let Some(address) = &lead.address {
            insert_opt(&mut props, "address", address.street.as_ref());
            insert_opt(&mut props, "city", address.city.as_ref());
            insert_opt(&mut props, "state", address.state.as_ref());
            insert_opt(&mut props, "zip", address.postal_code.as_ref());
            insert_opt(&mut props, "country", address.country.as_ref());
        }
        insert_str(&mut props, "lifecyclestage", &lead.lifecycle_stage);
        props
    }
}

#[async_trait]
impl CrmProvider for HubSpotProvider {
    fn crm_name(&self) -> CrmName {
        CrmName::HubSpot
    }

    fn build_auth_url(&self) -> Result<Url> {
        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            &format!("{}/oauth/authorize", self.auth_base),
            &[
                ("client_id", self.app.client_id.as_str()),
                ("redirect_uri", self.app.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("response_type", "code"),
            ],
        )
        .map_err(|e| crate::error::Error::Configuration(format!("invalid HubSpot auth URL: {e}")))?;
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> std::result::Result<OAuthCredentials, AuthError> {
        debug!(crm = "hubspot", "exchanging authorization code");
        let resp = post_token_form(
            &format!("{}/oauth/v1/token", self.api_base),
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
        debug!(crm = "hubspot", "refreshing access token");
        let resp = post_token_form(
            &format!("{}/oauth/v1/token", self.api_base),
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
        let body = json!({ "properties": Self::contact_properties(lead) });
        debug!(crm = "hubspot", "creating contact");
        post_lead_json(
            &format!("{}/crm/v3/objects/contacts", self.api_base),
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

    fn app() -> CrmApp {
        CrmApp {
            client_id: "hub-id".into(),
            client_secret: "hub-secret".into(),
            redirect_uri: "https://app.example.com/oauth/callback".into(),
        }
    }

    #[test]
    fn full_name_maps_to_first_and_last() {
        let lead = Lead::from_full_name("John Doe");
        let props = HubSpotProvider::contact_properties(&lead);
        assert_eq!(props["firstname"], "John");
        assert_eq!(props["lastname"], "Doe");
    }

    #[test]
    fn single_token_name_keeps_empty_lastname_field() {
        let lead = Lead::from_full_name("John");
        let props = HubSpotProvider::contact_properties(&lead);
        assert_eq!(props["firstname"], "John");
        assert_eq!(props["lastname"], "");
    }

    #[test]
    fn absent_fields_are_omitted_not_nulled() {
        let lead = Lead::from_full_name("John Doe").with_email("john@example.com");
        let props = HubSpotProvider::contact_properties(&lead);
        assert_eq!(props["email"], "john@example.com");
        assert!(!props.contains_key("phone"));
        assert!(!props.values().any(Value::is_null));
    }

    #[test]
    fn address_fields_map_to_contact_properties() {
        let lead = Lead::from_full_name("John Doe").with_address(crate::models::Address {
            street: Some("1 Main St".into()),
            city: Some("Springfield".into()),
            postal_code: Some("12345".into()),
            ..Default::default()
        });
        let props = HubSpotProvider::contact_properties(&lead);
        assert_eq!(props["address"], "1 Main St");
        assert_eq!(props["city"], "Springfield");
        assert_eq!(props["zip"], "12345");
        assert!(!props.contains_key("state"));
    }

    #[test]
    fn auth_url_is_percent_encoded() {
        let provider = HubSpotProvider::new(app());
        let url = provider.build_auth_url().unwrap();
        assert!(url.as_str().starts_with("https://app.hubspot.com/oauth/authorize?"));

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "hub-id");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["scope"], SCOPES.join(" "));
        // the raw query never contains an unescaped space
        assert!(!url.query().unwrap().contains(' '));
    }
}
