//! Zoho CRM adapter (Leads module, API v2).

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::format::{insert_opt, insert_str, public_data_notes};
use super::http::{post_lead_json, post_token_form};
use super::{CrmName, CrmProvider};
use crate::auth::{AuthError, OAuthCredentials};
use crate::config::CrmApp;
use crate::error::{Error, Result};
use crate::models::Lead;

const DEFAULT_API_BASE: &str = "https://www.zohoapis.com";
const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.zoho.com";

const SCOPE: &str = "ZohoCRM.modules.ALL";

pub struct ZohoProvider {
    app: CrmApp,
    api_base: String,
    accounts_base: String,
}

impl ZohoProvider {
    pub fn new(app: CrmApp) -> Self {
        Self {
            app,
            api_base: DEFAULT_API_BASE.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_accounts_base(mut self, base: impl Into<String>) -> Self {
        self.accounts_base = base.into();
        self
    }

    /// Map a lead onto Zoho Lead record fields.
    ///
    /// Zoho requires `Last_Name`; the full name goes there so a
    /// single-token name still produces a valid record.
    fn lead_record(lead: &Lead) -> Map<String, Value> {
        let mut record = Map::new();
        insert_str(&mut record, "Last_Name", &lead.full_name());
        insert_opt(&mut record, "Email", lead.email.as_ref());
        insert_opt(&mut record, "Phone", lead.phone.as_ref());
        insert_opt(&mut record, "Company", lead.company.as_ref());
        insert_opt(&mut record, "Designation", lead.job_title.as_ref());
        insert_opt(&mut record, "Website", lead.website.as_ref());
        insert_opt(&mut record, "Twitter", lead.twitter_handle.as_ref());
        if let Some(address) = &lead.address {
            insert_opt(&mut record, "Street", address.street.as_ref());
            insert_opt(&mut record, "City", address.city.as_ref());
            insert_opt(&mut record, "State", address.state.as_ref());
            insert_opt(&mut record, "Zip_Code", address.postal_code.as_ref());
            insert_opt(&mut record, "Country", address.country.as_ref());
        }
        insert_str(&mut record, "Lead_Source", &lead.source);
        if let Some(notes) = lead.public_data.as_ref().and_then(public_data_notes) {
            record.insert("Description".into(), Value::String(notes));
        }
        record
    }

    /// Zoho reports per-record failures inside an HTTP 200/201 response,
    /// so the first record's status has to be inspected separately.
    fn check_record_status(result: Value) -> Result<Value> {
        let record = result
            .get("data")
            .and_then(|d| d.get(0))
            .cloned()
            .unwrap_or(Value::Null);
        let code = record.get("code").and_then(Value::as_str).unwrap_or("");
        if code == "SUCCESS" {
            Ok(result)
        } else {
            Err(Error::api(200, record.to_string()))
        }
    }
}

#[async_trait]
impl CrmProvider for ZohoProvider {
    fn crm_name(&self) -> CrmName {
        CrmName::Zoho
    }

    fn build_auth_url(&self) -> Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/oauth/v2/auth", self.accounts_base),
            &[
                ("scope", SCOPE),
                ("client_id", self.app.client_id.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("redirect_uri", self.app.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| Error::Configuration(format!("invalid Zoho auth URL: {e}")))?;
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> std::result::Result<OAuthCredentials, AuthError> {
        debug!(crm = "zoho", "exchanging authorization code");
        let resp = post_token_form(
            &format!("{}/oauth/v2/token", self.accounts_base),
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
        debug!(crm = "zoho", "refreshing access token");
        let resp = post_token_form(
            &format!("{}/oauth/v2/token", self.accounts_base),
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
        let body = json!({ "data": [Self::lead_record(lead)] });
        debug!(crm = "zoho", "creating lead record");
        let result = post_lead_json(
            &format!("{}/crm/v2/Leads", self.api_base),
            &credentials.access_token,
            &body,
            &[200, 201],
        )
        .await?;
        Self::check_record_status(result)
    }
}
