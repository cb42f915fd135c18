//! Runtime configuration, sourced from the environment or built in code.

use std::collections::HashMap;
use std::env;

use strum::IntoEnumIterator;
use tracing::debug;

use crate::crm::CrmName;

/// OAuth app registration for one CRM platform.
#[derive(Debug, Clone, PartialEq)]
pub struct CrmApp {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Aggregated settings for every integration the crate talks to.
///
/// [`from_env`](Self::from_env) is the production path; the setters exist so
/// tests and embedding applications can build a config without touching
/// process environment.
#[derive(Debug, Clone, Default)]
pub struct ProspectConfig {
    apps: HashMap<CrmName, CrmApp>,
    api_bases: HashMap<CrmName, String>,
    auth_bases: HashMap<CrmName, String>,
    dynamics_tenant_id: Option<String>,
    dynamics_org_url: Option<String>,
    salesforce_instance_url: Option<String>,
    openai_api_key: Option<String>,
    openai_base_url: Option<String>,
    serper_api_key: Option<String>,
    serper_base_url: Option<String>,
}

impl ProspectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Per-CRM variables follow the `{CRM}_CLIENT_ID`, `{CRM}_CLIENT_SECRET`,
    /// `{CRM}_REDIRECT_URI` pattern, with optional `{CRM}_API_BASE_URL` and
    /// `{CRM}_AUTH_BASE_URL` overrides. Platforms without a complete app
    /// registration are simply left unconfigured.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::new();

        for crm in CrmName::iter() {
            let prefix = crm.to_string().to_uppercase();
            let app = (
                env::var(format!("{prefix}_CLIENT_ID")).ok(),
                env::var(format!("{prefix}_CLIENT_SECRET")).ok(),
                env::var(format!("{prefix}_REDIRECT_URI")).ok(),
            );
            if let (Some(client_id), Some(client_secret), Some(redirect_uri)) = app {
                config.apps.insert(
                    crm,
                    CrmApp {
                        client_id,
                        client_secret,
                        redirect_uri,
                    },
                );
                debug!(%crm, "loaded OAuth app registration");
            }
            if let Ok(base) = env::var(format!("{prefix}_API_BASE_URL")) {
                config.api_bases.insert(crm, base);
            }
            if let Ok(base) = env::var(format!("{prefix}_AUTH_BASE_URL")) {
                config.auth_bases.insert(crm, base);
            }
        }

        config.dynamics_tenant_id = env::var("DYNAMICS_TENANT_ID").ok();
        config.dynamics_org_url = env::var("DYNAMICS_ORG_URL").ok();
        config.salesforce_instance_url = env::var("SALESFORCE_INSTANCE_URL").ok();
        config.openai_api_key = env::var("OPENAI_API_KEY").ok();
        config.openai_base_url = env::var("OPENAI_BASE_URL").ok();
        config.serper_api_key = env::var("SERPER_API_KEY").ok();
        config.serper_base_url = env::var("SERPER_BASE_URL").ok();
        config
    }

    pub fn crm_app(&self, crm: CrmName) -> Option<&CrmApp> {
        self.apps.get(&crm)
    }

    pub fn api_base(&self, crm: CrmName) -> Option<String> {
        self.api_bases.get(&crm).cloned()
    }

    pub fn auth_base(&self, crm: CrmName) -> Option<String> {
        self.auth_bases.get(&crm).cloned()
    }

    pub fn dynamics_tenant_id(&self) -> Option<String> {
        self.dynamics_tenant_id.clone()
    }

    pub fn dynamics_org_url(&self) -> Option<String> {
        self.dynamics_org_url.clone()
    }

    pub fn salesforce_instance_url(&self) -> Option<String> {
        self.salesforce_instance_url.clone()
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }

    pub fn openai_base_url(&self) -> Option<&str> {
        self.openai_base_url.as_deref()
    }

    pub fn serper_api_key(&self) -> Option<&str> {
        self.serper_api_key.as_deref()
    }

    pub fn serper_base_url(&self) -> Option<&str> {
        self.serper_base_url.as_deref()
    }

    pub fn set_crm_app(&mut self, crm: CrmName, app: CrmApp) -> &mut Self {
        self.apps.insert(crm, app);
        self
    }

    pub fn set_api_base(&mut self, crm: CrmName, base: impl Into<String>) -> &mut Self {
        self.api_bases.insert(crm, base.into());
        self
    }

    pub fn set_auth_base(&mut self, crm: CrmName, base: impl Into<String>) -> &mut Self {
        self.auth_bases.insert(crm, base.into());
        self
    }

    pub fn set_dynamics_tenant_id(&mut self, tenant: impl Into<String>) -> &mut Self {
        self.dynamics_tenant_id = Some(tenant.into());
        self
    }

    pub fn set_dynamics_org_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.dynamics_org_url = Some(url.into());
        self
    }

    pub fn set_salesforce_instance_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.salesforce_instance_url = Some(url.into());
        self
    }

    pub fn set_openai_api_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn set_serper_api_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.serper_api_key = Some(key.into());
        self
    }
}
