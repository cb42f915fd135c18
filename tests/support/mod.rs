//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use prospect::auth::AuthError;
use prospect::{CrmApp, CrmName, CredentialStore, OAuthCredentials, ProspectConfig};

/// In-memory store that counts reads, so tests can assert that an operation
/// never reached the credential layer.
#[derive(Debug, Default)]
pub struct CountingStore {
    entries: Mutex<HashMap<(String, CrmName), OAuthCredentials>>,
    load_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn seed(&self, user_id: &str, crm: CrmName, credentials: OAuthCredentials) {
        self.entries
            .lock()
            .unwrap()
            .insert((user_id.to_string(), crm), credentials);
    }

    pub fn get(&self, user_id: &str, crm: CrmName) -> Option<OAuthCredentials> {
        self.entries
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), crm))
            .cloned()
    }
}

impl CredentialStore for CountingStore {
    fn load(&self, user_id: &str, crm: CrmName) -> Result<Option<OAuthCredentials>, AuthError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(user_id, crm))
    }

    fn save(
        &self,
        user_id: &str,
        crm: CrmName,
        credentials: &OAuthCredentials,
    ) -> Result<(), AuthError> {
        self.seed(user_id, crm, credentials.clone());
        Ok(())
    }

    fn clear(&self, user_id: &str, crm: CrmName) -> Result<(), AuthError> {
        self.entries
            .lock()
            .unwrap()
            .remove(&(user_id.to_string(), crm));
        Ok(())
    }
}

pub fn test_app() -> CrmApp {
    CrmApp {
        client_id: "test-client-id".into(),
        client_secret: "test-client-secret".into(),
        redirect_uri: "https://app.example.com/oauth/callback".into(),
    }
}

/// Config with one CRM's app registered and both its hosts pointed at a
/// wiremock server.
pub fn config_for(crm: CrmName, mock_base: &str) -> ProspectConfig {
    let mut config = ProspectConfig::new();
    config
        .set_crm_app(crm, test_app())
        .set_api_base(crm, mock_base)
        .set_auth_base(crm, mock_base);
    if crm == CrmName::Salesforce {
        config.set_salesforce_instance_url(mock_base);
    }
    if crm == CrmName::Dynamics {
        config.set_dynamics_org_url(mock_base);
        config.set_dynamics_tenant_id("test-tenant");
    }
    config
}

/// Credentials that expired an hour ago but still carry a refresh token.
pub fn expired_credentials() -> OAuthCredentials {
    OAuthCredentials::new("stale-access-token")
        .with_refresh_token("refresh-token-1")
        .with_expires_at(chrono::Utc::now().timestamp() - 3_600)
}

/// Credentials valid for another hour.
pub fn fresh_credentials() -> OAuthCredentials {
    OAuthCredentials::new("live-access-token")
        .with_refresh_token("refresh-token-1")
        .with_expires_at(chrono::Utc::now().timestamp() + 3_600)
}
