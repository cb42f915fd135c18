//! Optional public web data lookup for a scanned contact.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::crm::http::shared_client;

const DEFAULT_SEARCH_BASE: &str = "https://google.serper.dev";

/// Whatever the search backend knows about the contact, kept opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublicDataReport {
    pub serper: Value,
}

impl PublicDataReport {
    pub fn is_empty(&self) -> bool {
        self.serper.is_null()
    }
}

/// Web-search client for lead enrichment.
///
/// Enrichment is best-effort throughout: any failure degrades to an empty
/// report with a logged warning and never fails the surrounding scan.
pub struct EnrichmentClient {
    api_key: String,
    search_base: String,
}

impl EnrichmentClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_base: DEFAULT_SEARCH_BASE.to_string(),
        }
    }

    pub fn with_search_base(mut self, base: impl Into<String>) -> Self {
        self.search_base = base.into();
        self
    }

    /// Look up the contact by email, falling back to the LinkedIn URL.
    pub async fn gather(
        &self,
        email: Option<&str>,
        linkedin_profile: Option<&str>,
    ) -> PublicDataReport {
        let Some(query) = email.or(linkedin_profile).filter(|q| !q.is_empty()) else {
            return PublicDataReport::default();
        };

        debug!(query, "gathering public data");
        match self.search(query).await {
            Ok(serper) => PublicDataReport { serper },
            Err(reason) => {
                warn!(query, %reason, "public data lookup failed, continuing without it");
                PublicDataReport::default()
            }
        }
    }

    async fn search(&self, query: &str) -> Result<Value, String> {
        let response = shared_client()
            .post(format!("{}/search", self.search_base))
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("search returned status {status}"));
        }
        response.json().await.map_err(|e| e.to_string())
    }
}
