//! Prospect: business-card scanning to CRM lead pipeline.
//!
//! Turns a photograph of a business card into a structured [`Lead`] via a
//! vision-language model, optionally enriches it with public web data, and
//! forwards it into one of several CRM platforms (Zoho, HubSpot, Salesforce,
//! Dynamics) over OAuth-authenticated REST APIs.
//!
//! The heart of the crate is the CRM integration layer: a [`CrmProvider`]
//! adapter per platform behind a common contract, an OAuth credential store
//! with refresh-on-expiry, and a sliding-window rate limiter guarding every
//! outbound call. [`CrmService`] ties these together for the presentation
//! layer.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use prospect::{CrmService, Lead, MemoryCredentialStore, ProspectConfig};
//!
//! # async fn run() -> prospect::Result<()> {
//! let config = ProspectConfig::from_env();
//! let store = Arc::new(MemoryCredentialStore::new());
//! let service = CrmService::new(config, store);
//!
//! let lead = Lead::from_full_name("John Doe").with_email("john@example.com");
//! let receipt = service.submit_lead("user-1", "salesforce", &lead).await?;
//! println!("{}", receipt.message);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod crm;
pub mod enrich;
pub mod error;
pub mod models;
pub mod scan;
pub mod util;

pub use auth::{
    AuthError, CredentialService, CredentialStore, FileCredentialStore, MemoryCredentialStore,
    OAuthCredentials,
};
pub use config::{CrmApp, ProspectConfig};
pub use crm::{create_provider, CrmName, CrmProvider, CrmService, LeadReceipt};
pub use enrich::{EnrichmentClient, PublicDataReport};
pub use error::{Error, Result};
pub use models::{Address, Lead, PublicData, SocialProfile};
pub use scan::{Transcriber, Transcription};
pub use util::RateLimiter;
