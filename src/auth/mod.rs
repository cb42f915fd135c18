//! OAuth credential types, storage backends, and the refresh lifecycle.

pub mod credentials;
pub mod error;
pub mod service;
pub mod store;

pub use credentials::OAuthCredentials;
pub use error::AuthError;
pub use service::CredentialService;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
