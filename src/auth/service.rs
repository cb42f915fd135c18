use std::sync::Arc;

use tracing::{debug, info};

use super::credentials::OAuthCredentials;
use super::error::AuthError;
use super::store::CredentialStore;
use crate::crm::CrmProvider;

/// Lifecycle facade over a [`CredentialStore`].
///
/// Constructed once per process and passed by reference wherever credentials
/// are resolved; swapping the storage backend never touches adapter code.
/// Concurrent `resolve_valid` calls for one key may race to refresh; the
/// store keeps the last write, and provider refresh endpoints tolerate the
/// double refresh. Within one process, two sequential calls for the same key
/// never both observe an expired credential.
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Fetch stored credentials for the provider, refreshing on expiry.
    ///
    /// Absent credentials fail with [`AuthError::NotConnected`]. An expired
    /// credential without a refresh token fails with
    /// [`AuthError::TokenExpired`]; with one, the provider's refresh runs and
    /// the superseding credentials are stored before being returned.
    pub async fn resolve_valid(
        &self,
        user_id: &str,
        provider: &dyn CrmProvider,
    ) -> Result<OAuthCredentials, AuthError> {
        let crm = provider.crm_name();
        let current = self
            .store
            .load(user_id, crm)?
            .ok_or(AuthError::NotConnected)?;
        if !current.is_expired() {
            return Ok(current);
        }

        let refresh_token = current.refresh_token.ok_or(AuthError::TokenExpired)?;
        debug!(crm = %crm, user_id, "access token expired, refreshing");
        let refreshed = provider.refresh_token(&refresh_token).await?;
        self.store.save(user_id, crm, &refreshed)?;
        info!(crm = %crm, user_id, "refreshed OAuth credentials");
        Ok(refreshed)
    }

    /// Exchange an authorization code and persist the resulting credentials.
    ///
    /// The store is only written after a successful exchange.
    pub async fn complete_exchange(
        &self,
        user_id: &str,
        provider: &dyn CrmProvider,
        code: &str,
    ) -> Result<OAuthCredentials, AuthError> {
        let credentials = provider.exchange_code(code).await?;
        self.store
            .save(user_id, provider.crm_name(), &credentials)?;
        info!(crm = %provider.crm_name(), user_id, "stored OAuth credentials");
        Ok(credentials)
    }
}
