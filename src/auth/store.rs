use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credentials::OAuthCredentials;
use super::error::AuthError;
use crate::crm::CrmName;

/// Storage abstraction for OAuth credentials, keyed by (user, CRM).
///
/// Last write wins per key; implementations do not need cross-key locking.
pub trait CredentialStore: Send + Sync {
    fn load(&self, user_id: &str, crm: CrmName) -> Result<Option<OAuthCredentials>, AuthError>;
    fn save(
        &self,
        user_id: &str,
        crm: CrmName,
        credentials: &OAuthCredentials,
    ) -> Result<(), AuthError>;
    fn clear(&self, user_id: &str, crm: CrmName) -> Result<(), AuthError>;
}

/// Process-local credential store; the default for a single-instance
/// deployment. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<(String, CrmName), OAuthCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self, user_id: &str, crm: CrmName) -> Result<Option<OAuthCredentials>, AuthError> {
        let entries = self.entries.lock().expect("credential store lock poisoned");
        Ok(entries.get(&(user_id.to_string(), crm)).cloned())
    }

    fn save(
        &self,
        user_id: &str,
        crm: CrmName,
        credentials: &OAuthCredentials,
    ) -> Result<(), AuthError> {
        let mut entries = self.entries.lock().expect("credential store lock poisoned");
        entries.insert((user_id.to_string(), crm), credentials.clone());
        Ok(())
    }

    fn clear(&self, user_id: &str, crm: CrmName) -> Result<(), AuthError> {
        let mut entries = self.entries.lock().expect("credential store lock poisoned");
        entries.remove(&(user_id.to_string(), crm));
        Ok(())
    }
}

/// File-backed credential store using one TOML file per (user, CRM) pair.
///
/// Persistence is best-effort convenience for local deployments; the core
/// guarantees nothing about durability.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Store rooted at `~/.prospect` (falling back to a relative dir).
    pub fn new_default() -> Self {
        Self::new(default_prospect_dir())
    }

    fn entry_path(&self, user_id: &str, crm: CrmName) -> PathBuf {
        let user = normalize_label(user_id);
        self.base_dir.join(format!("{user}.{crm}.toml"))
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self, user_id: &str, crm: CrmName) -> Result<Option<OAuthCredentials>, AuthError> {
        let path = self.entry_path(user_id, crm);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        Ok(Some(file.credentials))
    }

    fn save(
        &self,
        user_id: &str,
        crm: CrmName,
        credentials: &OAuthCredentials,
    ) -> Result<(), AuthError> {
        let path = self.entry_path(user_id, crm);
        Self::ensure_parent(&path)?;
        let file = CredentialFile {
            version: 1,
            user_id: user_id.to_string(),
            crm: crm.to_string(),
            credentials: credentials.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self, user_id: &str, crm: CrmName) -> Result<(), AuthError> {
        let path = self.entry_path(user_id, crm);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    user_id: String,
    crm: String,
    credentials: OAuthCredentials,
    saved_at: DateTime<Utc>,
}

fn default_prospect_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".prospect"))
        .unwrap_or_else(|| PathBuf::from(".prospect"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '-' {
            out.push(lower);
        } else {
            out.push('-');
        }
    }
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileCredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    fn sample_credentials() -> OAuthCredentials {
        OAuthCredentials::new("access")
            .with_refresh_token("refresh")
            .with_expires_at(1_900_000_000)
    }

    #[test]
    fn memory_store_round_trip_and_overwrite() {
        let store = MemoryCredentialStore::new();
        store
            .save("user-1", CrmName::Zoho, &sample_credentials())
            .unwrap();
        let loaded = store.load("user-1", CrmName::Zoho).unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");

        let replacement = OAuthCredentials::new("access-2");
        store.save("user-1", CrmName::Zoho, &replacement).unwrap();
        let loaded = store.load("user-1", CrmName::Zoho).unwrap().unwrap();
        assert_eq!(loaded.access_token, "access-2");
    }

    #[test]
    fn memory_store_keys_are_independent() {
        let store = MemoryCredentialStore::new();
        store
            .save("user-1", CrmName::Zoho, &sample_credentials())
            .unwrap();
        assert!(store.load("user-1", CrmName::HubSpot).unwrap().is_none());
        assert!(store.load("user-2", CrmName::Zoho).unwrap().is_none());
    }

    #[test]
    fn file_store_round_trip_preserves_expiry_absence() {
        let (_dir, store) = temp_store();
        let creds = OAuthCredentials::new("access");
        store.save("user-1", CrmName::HubSpot, &creds).unwrap();
        let loaded = store.load("user-1", CrmName::HubSpot).unwrap().unwrap();
        assert_eq!(loaded, creds);
        assert_eq!(loaded.expires_at, None);
    }

    #[test]
    fn file_store_clear_removes_entry() {
        let (_dir, store) = temp_store();
        store
            .save("user-1", CrmName::Salesforce, &sample_credentials())
            .unwrap();
        store.clear("user-1", CrmName::Salesforce).unwrap();
        assert!(store.load("user-1", CrmName::Salesforce).unwrap().is_none());
        // idempotent
        store.clear("user-1", CrmName::Salesforce).unwrap();
    }

    #[test]
    fn normalize_label_sanitizes_user_ids() {
        assert_eq!(normalize_label("User One!"), "user-one-");
        assert_eq!(normalize_label(""), "default");
        assert_eq!(normalize_label("---"), "default");
    }
}
