//! Credential storage in the platform keychain.
//!
//! Each role keeps its two tokens under fixed account names
//! (`student.access_token`, `admin.refresh_token`, ...) within a single
//! keychain service, so a logout for one role never disturbs the other.
//!
//! ```no_run
//! use lalingua_common::auth::{CredentialPair, CredentialStore, KeychainCredentialStore};
//! use lalingua_common::Role;
//!
//! # async fn demo() -> Result<(), lalingua_common::CredentialStoreError> {
//! let store = KeychainCredentialStore::default();
//! store.save(Role::Student, &CredentialPair::new("access", "refresh")).await?;
//! assert!(store.load(Role::Student).await?.is_some());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use keyring::Entry;
use lalingua_domain::constants::KEYCHAIN_SERVICE_NAME;
use lalingua_domain::Role;
use tracing::{debug, warn};

use super::traits::{CredentialStore, CredentialStoreError};
use super::types::CredentialPair;

/// [`CredentialStore`] backed by the OS keychain
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    service_name: String,
}

impl KeychainCredentialStore {
    /// Create a store under a specific keychain service
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> Result<Entry, CredentialStoreError> {
        Entry::new(&self.service_name, key).map_err(|e| {
            CredentialStoreError::Backend(format!("Failed to open keychain entry {key}: {e}"))
        })
    }

    fn read(&self, key: &str) -> Result<Option<String>, CredentialStoreError> {
        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialStoreError::Backend(format!("Failed to read {key}: {e}"))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| CredentialStoreError::Backend(format!("Failed to store {key}: {e}")))
    }

    /// Idempotent; returns whether an entry existed.
    fn remove(&self, key: &str) -> Result<bool, CredentialStoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(CredentialStoreError::Backend(format!("Failed to delete {key}: {e}"))),
        }
    }
}

impl Default for KeychainCredentialStore {
    fn default() -> Self {
        Self::new(KEYCHAIN_SERVICE_NAME)
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn load(&self, role: Role) -> Result<Option<CredentialPair>, CredentialStoreError> {
        debug!(service = %self.service_name, %role, "Loading credentials from keychain");

        let Some(access_token) = self.read(role.access_token_key())? else {
            return Ok(None);
        };
        let Some(refresh_token) = self.read(role.refresh_token_key())? else {
            debug!(%role, "Keychain holds an access token without a refresh token");
            return Ok(None);
        };

        Ok(Some(CredentialPair { access_token, refresh_token }))
    }

    async fn save(&self, role: Role, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        debug!(service = %self.service_name, %role, "Storing credentials in keychain");
        self.write(role.access_token_key(), &pair.access_token)?;
        self.write(role.refresh_token_key(), &pair.refresh_token)
    }

    async fn replace_access_token(
        &self,
        role: Role,
        access_token: &str,
    ) -> Result<(), CredentialStoreError> {
        if self.read(role.refresh_token_key())?.is_none() {
            return Err(CredentialStoreError::Missing(role));
        }
        self.write(role.access_token_key(), access_token)
    }

    async fn clear(&self, role: Role) -> Result<bool, CredentialStoreError> {
        let removed = remove_each(
            [role.access_token_key(), role.refresh_token_key()],
            |key| self.remove(key),
        )?;
        debug!(service = %self.service_name, %role, removed, "Cleared keychain credentials");
        Ok(removed)
    }
}

/// Runs `remove` for every key even when an earlier one fails, then
/// reports the first failure.
fn remove_each<'k>(
    keys: impl IntoIterator<Item = &'k str>,
    mut remove: impl FnMut(&'k str) -> Result<bool, CredentialStoreError>,
) -> Result<bool, CredentialStoreError> {
    let mut removed = false;
    let mut first_error = None;
    for key in keys {
        match remove(key) {
            Ok(existed) => removed |= existed,
            Err(err) => {
                warn!(key, error = %err, "Failed to delete keychain entry");
                first_error.get_or_insert(err);
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(removed),
    }
}
