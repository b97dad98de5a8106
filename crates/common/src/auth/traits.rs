//! Credential storage abstraction
//!
//! The API client only talks to this trait, so tests and embedders can swap
//! the backing storage.

use async_trait::async_trait;
use lalingua_domain::Role;
use thiserror::Error;

use super::types::CredentialPair;

/// Errors raised by a credential store backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialStoreError {
    /// Nothing stored for the role when an update needed an existing pair
    #[error("no credentials stored for {0}")]
    Missing(Role),

    /// The storage backend refused or failed the operation
    #[error("credential storage failed: {0}")]
    Backend(String),
}

/// Role-scoped storage for the live credential pair
///
/// Each role has at most one pair. Operations on one role never touch the
/// other role's tokens.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the pair for `role`, or `None` if logged out
    ///
    /// # Errors
    /// Returns [`CredentialStoreError::Backend`] if the backend cannot be read
    async fn load(&self, role: Role) -> Result<Option<CredentialPair>, CredentialStoreError>;

    /// Store a complete pair, replacing any previous one
    ///
    /// # Errors
    /// Returns [`CredentialStoreError::Backend`] if the write fails
    async fn save(&self, role: Role, pair: &CredentialPair) -> Result<(), CredentialStoreError>;

    /// Swap the access token, keeping the stored refresh token
    ///
    /// # Errors
    /// Returns [`CredentialStoreError::Missing`] if no pair is stored for
    /// `role`
    async fn replace_access_token(
        &self,
        role: Role,
        access_token: &str,
    ) -> Result<(), CredentialStoreError>;

    /// Remove both tokens for `role`
    ///
    /// # Returns
    /// `true` if anything was removed
    ///
    /// # Errors
    /// Returns [`CredentialStoreError::Backend`] if the delete fails
    async fn clear(&self, role: Role) -> Result<bool, CredentialStoreError>;

    /// Current access token for `role`, if any
    ///
    /// # Errors
    /// Propagates [`CredentialStore::load`] failures
    async fn access_token(&self, role: Role) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.load(role).await?.map(|pair| pair.access_token))
    }
}
