//! In-memory credential store

use std::collections::HashMap;

use async_trait::async_trait;
use lalingua_domain::Role;
use parking_lot::RwLock;
use tracing::debug;

use super::traits::{CredentialStore, CredentialStoreError};
use super::types::CredentialPair;

/// Credentials held for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    pairs: RwLock<HashMap<Role, CredentialPair>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one pair
    #[must_use]
    pub fn with_pair(role: Role, pair: CredentialPair) -> Self {
        let store = Self::new();
        store.pairs.write().insert(role, pair);
        store
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self, role: Role) -> Result<Option<CredentialPair>, CredentialStoreError> {
        Ok(self.pairs.read().get(&role).cloned())
    }

    async fn save(&self, role: Role, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        debug!(%role, "Storing credential pair in memory");
        self.pairs.write().insert(role, pair.clone());
        Ok(())
    }

    async fn replace_access_token(
        &self,
        role: Role,
        access_token: &str,
    ) -> Result<(), CredentialStoreError> {
        let mut pairs = self.pairs.write();
        let pair = pairs.get_mut(&role).ok_or(CredentialStoreError::Missing(role))?;
        access_token.clone_into(&mut pair.access_token);
        Ok(())
    }

    async fn clear(&self, role: Role) -> Result<bool, CredentialStoreError> {
        let removed = self.pairs.write().remove(&role).is_some();
        debug!(%role, removed, "Cleared in-memory credentials");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roles_are_isolated() {
        let store = MemoryCredentialStore::new();
        store.save(Role::Student, &CredentialPair::new("s-access", "s-refresh")).await.unwrap();
        store.save(Role::Admin, &CredentialPair::new("a-access", "a-refresh")).await.unwrap();

        assert!(store.clear(Role::Admin).await.unwrap());

        assert_eq!(store.access_token(Role::Student).await.unwrap().as_deref(), Some("s-access"));
        assert!(store.load(Role::Admin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_access_token_keeps_refresh_token() {
        let store = MemoryCredentialStore::with_pair(Role::Student, CredentialPair::new("old", "refresh"));

        store.replace_access_token(Role::Student, "new").await.unwrap();

        let pair = store.load(Role::Student).await.unwrap().unwrap();
        assert_eq!(pair, CredentialPair::new("new", "refresh"));
    }

    #[tokio::test]
    async fn replace_without_pair_is_missing() {
        let store = MemoryCredentialStore::new();
        let err = store.replace_access_token(Role::Admin, "new").await.unwrap_err();
        assert_eq!(err, CredentialStoreError::Missing(Role::Admin));
    }

    #[tokio::test]
    async fn clear_reports_whether_anything_was_removed() {
        let store = MemoryCredentialStore::with_pair(Role::Student, CredentialPair::new("a", "r"));
        assert!(store.clear(Role::Student).await.unwrap());
        assert!(!store.clear(Role::Student).await.unwrap());
    }
}
