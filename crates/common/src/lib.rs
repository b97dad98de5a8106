//! Runtime pieces shared across LaLingua crates.
//!
//! # Feature Tiers
//!
//! - default: credential types, the [`auth::CredentialStore`] trait with an
//!   in-memory store, session-expiry observers, tracing setup
//! - `platform`: credential storage in the platform keychain

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod observability;

// Re-export commonly used types and traits for convenience
pub use auth::{
    CredentialPair, CredentialStore, CredentialStoreError, ExpiryReason, MemoryCredentialStore,
    NoopObserver, SessionExpired, SessionObserver,
};
#[cfg(feature = "platform")]
pub use auth::KeychainCredentialStore;
pub use lalingua_domain::Role;
