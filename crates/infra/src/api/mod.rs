//! Authenticated backend client for LaLingua
//!
//! # Architecture
//!
//! - [`ApiClient`] sends every request through [`HttpClient`](crate::http::HttpClient)
//! - Bearer tokens come from a role-scoped
//!   [`CredentialStore`](lalingua_common::CredentialStore)
//! - A 401 triggers one coalesced refresh ([`RefreshCoordinator`]) and a
//!   single replay
//! - Unrecoverable sessions are cleared and reported to a
//!   [`SessionObserver`](lalingua_common::SessionObserver)

pub mod auth;
pub mod client;
pub mod errors;
pub mod refresh;
pub mod request;

pub use auth::{RefreshResponse, RefreshTransport};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory};
pub use refresh::{RefreshCoordinator, RefreshLease, RefreshOutcome, RefreshTurn};
pub use request::{PreparedRequest, RequestOptions};
