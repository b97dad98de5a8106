//! Session credentials
//!
//! Every authenticated request needs the access token for one [`Role`];
//! every refresh needs the refresh token for that same role. This module owns
//! where those live and how the rest of the client is told that a session has
//! ended.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │    ApiClient     │  (lalingua-infra)
//! └────────┬─────────┘
//!          │
//!          ├──► CredentialStore   (role-scoped token pair)
//!          │         ├── MemoryCredentialStore    (session lifetime)
//!          │         └── KeychainCredentialStore  (platform keychain)
//!          │
//!          └──► SessionObserver   (session-expired signal → login redirect)
//! ```
//!
//! [`Role`]: lalingua_domain::Role

#[cfg(feature = "platform")]
pub mod keychain;
pub mod session;
pub mod store;
pub mod traits;
pub mod types;

#[cfg(feature = "platform")]
pub use keychain::KeychainCredentialStore;
pub use session::{ExpiryReason, NoopObserver, SessionExpired, SessionObserver};
pub use store::MemoryCredentialStore;
pub use traits::{CredentialStore, CredentialStoreError};
pub use types::CredentialPair;
