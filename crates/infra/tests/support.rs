//! Shared helpers for infra integration tests.

use std::sync::Arc;
use std::time::Duration;

use lalingua_common::observability::{init_tracing, TracingConfig};
use lalingua_common::{
    CredentialPair, CredentialStore, ExpiryReason, MemoryCredentialStore, Role, SessionExpired,
    SessionObserver,
};
use lalingua_infra::api::{ApiClient, ApiClientConfig};
use parking_lot::Mutex;
use wiremock::MockServer;

pub const ACCESS: &str = "access-1";
pub const REFRESH: &str = "refresh-1";
pub const FRESH_ACCESS: &str = "access-2";

/// Install a test subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = init_tracing(&TracingConfig::default().with_default_directive("lalingua_infra=debug"));
}

/// Observer that remembers every session-expired event it receives.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SessionExpired>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<SessionExpired> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn reasons(&self) -> Vec<ExpiryReason> {
        self.events.lock().iter().map(|event| event.reason).collect()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_session_expired(&self, event: &SessionExpired) {
        self.events.lock().push(event.clone());
    }
}

/// Client, store and observer wired together against a mock server.
pub struct Harness {
    pub client: Arc<ApiClient>,
    pub store: Arc<MemoryCredentialStore>,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub async fn stored_pair(&self) -> Option<CredentialPair> {
        self.store.load(self.client.role()).await.expect("memory store never fails")
    }
}

pub fn client_config(server: &MockServer, role: Role) -> ApiClientConfig {
    ApiClientConfig {
        base_url: format!("{}/api", server.uri()),
        timeout: Duration::from_secs(2),
        role,
        ..ApiClientConfig::default()
    }
}

pub fn harness_with_store(server: &MockServer, role: Role, store: MemoryCredentialStore) -> Harness {
    init_test_tracing();
    let store = Arc::new(store);
    let observer = Arc::new(RecordingObserver::default());
    let client = ApiClient::new(client_config(server, role), store.clone(), observer.clone())
        .expect("client should build");
    Harness { client: Arc::new(client), store, observer }
}

/// Harness whose store holds `ACCESS`/`REFRESH` for `role`.
pub fn logged_in(server: &MockServer, role: Role) -> Harness {
    harness_with_store(server, role, MemoryCredentialStore::with_pair(role, CredentialPair::new(ACCESS, REFRESH)))
}

pub fn logged_out(server: &MockServer, role: Role) -> Harness {
    harness_with_store(server, role, MemoryCredentialStore::new())
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
