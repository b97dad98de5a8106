//! Integration tests for token refresh and session expiry
//!
//! **Coverage:**
//! - Happy path: valid token, no refresh call
//! - One expired token recovered transparently
//! - N concurrent 401s coalesce into exactly one refresh call
//! - Queued requests resolve independently with the refreshed token, and a
//!   failing replay only fails its own caller
//! - A 401 on the replay is terminal (single retry)
//! - Refresh failure rejects every caller, clears the store, redirects once
//! - 403, on the first attempt or on the replay, clears the store and redirects
//! - Public and skip-refresh requests never enter the refresh path
//!
//! **Infrastructure:**
//! - WireMock HTTP server standing in for the LaLingua backend
//! - In-memory credential store and a recording session observer

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::time::Duration;

use futures::future::join_all;
use lalingua_common::{CredentialPair, ExpiryReason, Role};
use lalingua_infra::api::{ApiClient, ApiClientConfig, ApiError, RequestOptions};
use serde_json::{json, Value};
use support::{bearer, logged_in, logged_out, ACCESS, FRESH_ACCESS, REFRESH};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const STUDENT_REFRESH: &str = "/api/auth/refresh-token";
const ADMIN_REFRESH: &str = "/api/admin/auth/refresh-token";

/// Matches requests sent without an `Authorization` header.
struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

async fn mount_refresh_success(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(STUDENT_REFRESH))
        .and(body_json(json!({ "refreshToken": REFRESH })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": FRESH_ACCESS }))
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_no_refresh(server: &MockServer, refresh_path: &str) {
    Mock::given(method("POST"))
        .and(path(refresh_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "unused" })))
        .expect(0)
        .mount(server)
        .await;
}

/// 401 for the stale token, 200 for the refreshed one.
async fn mount_expiring_resource(server: &MockServer, resource: &str, payload: Value) {
    Mock::given(method("GET"))
        .and(path(resource.to_string()))
        .and(header("authorization", bearer(ACCESS).as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(resource.to_string()))
        .and(header("authorization", bearer(FRESH_ACCESS).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(server)
        .await;
}

// ============================================================================
// Happy path and single recovery
// ============================================================================

#[tokio::test]
async fn valid_token_is_sent_and_no_refresh_happens() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(header("authorization", bearer(ACCESS).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "courses": [] })))
        .expect(1)
        .mount(&server)
        .await;
    mount_no_refresh(&server, STUDENT_REFRESH).await;

    let body: Value = h.client.get("/courses", RequestOptions::new()).await.expect("request succeeds");

    assert_eq!(body, json!({ "courses": [] }));
    assert_eq!(h.observer.count(), 0);
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_replayed() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    mount_expiring_resource(&server, "/api/courses", json!({ "ok": true })).await;
    mount_refresh_success(&server, Duration::ZERO).await;

    let body: Value = h.client.get("/courses", RequestOptions::new()).await.expect("recovered");

    assert_eq!(body, json!({ "ok": true }));
    assert_eq!(h.stored_pair().await, Some(CredentialPair::new(FRESH_ACCESS, REFRESH)));
    assert!(!h.client.is_refreshing());
    assert_eq!(h.observer.count(), 0);
}

// ============================================================================
// Coalescing and queue draining
// ============================================================================

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    mount_expiring_resource(&server, "/api/courses", json!({ "ok": true })).await;
    // Slow enough that every caller sees its 401 while the refresh is running
    mount_refresh_success(&server, Duration::from_millis(300)).await;

    let calls = (0..5).map(|_| h.client.get::<Value>("/courses", RequestOptions::new()));
    let results = join_all(calls).await;

    assert_eq!(results.len(), 5);
    for result in results {
        assert_eq!(result.expect("every caller recovers"), json!({ "ok": true }));
    }
    assert_eq!(h.observer.count(), 0);
}

#[tokio::test]
async fn queued_requests_each_replay_their_own_request() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    for id in 1..=4 {
        mount_expiring_resource(&server, &format!("/api/leave/{id}"), json!({ "id": id })).await;
    }
    mount_refresh_success(&server, Duration::from_millis(300)).await;

    let calls = (1..=4).map(|id| {
        let client = h.client.clone();
        async move { client.get::<Value>(&format!("/leave/{id}"), RequestOptions::new()).await }
    });
    let results = join_all(calls).await;

    for (id, result) in (1..=4).zip(results) {
        assert_eq!(result.expect("replayed"), json!({ "id": id }));
    }
    let received = server.received_requests().await.expect("recording enabled");
    let replays_with_stale_token = received
        .iter()
        .filter(|r| r.url.path().starts_with("/api/leave/"))
        .filter(|r| r.headers.get("authorization").is_some_and(|v| v == bearer(ACCESS).as_str()))
        .count();
    assert_eq!(replays_with_stale_token, 4, "each request is sent once with the stale token");
}

#[tokio::test]
async fn queued_replay_failure_stays_with_its_own_caller() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    for id in [1, 2, 4] {
        mount_expiring_resource(&server, &format!("/api/leave/{id}"), json!({ "id": id })).await;
    }
    Mock::given(method("GET"))
        .and(path("/api/leave/3"))
        .and(header("authorization", bearer(ACCESS).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/leave/3"))
        .and(header("authorization", bearer(FRESH_ACCESS).as_str()))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "leave store down" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh_success(&server, Duration::from_millis(300)).await;

    let calls = (1..=4).map(|id| {
        let client = h.client.clone();
        async move { client.get::<Value>(&format!("/leave/{id}"), RequestOptions::new()).await }
    });
    let results = join_all(calls).await;

    for (id, result) in (1..=4).zip(results) {
        if id == 3 {
            assert_eq!(
                result.unwrap_err(),
                ApiError::Upstream { status: 500, message: "leave store down".to_string() }
            );
        } else {
            assert_eq!(result.expect("replayed"), json!({ "id": id }));
        }
    }
    assert_eq!(h.stored_pair().await, Some(CredentialPair::new(FRESH_ACCESS, REFRESH)));
    assert_eq!(h.observer.count(), 0);
}

#[tokio::test]
async fn forbidden_replay_ends_the_session() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(header("authorization", bearer(ACCESS).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(header("authorization", bearer(FRESH_ACCESS).as_str()))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Account blocked" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh_success(&server, Duration::ZERO).await;

    let err = h.client.get::<Value>("/courses", RequestOptions::new()).await.unwrap_err();

    assert_eq!(err, ApiError::Forbidden("Account blocked".to_string()));
    assert!(err.is_terminal_auth());
    assert_eq!(h.stored_pair().await, None);
    assert_eq!(h.observer.reasons(), vec![ExpiryReason::Forbidden]);
}

// ============================================================================
// Terminal outcomes
// ============================================================================

#[tokio::test]
async fn unauthorized_replay_is_not_retried_again() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh_success(&server, Duration::ZERO).await;

    let err = h.client.get::<Value>("/courses", RequestOptions::new()).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired(_)), "got {err:?}");
    assert!(err.is_terminal_auth());
    assert_eq!(h.stored_pair().await, None);
    assert_eq!(h.observer.reasons(), vec![ExpiryReason::RepeatedUnauthorized]);
}

#[tokio::test]
async fn failed_refresh_rejects_every_caller_and_redirects_once() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(STUDENT_REFRESH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "refresh token expired" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let calls = (0..3).map(|_| h.client.get::<Value>("/courses", RequestOptions::new()));
    let results = join_all(calls).await;

    for result in results {
        assert!(matches!(result, Err(ApiError::SessionExpired(_))), "got {result:?}");
    }
    assert_eq!(h.stored_pair().await, None);
    let events = h.observer.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, ExpiryReason::RefreshFailed);
    assert_eq!(events[0].role, Role::Student);
    assert_eq!(events[0].redirect_to, "/login");
    assert!(!h.client.is_refreshing());
}

#[tokio::test]
async fn missing_refresh_token_ends_the_session() {
    let server = MockServer::start().await;
    let h = logged_out(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_no_refresh(&server, STUDENT_REFRESH).await;

    let err = h.client.get::<Value>("/courses", RequestOptions::new()).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired(_)), "got {err:?}");
    assert_eq!(h.observer.reasons(), vec![ExpiryReason::RefreshFailed]);
}

#[tokio::test]
async fn forbidden_logs_out_without_refreshing() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Account blocked" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_no_refresh(&server, STUDENT_REFRESH).await;

    let err = h.client.get::<Value>("/courses", RequestOptions::new()).await.unwrap_err();

    assert_eq!(err, ApiError::Forbidden("Account blocked".to_string()));
    assert_eq!(err.status(), Some(403));
    assert_eq!(h.stored_pair().await, None);
    assert_eq!(h.observer.reasons(), vec![ExpiryReason::Forbidden]);
}

#[tokio::test]
async fn new_login_rearms_the_expiry_signal() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(403))
        .expect(3)
        .mount(&server)
        .await;

    let _ = h.client.get::<Value>("/courses", RequestOptions::new()).await;
    let _ = h.client.get::<Value>("/courses", RequestOptions::new()).await;
    assert_eq!(h.observer.count(), 1, "signal fires once per session");

    h.client.set_credentials(&CredentialPair::new(ACCESS, REFRESH)).await.expect("stored");
    let _ = h.client.get::<Value>("/courses", RequestOptions::new()).await;
    assert_eq!(h.observer.count(), 2);
}

#[tokio::test]
async fn user_logout_does_not_fire_the_expiry_signal() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_no_refresh(&server, STUDENT_REFRESH).await;

    assert!(h.client.clear_credentials().await.expect("cleared"));
    let err = h.client.get::<Value>("/courses", RequestOptions::new()).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired(_)));
    assert_eq!(h.observer.count(), 0);
}

// ============================================================================
// Requests outside the refresh path
// ============================================================================

#[tokio::test]
async fn public_requests_carry_no_token_and_never_refresh() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/auth/courses"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "nope" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_no_refresh(&server, STUDENT_REFRESH).await;

    let err = h.client.get::<Value>("/auth/courses", RequestOptions::new().public()).await.unwrap_err();

    assert_eq!(err, ApiError::Upstream { status: 401, message: "nope".to_string() });
    assert_eq!(h.stored_pair().await, Some(CredentialPair::new(ACCESS, REFRESH)));
    assert_eq!(h.observer.count(), 0);
}

#[tokio::test]
async fn skip_refresh_passes_unauthorized_through() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_no_refresh(&server, STUDENT_REFRESH).await;

    let err = h
        .client
        .post::<_, Value>("/auth/login", &json!({ "email": "a@b.c" }), RequestOptions::new().skip_refresh())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!err.is_terminal_auth());
    assert!(h.stored_pair().await.is_some());
    assert_eq!(h.observer.count(), 0);
}

#[tokio::test]
async fn skip_refresh_passes_forbidden_through() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", bearer(ACCESS).as_str()))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Token revoked" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_no_refresh(&server, STUDENT_REFRESH).await;

    let err = h
        .client
        .post::<_, Value>("/auth/logout", &json!({}), RequestOptions::new().skip_refresh())
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Upstream { status: 403, message: "Token revoked".to_string() });
    assert_eq!(h.stored_pair().await, Some(CredentialPair::new(ACCESS, REFRESH)));
    assert_eq!(h.observer.count(), 0);
}

#[tokio::test]
async fn server_errors_propagate_without_retry() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Student);

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "database down" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_no_refresh(&server, STUDENT_REFRESH).await;

    let err = h.client.get::<Value>("/courses", RequestOptions::new()).await.unwrap_err();

    assert_eq!(err, ApiError::Upstream { status: 500, message: "database down".to_string() });
    assert!(h.stored_pair().await.is_some());
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    support::init_test_tracing();

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = ApiClientConfig { timeout: Duration::from_millis(200), ..support::client_config(&server, Role::Student) };
    let client = ApiClient::builder().config(config).build().expect("client builds");

    let err = client.get::<Value>("/courses", RequestOptions::new()).await.unwrap_err();
    assert_eq!(err, ApiError::Timeout(Duration::from_millis(200)));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let config = ApiClientConfig { base_url: "http://127.0.0.1:1/api".to_string(), ..ApiClientConfig::default() };
    let client = ApiClient::builder().config(config).build().expect("client builds");

    let err = client.get::<Value>("/courses", RequestOptions::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
}

// ============================================================================
// Admin refresh transport
// ============================================================================

#[tokio::test]
async fn admin_refresh_sends_bearer_and_accepts_rotation() {
    let server = MockServer::start().await;
    let h = logged_in(&server, Role::Admin);

    mount_expiring_resource(&server, "/api/admin/auth/dashboard", json!({ "totalStudents": 3 })).await;
    Mock::given(method("POST"))
        .and(path(ADMIN_REFRESH))
        .and(header("authorization", bearer(REFRESH).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": FRESH_ACCESS, "refreshToken": "refresh-2" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_no_refresh(&server, STUDENT_REFRESH).await;

    let body: Value = h.client.get("/admin/auth/dashboard", RequestOptions::new()).await.expect("recovered");

    assert_eq!(body["totalStudents"], 3);
    assert_eq!(h.stored_pair().await, Some(CredentialPair::new(FRESH_ACCESS, "refresh-2")));
    assert_eq!(h.observer.count(), 0);
}
