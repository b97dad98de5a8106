//! Session-expired signal
//!
//! When the client gives up on a session (refresh failed, account blocked,
//! or a freshly refreshed token was rejected again) it clears the stored
//! credentials and tells a [`SessionObserver`] exactly once. The UI layer
//! reacts by navigating to [`SessionExpired::redirect_to`].

use lalingua_domain::{impl_status_conversions, Role};
use serde::{Deserialize, Serialize};

/// Why a session was terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    /// The refresh call failed or no refresh token was stored
    RefreshFailed,
    /// The backend answered 403 (blocked account or revoked permission)
    Forbidden,
    /// The request was still unauthorized after a successful refresh
    RepeatedUnauthorized,
}

impl_status_conversions!(ExpiryReason {
    RefreshFailed => "refresh_failed",
    Forbidden => "forbidden",
    RepeatedUnauthorized => "repeated_unauthorized",
});

/// Event delivered to the observer when a session ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionExpired {
    pub role: Role,
    pub reason: ExpiryReason,
    /// Login route for the role
    pub redirect_to: String,
}

impl SessionExpired {
    #[must_use]
    pub fn new(role: Role, reason: ExpiryReason) -> Self {
        Self { role, reason, redirect_to: role.login_route().to_string() }
    }
}

/// Receiver of the session-expired signal
///
/// Closures implement this directly:
///
/// ```
/// use lalingua_common::auth::{SessionExpired, SessionObserver};
///
/// let observer = |event: &SessionExpired| {
///     tracing::info!(to = %event.redirect_to, "redirecting");
/// };
/// # fn takes(_: impl SessionObserver) {}
/// takes(observer);
/// ```
pub trait SessionObserver: Send + Sync {
    fn on_session_expired(&self, event: &SessionExpired);
}

impl<F> SessionObserver for F
where
    F: Fn(&SessionExpired) + Send + Sync,
{
    fn on_session_expired(&self, event: &SessionExpired) {
        self(event);
    }
}

/// Observer that ignores the signal
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_session_expired(&self, _event: &SessionExpired) {}
}
