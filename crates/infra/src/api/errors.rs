//! API-specific error types
//!
//! Every failure the authenticated client can surface. The type is `Clone`
//! because a single refresh outcome is handed to every request that was
//! waiting on it.

use std::time::Duration;

use lalingua_common::CredentialStoreError;
use lalingua_domain::LaLinguaError;
use thiserror::Error;

/// Broad classes of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// The session is gone; the caller has already been logged out
    TerminalAuth,
    /// The backend answered with a non-success status
    Upstream,
    /// Connection failure or timeout
    Network,
    /// The response body could not be interpreted
    Decode,
    /// Misconfiguration or caller mistakes detected before sending
    Client,
}

/// API operation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Credentials could not be refreshed, or were rejected again after a
    /// refresh. Stored credentials have been cleared.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// The backend refused access (403). Stored credentials have been cleared.
    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Request failed ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    /// An operation that needs a logged-in user was called without one
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The backend accepted the call but reported `success: false`
    #[error("Rejected by server: {0}")]
    Rejected(String),

    /// The refresh this request was waiting on was abandoned
    #[error("Operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::SessionExpired(_) | Self::Forbidden(_) => ApiErrorCategory::TerminalAuth,
            Self::Upstream { .. } | Self::Rejected(_) => ApiErrorCategory::Upstream,
            Self::Network(_) | Self::Timeout(_) | Self::Cancelled => ApiErrorCategory::Network,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::Config(_) | Self::Storage(_) | Self::NotAuthenticated => ApiErrorCategory::Client,
        }
    }

    /// Whether the session was ended as part of this failure
    pub fn is_terminal_auth(&self) -> bool {
        self.category() == ApiErrorCategory::TerminalAuth
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::Forbidden(_) => Some(403),
            _ => None,
        }
    }

    /// Build an upstream error from a raw response body.
    ///
    /// Uses the JSON `message` or `error` field when present, else the body
    /// text, else the status reason.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        Self::Upstream { status, message: extract_message(status, body) }
    }
}

pub(crate) fn extract_message(status: u16, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|value| {
        ["message", "error"]
            .iter()
            .find_map(|field| value.get(field).and_then(serde_json::Value::as_str).map(str::to_owned))
    });

    match from_json {
        Some(message) if !message.is_empty() => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

impl From<LaLinguaError> for ApiError {
    fn from(err: LaLinguaError) -> Self {
        match err {
            LaLinguaError::Network(message) => Self::Network(message),
            LaLinguaError::Config(message) | LaLinguaError::InvalidInput(message) => {
                Self::Config(message)
            }
            LaLinguaError::Auth(message) => Self::Upstream { status: 401, message },
            LaLinguaError::NotFound(message) => Self::Upstream { status: 404, message },
            // Timeouts carry the configured duration; see ApiClient::map_transport_error.
            LaLinguaError::Timeout(message) | LaLinguaError::Internal(message) => {
                Self::Network(message)
            }
        }
    }
}

impl From<CredentialStoreError> for ApiError {
    fn from(err: CredentialStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ApiError::SessionExpired("refresh failed".into()).category(),
            ApiErrorCategory::TerminalAuth
        );
        assert_eq!(ApiError::Forbidden("blocked".into()).category(), ApiErrorCategory::TerminalAuth);
        assert_eq!(
            ApiError::Upstream { status: 500, message: "boom".into() }.category(),
            ApiErrorCategory::Upstream
        );
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(10)).category(),
            ApiErrorCategory::Network
        );
        assert_eq!(ApiError::NotAuthenticated.category(), ApiErrorCategory::Client);
    }

    #[test]
    fn test_terminal_auth() {
        assert!(ApiError::SessionExpired(String::new()).is_terminal_auth());
        assert!(ApiError::Forbidden(String::new()).is_terminal_auth());
        assert!(!ApiError::Upstream { status: 401, message: String::new() }.is_terminal_auth());
        assert!(!ApiError::Network(String::new()).is_terminal_auth());
    }

    #[test]
    fn test_status() {
        assert_eq!(ApiError::Forbidden(String::new()).status(), Some(403));
        assert_eq!(ApiError::Upstream { status: 422, message: String::new() }.status(), Some(422));
        assert_eq!(ApiError::Cancelled.status(), None);
    }

    #[test]
    fn test_message_prefers_json_message_then_error() {
        assert_eq!(extract_message(400, r#"{"message":"Course not found"}"#), "Course not found");
        assert_eq!(extract_message(400, r#"{"error":"Invalid dates"}"#), "Invalid dates");
        assert_eq!(extract_message(502, "upstream down"), "upstream down");
        assert_eq!(extract_message(500, ""), "Internal Server Error");
    }

    #[test]
    fn test_upstream_display() {
        let err = ApiError::from_response_body(400, r#"{"message":"Bad dates"}"#);
        assert_eq!(err.to_string(), "Request failed (400): Bad dates");
    }
}
