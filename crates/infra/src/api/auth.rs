//! Refresh-token exchange wire format
//!
//! Students and admins refresh differently: the student endpoint expects the
//! refresh token in the JSON body, the admin endpoint expects it as a bearer
//! header. Both answer with a new access token and, optionally, a rotated
//! refresh token.

use std::fmt;

use lalingua_domain::Role;
use serde::{Deserialize, Serialize};

/// How the refresh token is presented to the refresh endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTransport {
    /// `{"refreshToken": "..."}` as the JSON body
    Body,
    /// `Authorization: Bearer <refresh token>` with an empty JSON body
    BearerHeader,
}

impl RefreshTransport {
    /// Transport the backend expects for `role`.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Student => Self::Body,
            Role::Admin => Self::BearerHeader,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequestBody<'a> {
    pub refresh_token: &'a str,
}

/// Successful refresh response
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    /// Present when the backend rotates refresh tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshResponse")
            .field("access_token", &"[REDACTED]")
            .field("rotated", &self.refresh_token.is_some())
            .finish()
    }
}
