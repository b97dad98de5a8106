//! Session roles
//!
//! Students and administrators authenticate against different endpoints and
//! keep separate credential pairs. Everything that differs per role hangs off
//! [`Role`] so callers never assemble those strings by hand.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ADMIN_ACCESS_TOKEN_KEY, ADMIN_LOGIN_PATH, ADMIN_LOGIN_ROUTE, ADMIN_LOGOUT_PATH,
    ADMIN_REFRESH_PATH, ADMIN_REFRESH_TOKEN_KEY, STUDENT_ACCESS_TOKEN_KEY, STUDENT_LOGIN_PATH,
    STUDENT_LOGIN_ROUTE, STUDENT_LOGOUT_PATH, STUDENT_REFRESH_PATH, STUDENT_REFRESH_TOKEN_KEY,
};
use crate::impl_status_conversions;

/// Authenticated role of a client session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl_status_conversions!(Role {
    Student => "student",
    Admin => "admin",
});

impl Role {
    /// Backend endpoint that exchanges credentials for a token pair.
    #[must_use]
    pub const fn login_path(self) -> &'static str {
        match self {
            Self::Student => STUDENT_LOGIN_PATH,
            Self::Admin => ADMIN_LOGIN_PATH,
        }
    }

    #[must_use]
    pub const fn logout_path(self) -> &'static str {
        match self {
            Self::Student => STUDENT_LOGOUT_PATH,
            Self::Admin => ADMIN_LOGOUT_PATH,
        }
    }

    /// Backend endpoint that trades a refresh token for a new access token.
    #[must_use]
    pub const fn refresh_path(self) -> &'static str {
        match self {
            Self::Student => STUDENT_REFRESH_PATH,
            Self::Admin => ADMIN_REFRESH_PATH,
        }
    }

    /// Front-end route the UI navigates to when the session ends.
    #[must_use]
    pub const fn login_route(self) -> &'static str {
        match self {
            Self::Student => STUDENT_LOGIN_ROUTE,
            Self::Admin => ADMIN_LOGIN_ROUTE,
        }
    }

    #[must_use]
    pub const fn access_token_key(self) -> &'static str {
        match self {
            Self::Student => STUDENT_ACCESS_TOKEN_KEY,
            Self::Admin => ADMIN_ACCESS_TOKEN_KEY,
        }
    }

    #[must_use]
    pub const fn refresh_token_key(self) -> &'static str {
        match self {
            Self::Student => STUDENT_REFRESH_TOKEN_KEY,
            Self::Admin => ADMIN_REFRESH_TOKEN_KEY,
        }
    }
}
