//! Request descriptions
//!
//! A [`PreparedRequest`] is everything needed to send a call again: the
//! client rebuilds the reqwest builder from it on replay, attaching whatever
//! access token is current at that moment.

use reqwest::Method;
use serde_json::Value;

/// Per-request behaviour switches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Query-string pairs, appended in order
    pub query: Vec<(String, String)>,
    /// Send without an `Authorization` header; a 401 is returned as-is
    pub public: bool,
    /// Attach the token but leave 401 and 403 to the caller: no refresh and
    /// no session termination. Used by the login and logout endpoints.
    pub skip_refresh: bool,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    #[must_use]
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    #[must_use]
    pub fn skip_refresh(mut self) -> Self {
        self.skip_refresh = true;
        self
    }

    /// Whether a 401 or 403 on this request is handled by the session
    /// machinery (refresh-and-replay, or termination).
    pub(crate) fn handles_session_errors(&self) -> bool {
        !self.public && !self.skip_refresh
    }
}

/// A request that can be sent more than once
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    /// Path relative to the client's base URL, e.g. `/auth/courses`
    pub path: String,
    pub body: Option<Value>,
    pub options: RequestOptions,
}

impl PreparedRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, options: RequestOptions::default() }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_plain_requests_handle_session_errors() {
        assert!(RequestOptions::new().handles_session_errors());
        assert!(!RequestOptions::new().public().handles_session_errors());
        assert!(!RequestOptions::new().skip_refresh().handles_session_errors());
    }

    #[test]
    fn query_keeps_insertion_order() {
        let options = RequestOptions::new().query("page", 2).query("limit", 10);
        assert_eq!(
            options.query,
            vec![("page".to_string(), "2".to_string()), ("limit".to_string(), "10".to_string())]
        );
    }
}
