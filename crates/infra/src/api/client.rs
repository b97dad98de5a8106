//! Authenticated API client
//!
//! Every backend call goes through [`ApiClient`]. It attaches the current
//! access token, and on a 401 it refreshes the token once (coalescing
//! concurrent refreshes) and replays the request. When the session cannot be
//! recovered it clears the stored credentials and notifies the
//! [`SessionObserver`] exactly once.
//!
//! | Condition                                   | Outcome                                  |
//! |---------------------------------------------|------------------------------------------|
//! | 401, no refresh running                     | refresh, replay once                     |
//! | 401, refresh running                        | wait for it, replay once                 |
//! | 401 on the replay                           | [`ApiError::SessionExpired`], logged out |
//! | refresh fails                               | [`ApiError::SessionExpired`] for all     |
//! | 403                                         | [`ApiError::Forbidden`], logged out      |
//! | anything else                               | propagated, no retry                     |
//!
//! Requests marked [`RequestOptions::skip_refresh`] (login, logout) bypass
//! all of the above and get every status back unchanged.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lalingua_common::auth::{
    CredentialPair, CredentialStore, ExpiryReason, MemoryCredentialStore, NoopObserver,
    SessionExpired, SessionObserver,
};
use lalingua_domain::constants::DEFAULT_API_BASE_URL;
use lalingua_domain::{ApiConfig, LaLinguaError, Role};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::auth::{RefreshRequestBody, RefreshResponse, RefreshTransport};
use super::errors::{extract_message, ApiError};
use super::refresh::{RefreshCoordinator, RefreshTurn};
use super::request::{PreparedRequest, RequestOptions};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Configuration for API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Base URL every path is appended to (e.g. "http://localhost:3000/api")
    pub base_url: String,
    /// Timeout for each HTTP exchange
    pub timeout: Duration,
    /// Whose credentials this client uses
    pub role: Role,
    /// Overrides the role's default refresh transport
    pub refresh_transport: Option<RefreshTransport>,
    pub user_agent: Option<String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            role: Role::Student,
            refresh_transport: None,
            user_agent: None,
        }
    }
}

impl ApiClientConfig {
    /// Client settings for `role` from loaded configuration.
    #[must_use]
    pub fn from_api_config(api: &ApiConfig, role: Role) -> Self {
        Self {
            base_url: api.base_url.clone(),
            timeout: api.timeout(),
            role,
            refresh_transport: None,
            user_agent: api.user_agent.clone(),
        }
    }

    /// Refresh transport in effect for this client.
    #[must_use]
    pub fn refresh_transport(&self) -> RefreshTransport {
        self.refresh_transport.unwrap_or_else(|| RefreshTransport::for_role(self.role))
    }
}

/// HTTP client bound to one role's session
pub struct ApiClient {
    http: HttpClient,
    config: ApiClientConfig,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    observer: Arc<dyn SessionObserver>,
    refresh: RefreshCoordinator,
    /// Set once the session-expired signal has fired for the current session
    session_expired: AtomicBool,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the base URL is not absolute or the
    /// HTTP client cannot be built
    pub fn new(
        config: ApiClientConfig,
        store: Arc<dyn CredentialStore>,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("Invalid base URL {}: {}", config.base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::Config(format!("Base URL {} cannot carry paths", config.base_url)));
        }

        let mut http = HttpClient::builder().timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            http = http.user_agent(agent.clone());
        }
        let http = http
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        debug!(base_url = %base_url, role = %config.role, "API client created");

        Ok(Self {
            http,
            config,
            base_url,
            store,
            observer,
            refresh: RefreshCoordinator::new(),
            session_expired: AtomicBool::new(false),
        })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Whether a refresh is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    /// Whether an access token is stored for this client's role
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the credential store fails
    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.store.access_token(self.config.role).await?.is_some())
    }

    /// Store a freshly issued pair and re-arm the session-expired signal
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the pair cannot be persisted
    pub async fn set_credentials(&self, pair: &CredentialPair) -> Result<(), ApiError> {
        self.store.save(self.config.role, pair).await?;
        self.refresh.invalidate();
        self.session_expired.store(false, Ordering::SeqCst);
        info!(role = %self.config.role, "Credentials stored");
        Ok(())
    }

    /// Remove the stored pair without firing the session-expired signal
    ///
    /// # Returns
    ///
    /// `true` if credentials were stored
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the store cannot be cleared
    pub async fn clear_credentials(&self) -> Result<bool, ApiError> {
        self.session_expired.store(true, Ordering::SeqCst);
        self.refresh.invalidate();
        let removed = self.store.clear(self.config.role).await?;
        info!(role = %self.config.role, removed, "Credentials cleared");
        Ok(removed)
    }

    /// Send a request and return the raw response.
    ///
    /// Handles 401 recovery and terminal 401/403. Other statuses are returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`ApiError::SessionExpired`] when the session could not be recovered
    /// - [`ApiError::Forbidden`] on 403
    /// - [`ApiError::Network`] / [`ApiError::Timeout`] on transport failure
    #[instrument(skip_all, fields(method = %request.method, path = %request.path, role = %self.config.role))]
    pub async fn execute(&self, request: &PreparedRequest) -> Result<Response, ApiError> {
        let sent_epoch = self.refresh.epoch();
        let token = if request.options.public {
            None
        } else {
            self.store.access_token(self.config.role).await?
        };

        let response = self.send_once(request, token.as_deref()).await?;
        match response.status() {
            StatusCode::UNAUTHORIZED if request.options.handles_session_errors() => {
                debug!("Access token rejected; recovering");
                let token = self.recover(sent_epoch).await?;
                let replay = self.send_once(request, Some(&token)).await?;
                match replay.status() {
                    StatusCode::UNAUTHORIZED => {
                        let detail = read_detail(replay).await;
                        Err(self.terminate(ExpiryReason::RepeatedUnauthorized, detail).await)
                    }
                    StatusCode::FORBIDDEN => {
                        let detail = read_detail(replay).await;
                        Err(self.terminate(ExpiryReason::Forbidden, detail).await)
                    }
                    _ => Ok(replay),
                }
            }
            StatusCode::FORBIDDEN if request.options.handles_session_errors() => {
                let detail = read_detail(response).await;
                Err(self.terminate(ExpiryReason::Forbidden, detail).await)
            }
            _ => Ok(response),
        }
    }

    /// Send a request and deserialize the JSON response.
    ///
    /// 204/205 and empty bodies deserialize from `null`.
    ///
    /// # Errors
    ///
    /// Everything [`ApiClient::execute`] returns, plus
    /// [`ApiError::Upstream`] for non-success statuses and
    /// [`ApiError::Decode`] for unparsable bodies
    pub async fn request<T: DeserializeOwned>(&self, request: PreparedRequest) -> Result<T, ApiError> {
        let response = self.execute(&request).await?;
        self.decode(response).await
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(PreparedRequest::new(Method::GET, path).with_options(options)).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send_with_body(Method::POST, path, body, options).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send_with_body(Method::PUT, path, body, options).await
    }

    /// Execute a PATCH request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send_with_body(Method::PATCH, path, body, options).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(PreparedRequest::new(Method::DELETE, path).with_options(options)).await
    }

    async fn send_with_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Config(format!("Failed to serialize body: {}", e)))?;
        self.request(PreparedRequest::new(method, path).with_body(body).with_options(options)).await
    }

    /// Obtain a token to replay with after a 401.
    async fn recover(&self, sent_epoch: u64) -> Result<String, ApiError> {
        match self.refresh.claim(sent_epoch) {
            RefreshTurn::Wait(rx) => rx.await.unwrap_or_else(|_| Err(ApiError::Cancelled)),
            RefreshTurn::Replay => self
                .store
                .access_token(self.config.role)
                .await?
                .ok_or_else(|| ApiError::SessionExpired("credentials were cleared".to_string())),
            RefreshTurn::Lead(lease) => {
                let outcome = match self.refresh_access_token().await {
                    Ok(token) => Ok(token),
                    Err(err) => {
                        let detail = match err {
                            ApiError::SessionExpired(detail) => detail,
                            other => format!("refresh failed: {other}"),
                        };
                        Err(self.terminate(ExpiryReason::RefreshFailed, detail).await)
                    }
                };
                let notified = lease.settle(&outcome);
                debug!(notified, succeeded = outcome.is_ok(), "Refresh settled");
                outcome
            }
        }
    }

    /// Exchange the stored refresh token for a new access token.
    #[instrument(skip(self), fields(role = %self.config.role))]
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let role = self.config.role;
        let pair = self
            .store
            .load(role)
            .await?
            .ok_or_else(|| ApiError::SessionExpired("no refresh token stored".to_string()))?;

        let builder = self.http.request(Method::POST, self.url(role.refresh_path()));
        let builder = match self.config.refresh_transport() {
            RefreshTransport::Body => {
                builder.json(&RefreshRequestBody { refresh_token: &pair.refresh_token })
            }
            RefreshTransport::BearerHeader => {
                builder.bearer_auth(&pair.refresh_token).json(&serde_json::json!({}))
            }
        };

        let response = self.http.send(builder).await.map_err(|e| self.map_transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_reqwest_error(e))?;
        if !status.is_success() {
            return Err(ApiError::from_response_body(status.as_u16(), &body));
        }

        let refreshed: RefreshResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("Invalid refresh response: {}", e)))?;
        let rotated = refreshed.refresh_token.is_some();
        match refreshed.refresh_token {
            Some(refresh_token) => {
                let pair = CredentialPair::new(refreshed.access_token.clone(), refresh_token);
                self.store.save(role, &pair).await?;
            }
            None => self.store.replace_access_token(role, &refreshed.access_token).await?,
        }

        info!(%role, rotated, "Access token refreshed");
        Ok(refreshed.access_token)
    }

    /// End the session: clear credentials, fire the signal once, and build
    /// the error returned to the caller.
    async fn terminate(&self, reason: ExpiryReason, detail: String) -> ApiError {
        let role = self.config.role;
        self.refresh.invalidate();
        if let Err(err) = self.store.clear(role).await {
            warn!(%role, error = %err, "Failed to clear credentials after session end");
        }

        if !self.session_expired.swap(true, Ordering::SeqCst) {
            let event = SessionExpired::new(role, reason);
            warn!(%role, %reason, redirect_to = %event.redirect_to, "Session terminated");
            self.observer.on_session_expired(&event);
        } else {
            debug!(%role, %reason, "Session already terminated");
        }

        match reason {
            ExpiryReason::Forbidden => ApiError::Forbidden(detail),
            ExpiryReason::RefreshFailed | ExpiryReason::RepeatedUnauthorized => {
                ApiError::SessionExpired(detail)
            }
        }
    }

    async fn send_once(
        &self,
        request: &PreparedRequest,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut builder = self.http.request(request.method.clone(), self.url(&request.path));
        if !request.options.query.is_empty() {
            builder = builder.query(&request.options.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        self.http.send(builder).await.map_err(|e| self.map_transport_error(e))
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_reqwest_error(e))?;

        if !status.is_success() {
            return Err(ApiError::from_response_body(status.as_u16(), &body));
        }

        // Handle 204/205 No Content responses
        if status == StatusCode::NO_CONTENT
            || status == StatusCode::RESET_CONTENT
            || body.trim().is_empty()
        {
            return serde_json::from_value(Value::Null).map_err(|_| {
                ApiError::Decode(format!(
                    "No content response ({}), but response type cannot be deserialized from empty body",
                    status.as_u16()
                ))
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("Failed to parse response: {}", e)))
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn map_transport_error(&self, err: LaLinguaError) -> ApiError {
        match err {
            LaLinguaError::Timeout(_) => ApiError::Timeout(self.http.timeout()),
            other => ApiError::from(other),
        }
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> ApiError {
        let infra: InfraError = err.into();
        self.map_transport_error(infra.into())
    }
}

async fn read_detail(response: Response) -> String {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    extract_message(status, &body)
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    store: Option<Arc<dyn CredentialStore>>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential store (defaults to an in-memory store)
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the session-expired observer (defaults to ignoring the signal)
    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if client creation fails
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let observer = self.observer.unwrap_or_else(|| Arc::new(NoopObserver));

        ApiClient::new(config, store, observer)
    }
}
