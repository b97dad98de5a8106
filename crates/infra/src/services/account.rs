//! Student login and logout

use std::sync::Arc;

use lalingua_common::auth::CredentialPair;
use lalingua_domain::{LoginCredentials, Role, StudentLoginResponse};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::require_role;
use crate::api::{ApiClient, ApiError, RequestOptions};

pub struct StudentAccountService {
    client: Arc<ApiClient>,
}

impl StudentAccountService {
    /// # Errors
    ///
    /// [`ApiError::Config`] unless `client` is a student client
    pub fn new(client: Arc<ApiClient>) -> Result<Self, ApiError> {
        require_role(&client, Role::Student, "StudentAccountService")?;
        Ok(Self { client })
    }

    /// Log in and store the issued token pair.
    ///
    /// Wrong credentials come back as [`ApiError::Upstream`] with status 401;
    /// they never trigger a refresh.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Upstream`] when the backend rejects the credentials
    /// - [`ApiError::Decode`] when the response carries no token pair
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<StudentLoginResponse, ApiError> {
        let response: StudentLoginResponse = self
            .client
            .post(Role::Student.login_path(), credentials, RequestOptions::new().public().skip_refresh())
            .await?;

        let (Some(access), Some(refresh)) = (&response.access_token, &response.refresh_token) else {
            return Err(ApiError::Decode("login response is missing the token pair".to_string()));
        };
        self.client.set_credentials(&CredentialPair::new(access.clone(), refresh.clone())).await?;
        info!(user_id = ?response.user_id, "Student logged in");
        Ok(response)
    }

    /// Tell the backend, then always drop local credentials.
    ///
    /// # Returns
    ///
    /// `true` if credentials were stored
    ///
    /// # Errors
    ///
    /// [`ApiError::Storage`] if the local credentials cannot be cleared
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<bool, ApiError> {
        let server: Result<Value, ApiError> = self
            .client
            .post(Role::Student.logout_path(), &json!({}), RequestOptions::new().skip_refresh())
            .await;
        if let Err(e) = server {
            warn!(error = %e, "Logout call failed; clearing local session anyway");
        }
        let removed = self.client.clear_credentials().await?;
        info!("Student logged out");
        Ok(removed)
    }

    /// # Errors
    ///
    /// [`ApiError::Storage`] if the credential store fails
    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        self.client.is_authenticated().await
    }
}
