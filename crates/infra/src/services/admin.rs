//! Administrator session, profile and user management

use std::sync::Arc;

use lalingua_common::auth::CredentialPair;
use lalingua_domain::constants::{
    ADMIN_BLOCK_USER_PATH, ADMIN_DASHBOARD_PATH, ADMIN_PROFILE_PATH, ADMIN_USERS_PATH,
};
use lalingua_domain::{
    Admin, AdminLoginResponse, AdminProfileUpdate, BlockOutcome, DashboardStats, LoginCredentials,
    ManagedUser, Page, Role,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{require_role, segment};
use crate::api::{ApiClient, ApiError, RequestOptions};

#[derive(Debug, Default, Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    data: UsersData,
}

#[derive(Debug, Default, Deserialize)]
struct UsersData {
    #[serde(default)]
    users: Vec<ManagedUser>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    #[serde(default)]
    total_items: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockRequest {
    is_blocked: bool,
}

pub struct AdminService {
    client: Arc<ApiClient>,
}

impl AdminService {
    /// # Errors
    ///
    /// [`ApiError::Config`] unless `client` is an admin client
    pub fn new(client: Arc<ApiClient>) -> Result<Self, ApiError> {
        require_role(&client, Role::Admin, "AdminService")?;
        Ok(Self { client })
    }

    /// Log in and store the issued token pair.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Upstream`] when the backend rejects the credentials
    /// - [`ApiError::Decode`] when the response carries no token pair
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AdminLoginResponse, ApiError> {
        let response: AdminLoginResponse = self
            .client
            .post(Role::Admin.login_path(), credentials, RequestOptions::new().public().skip_refresh())
            .await?;

        let (Some(access), Some(refresh)) = (&response.token, &response.refresh_token) else {
            return Err(ApiError::Decode("admin login response is missing the token pair".to_string()));
        };
        self.client.set_credentials(&CredentialPair::new(access.clone(), refresh.clone())).await?;
        info!(admin_id = ?response.admin.id, "Admin logged in");
        Ok(response)
    }

    /// Tell the backend, then always drop local credentials.
    ///
    /// # Errors
    ///
    /// [`ApiError::Storage`] if the local credentials cannot be cleared
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<bool, ApiError> {
        let server: Result<Value, ApiError> = self
            .client
            .post(Role::Admin.logout_path(), &json!({}), RequestOptions::new().skip_refresh())
            .await;
        if let Err(e) = server {
            warn!(error = %e, "Admin logout call failed; clearing local session anyway");
        }
        let removed = self.client.clear_credentials().await?;
        info!("Admin logged out");
        Ok(removed)
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Admin, ApiError> {
        self.client.get(ADMIN_PROFILE_PATH, RequestOptions::new()).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &AdminProfileUpdate) -> Result<Admin, ApiError> {
        self.client.put(ADMIN_PROFILE_PATH, update, RequestOptions::new()).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.client.get(ADMIN_DASHBOARD_PATH, RequestOptions::new()).await
    }

    /// Registered users, optionally filtered by name or email.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Page<ManagedUser>, ApiError> {
        let options = RequestOptions::new()
            .query("page", page)
            .query("limit", limit)
            .query("search", search.unwrap_or_default());
        let envelope: Option<UsersEnvelope> = self.client.get(ADMIN_USERS_PATH, options).await?;
        let data = envelope.unwrap_or_default().data;
        Ok(Page::new(data.users, data.pagination.total_items))
    }

    /// Block or unblock a user.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn set_blocked(&self, user_id: &str, blocked: bool) -> Result<BlockOutcome, ApiError> {
        let path = format!("{ADMIN_BLOCK_USER_PATH}/{}", segment(user_id));
        self.client.patch(&path, &BlockRequest { is_blocked: blocked }, RequestOptions::new()).await
    }
}
