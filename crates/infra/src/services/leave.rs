//! Leave requests
//!
//! Students and administrators share the leave endpoints; the client's role
//! decides whose token is sent. Reviewing (`pending_leaves`,
//! `update_status`) is admin-only server-side and is not checked here.

use std::sync::Arc;

use lalingua_domain::constants::{
    LEAVE_APPLY_PATH, LEAVE_CALENDAR_PATH, LEAVE_MY_LEAVES_PATH, LEAVE_PENDING_PATH,
    LEAVE_UPDATE_STATUS_PATH,
};
use lalingua_domain::{Leave, LeaveDecision, LeaveInput, LeaveList, LeaveStatusUpdate, Page};
use tracing::instrument;

use super::segment;
use crate::api::{ApiClient, ApiError, RequestOptions};

pub struct LeaveService {
    client: Arc<ApiClient>,
}

impl LeaveService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip_all, fields(start = %input.start_date, end = %input.end_date))]
    pub async fn apply(&self, input: &LeaveInput) -> Result<Leave, ApiError> {
        self.client.post(LEAVE_APPLY_PATH, input, RequestOptions::new()).await
    }

    /// Leaves filed by the logged-in user.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn my_leaves(&self, page: u32, limit: u32) -> Result<Page<Leave>, ApiError> {
        self.page(LEAVE_MY_LEAVES_PATH, page, limit).await
    }

    /// Leaves awaiting review.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn pending_leaves(&self, page: u32, limit: u32) -> Result<Page<Leave>, ApiError> {
        self.page(LEAVE_PENDING_PATH, page, limit).await
    }

    /// Approve or reject a leave.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn update_status(&self, leave_id: &str, decision: &LeaveDecision) -> Result<Leave, ApiError> {
        let path = format!("{LEAVE_UPDATE_STATUS_PATH}/{}", segment(leave_id));
        self.client.patch(&path, &LeaveStatusUpdate::from(decision), RequestOptions::new()).await
    }

    /// Every leave shown on the team calendar.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn calendar_leaves(&self) -> Result<Vec<Leave>, ApiError> {
        self.client.get(LEAVE_CALENDAR_PATH, RequestOptions::new()).await
    }

    async fn page(&self, path: &str, page: u32, limit: u32) -> Result<Page<Leave>, ApiError> {
        let options = RequestOptions::new().query("page", page).query("limit", limit);
        let list: LeaveList = self.client.get(path, options).await?;
        Ok(list.into())
    }
}
