//! Course management for administrators

use std::sync::Arc;

use lalingua_domain::constants::COURSE_ADMIN_PATH;
use lalingua_domain::{CourseEnvelope, CourseList, CourseQuery, CourseUpdate, MessageResponse, NewCourse, Role};
use tracing::instrument;

use super::{require_role, segment};
use crate::api::{ApiClient, ApiError, RequestOptions};

pub struct CourseAdminService {
    client: Arc<ApiClient>,
}

impl CourseAdminService {
    /// # Errors
    ///
    /// [`ApiError::Config`] unless `client` is an admin client
    pub fn new(client: Arc<ApiClient>) -> Result<Self, ApiError> {
        require_role(&client, Role::Admin, "CourseAdminService")?;
        Ok(Self { client })
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip_all, fields(title = %course.course_title))]
    pub async fn add_course(&self, course: &NewCourse) -> Result<CourseEnvelope, ApiError> {
        self.client.post(&format!("{COURSE_ADMIN_PATH}/add"), course, RequestOptions::new()).await
    }

    /// Courses owned by `admin_id`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn list_courses(&self, admin_id: &str, query: &CourseQuery) -> Result<CourseList, ApiError> {
        let path = format!("{COURSE_ADMIN_PATH}/list/{}", segment(admin_id));
        self.client.get(&path, RequestOptions::new().query_pairs(query.to_pairs())).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn get_course(&self, course_id: &str) -> Result<CourseEnvelope, ApiError> {
        self.client.get(&course_path(course_id), RequestOptions::new()).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self, update))]
    pub async fn edit_course(&self, course_id: &str, update: &CourseUpdate) -> Result<CourseEnvelope, ApiError> {
        self.client.put(&course_path(course_id), update, RequestOptions::new()).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn delete_course(&self, course_id: &str) -> Result<MessageResponse, ApiError> {
        self.client.delete(&course_path(course_id), RequestOptions::new()).await
    }
}

fn course_path(course_id: &str) -> String {
    format!("{COURSE_ADMIN_PATH}/{}", segment(course_id))
}
