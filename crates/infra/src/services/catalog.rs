//! Public course catalog

use std::sync::Arc;

use lalingua_domain::constants::COURSES_PATH;
use lalingua_domain::{Course, CourseList, CourseQuery};
use serde::Deserialize;
use tracing::instrument;

use super::segment;
use crate::api::{ApiClient, ApiError, RequestOptions};

/// The detail endpoint has answered both with a bare course and with a
/// `{ course }` wrapper.
#[derive(Deserialize)]
#[serde(untagged)]
enum CoursePayload {
    Wrapped { course: Course },
    Bare(Course),
}

/// Browses the catalog without credentials.
///
/// Works with a client of either role; requests are sent as public so no
/// token is attached and a 401 never ends the session.
pub struct CourseCatalogService {
    client: Arc<ApiClient>,
}

impl CourseCatalogService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// One page of published courses.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn list_courses(&self, query: &CourseQuery) -> Result<CourseList, ApiError> {
        let options = RequestOptions::new().query_pairs(query.to_pairs()).public();
        self.client.get(COURSES_PATH, options).await
    }

    /// # Errors
    ///
    /// [`ApiError::Upstream`] with status 404 for unknown ids
    #[instrument(skip(self))]
    pub async fn get_course(&self, course_id: &str) -> Result<Course, ApiError> {
        let path = format!("{COURSES_PATH}/{}", segment(course_id));
        let payload: CoursePayload = self.client.get(&path, RequestOptions::new().public()).await?;
        Ok(match payload {
            CoursePayload::Wrapped { course } | CoursePayload::Bare(course) => course,
        })
    }
}
