//! Feature services
//!
//! Thin typed wrappers over the backend contract. Each service owns an
//! `Arc<ApiClient>` and leaves authentication, refresh and logout to it.

pub mod account;
pub mod admin;
pub mod catalog;
pub mod course_admin;
pub mod enrollment;
pub mod leave;

use lalingua_domain::Role;

pub use account::StudentAccountService;
pub use admin::AdminService;
pub use catalog::CourseCatalogService;
pub use course_admin::CourseAdminService;
pub use enrollment::EnrollmentService;
pub use leave::LeaveService;

use crate::api::{ApiClient, ApiError};

/// Percent-encodes an id for use as a single path segment.
pub(crate) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Fails unless `client` holds credentials for `expected`.
pub(crate) fn require_role(client: &ApiClient, expected: Role, service: &str) -> Result<(), ApiError> {
    if client.role() == expected {
        Ok(())
    } else {
        Err(ApiError::Config(format!(
            "{service} requires the {expected} role, got {}",
            client.role()
        )))
    }
}
