//! # LaLingua Infrastructure
//!
//! Everything that talks to the outside world.
//!
//! This crate contains:
//! - HTTP transport ([`http`])
//! - The authenticated backend client with token refresh ([`api`])
//! - Configuration loading from the environment and files ([`config`])
//! - Typed feature services for courses, enrollment, leave and accounts
//!   ([`services`])
//!
//! ## Architecture
//! - Depends on `lalingua-domain` for wire types and `lalingua-common` for
//!   credential storage and the session observer
//! - Contains all "impure" code (network, environment, files)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod services;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder, ApiClientConfig, ApiError, PreparedRequest, RequestOptions};
pub use errors::InfraError;
pub use http::HttpClient;
pub use services::{
    AdminService, CourseAdminService, CourseCatalogService, EnrollmentService, LeaveService,
    StudentAccountService,
};
