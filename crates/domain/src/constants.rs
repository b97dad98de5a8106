//! Application constants
//!
//! Endpoint paths for the backend wire contract, front-end routes used for
//! the login redirect, and the canonical credential storage keys.

// Client defaults
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MERCHANT_NAME: &str = "LaLingua";
pub const DEFAULT_CURRENCY: &str = "INR";
/// Payment amounts are sent to the gateway in minor units (paise).
pub const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

// Student authentication
pub const STUDENT_LOGIN_PATH: &str = "/auth/login";
pub const STUDENT_LOGOUT_PATH: &str = "/auth/logout";
pub const STUDENT_REFRESH_PATH: &str = "/auth/refresh-token";
pub const STUDENT_LOGIN_ROUTE: &str = "/login";

// Admin authentication and management
pub const ADMIN_LOGIN_PATH: &str = "/admin/auth/login";
pub const ADMIN_LOGOUT_PATH: &str = "/admin/auth/logout";
pub const ADMIN_REFRESH_PATH: &str = "/admin/auth/refresh-token";
pub const ADMIN_LOGIN_ROUTE: &str = "/admin/login";
pub const ADMIN_PROFILE_PATH: &str = "/admin/auth/profile";
pub const ADMIN_DASHBOARD_PATH: &str = "/admin/auth/dashboard";
pub const ADMIN_USERS_PATH: &str = "/admin/auth/getUsers";
pub const ADMIN_BLOCK_USER_PATH: &str = "/admin/auth/block-unblock";

// Catalog, enrollment and payment
pub const COURSES_PATH: &str = "/auth/courses";
pub const MY_ENROLLMENTS_PATH: &str = "/auth/courses/me/enrollments";
pub const CREATE_ORDER_PATH: &str = "/auth/create-order";
pub const WALLET_PATH: &str = "/auth/wallet";

// Course administration
pub const COURSE_ADMIN_PATH: &str = "/course";

// Leave workflow
pub const LEAVE_APPLY_PATH: &str = "/leave/apply";
pub const LEAVE_MY_LEAVES_PATH: &str = "/leave/my-leaves";
pub const LEAVE_PENDING_PATH: &str = "/leave/pending";
pub const LEAVE_UPDATE_STATUS_PATH: &str = "/leave/update-status";
pub const LEAVE_CALENDAR_PATH: &str = "/leave/calendar";
/// Longest leave span expanded into calendar days.
pub const MAX_LEAVE_SPAN_DAYS: i64 = 366;

// Credential storage keys, one per role and token kind
pub const STUDENT_ACCESS_TOKEN_KEY: &str = "student.access_token";
pub const STUDENT_REFRESH_TOKEN_KEY: &str = "student.refresh_token";
pub const ADMIN_ACCESS_TOKEN_KEY: &str = "admin.access_token";
pub const ADMIN_REFRESH_TOKEN_KEY: &str = "admin.refresh_token";
pub const KEYCHAIN_SERVICE_NAME: &str = "LaLingua.session";
