//! Wire types exchanged with the LaLingua backend
//!
//! Field names follow the backend's JSON (camelCase, Mongo-style `_id`).

pub mod admin;
pub mod course;
pub mod enrollment;
pub mod leave;
pub mod role;
pub mod user;

use serde::{Deserialize, Serialize};

pub use admin::{Admin, AdminLoginResponse, AdminProfileUpdate, BlockOutcome, DashboardStats, ManagedUser};
pub use course::{Course, CourseEnvelope, CourseList, CourseQuery, CourseUpdate, MessageResponse, NewCourse};
pub use enrollment::{
    to_minor_units, CheckoutPrefill, CheckoutSession, Enrollment, EnrollmentCheck, EnrollmentList,
    EnrollmentOutcome, EnrollmentStatus, GatewayPayment, OrderRequest, OrderResponse, PaymentDetails,
    WalletBalance,
};
pub use leave::{
    Leave, LeaveApplicant, LeaveDecision, LeaveInput, LeaveList, LeaveStatus, LeaveStatusUpdate,
};
pub use role::Role;
pub use user::{LoginCredentials, StudentLoginResponse, StudentProfile};

/// A page of items plus the total across all pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { items: Vec::new(), total: 0 }
    }
}

impl From<LeaveList> for Page<Leave> {
    fn from(list: LeaveList) -> Self {
        Self::new(list.leaves, list.total)
    }
}
