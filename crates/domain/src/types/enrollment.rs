//! Enrollment, order and payment wire types
//!
//! The payment gateway itself lives outside this workspace. These types only
//! describe what is handed to it ([`CheckoutSession`]) and what comes back
//! ([`GatewayPayment`]) so the enrollment call can be made.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MINOR_UNITS_PER_MAJOR;

/// Converts a major-unit price into the gateway's minor units.
///
/// Rounds to the nearest minor unit; negative or non-finite prices become 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_minor_units(amount: f64) -> u64 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    (amount * MINOR_UNITS_PER_MAJOR).round() as u64
}

/// Body of the create-order call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub course_id: String,
    /// Amount in minor units
    pub amount: u64,
}

/// Gateway order created by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub order_id: String,
    /// Amount in minor units
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub currency: String,
}

/// Result reported by the payment widget after a successful charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
}

/// Proof of payment attached to an enrollment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "paymentMethod")]
pub enum PaymentDetails {
    #[serde(rename = "razorpay")]
    Gateway(GatewayPayment),
    #[serde(rename = "wallet", rename_all = "camelCase")]
    Wallet { wallet_transaction_id: String },
}

impl From<GatewayPayment> for PaymentDetails {
    fn from(payment: GatewayPayment) -> Self {
        Self::Gateway(payment)
    }
}

/// Enrollment record of the signed-in student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Either a bare id or the populated course document
    pub course_id: serde_json::Value,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub enrolled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub wallet_transaction_id: Option<String>,
}

impl Enrollment {
    /// Id of the enrolled course whether or not the backend populated it.
    #[must_use]
    pub fn course_ref(&self) -> Option<&str> {
        match &self.course_id {
            serde_json::Value::String(id) => Some(id),
            serde_json::Value::Object(doc) => doc.get("_id").and_then(serde_json::Value::as_str),
            _ => None,
        }
    }
}

/// Response of the enroll call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_enrolled: Option<bool>,
}

/// Response of the enrollment probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub is_enrolled: bool,
}

/// Body of the enrollment probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentCheck {
    pub check_only: bool,
    pub course_id: String,
}

/// Enrollments of the signed-in student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentList {
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub balance: f64,
}

/// Customer details pre-filled into the payment widget
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPrefill {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
}

/// Everything the payment widget needs to open a checkout for one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub key: String,
    /// Amount in minor units
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: CheckoutPrefill,
}
