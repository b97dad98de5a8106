//! Orders, checkout and enrollment for students
//!
//! The payment widget runs outside this crate. [`EnrollmentService::begin_checkout`]
//! creates the order and returns the [`CheckoutSession`] to hand to it, and
//! [`EnrollmentService::complete_checkout`] records the enrollment once the
//! widget reports a [`GatewayPayment`].

use std::sync::Arc;

use lalingua_domain::constants::{COURSES_PATH, CREATE_ORDER_PATH, MY_ENROLLMENTS_PATH, WALLET_PATH};
use lalingua_domain::{
    to_minor_units, CheckoutPrefill, CheckoutSession, Course, Enrollment, EnrollmentCheck,
    EnrollmentList, EnrollmentOutcome, EnrollmentStatus, GatewayPayment, OrderRequest,
    OrderResponse, PaymentConfig, PaymentDetails, Role, WalletBalance,
};
use tracing::{info, instrument, warn};

use super::{require_role, segment};
use crate::api::{ApiClient, ApiError, RequestOptions};

pub struct EnrollmentService {
    client: Arc<ApiClient>,
    payment: PaymentConfig,
}

impl EnrollmentService {
    /// # Errors
    ///
    /// [`ApiError::Config`] unless `client` is a student client
    pub fn new(client: Arc<ApiClient>, payment: PaymentConfig) -> Result<Self, ApiError> {
        require_role(&client, Role::Student, "EnrollmentService")?;
        Ok(Self { client, payment })
    }

    /// Create a gateway order for `amount` (major units).
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotAuthenticated`] when no student is logged in
    /// - Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn create_order(&self, course_id: &str, amount: f64) -> Result<OrderResponse, ApiError> {
        if !self.client.is_authenticated().await? {
            return Err(ApiError::NotAuthenticated);
        }
        let body = OrderRequest { course_id: course_id.to_string(), amount: to_minor_units(amount) };
        self.client.post(CREATE_ORDER_PATH, &body, RequestOptions::new()).await
    }

    /// Create an order for `course` and build the widget hand-off.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Config`] when no payment key is configured
    /// - [`ApiError::Rejected`] when the backend declines the order
    /// - Anything [`EnrollmentService::create_order`] returns
    #[instrument(skip_all, fields(course_id = %course.id))]
    pub async fn begin_checkout(
        &self,
        course: &Course,
        prefill: CheckoutPrefill,
    ) -> Result<CheckoutSession, ApiError> {
        let key = self
            .payment
            .key_id
            .clone()
            .ok_or_else(|| ApiError::Config("payment key id is not configured".to_string()))?;

        let order = self.create_order(&course.id, course.regular_price).await?;
        if !order.success || order.order_id.is_empty() {
            return Err(ApiError::Rejected("Failed to create order".to_string()));
        }

        let currency =
            if order.currency.is_empty() { self.payment.currency.clone() } else { order.currency };
        info!(order_id = %order.order_id, amount = order.amount, "Checkout started");

        Ok(CheckoutSession {
            key,
            amount: order.amount,
            currency,
            name: self.payment.merchant_name.clone(),
            description: format!("Payment for {}", course.course_title),
            order_id: order.order_id,
            prefill,
        })
    }

    /// Enroll with the payment the widget reported.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] when the payment went through but the backend
    /// did not enroll the student
    #[instrument(skip(self, payment), fields(order_id = %payment.razorpay_order_id))]
    pub async fn complete_checkout(
        &self,
        course_id: &str,
        payment: GatewayPayment,
    ) -> Result<EnrollmentOutcome, ApiError> {
        let outcome = self.enroll(course_id, &PaymentDetails::from(payment)).await?;
        if outcome.success {
            info!("Enrollment recorded");
            Ok(outcome)
        } else {
            warn!(message = %outcome.message, "Payment accepted but enrollment failed");
            Err(ApiError::Rejected(if outcome.message.is_empty() {
                "Payment successful but enrollment failed".to_string()
            } else {
                outcome.message
            }))
        }
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self, payment))]
    pub async fn enroll(&self, course_id: &str, payment: &PaymentDetails) -> Result<EnrollmentOutcome, ApiError> {
        self.client.post(&enroll_path(course_id), payment, RequestOptions::new()).await
    }

    /// Whether the logged-in student is enrolled in `course_id`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn check_enrollment(&self, course_id: &str) -> Result<bool, ApiError> {
        let body = EnrollmentCheck { check_only: true, course_id: course_id.to_string() };
        let status: EnrollmentStatus =
            self.client.post(&enroll_path(course_id), &body, RequestOptions::new()).await?;
        Ok(status.is_enrolled)
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn wallet_balance(&self, user_id: &str) -> Result<f64, ApiError> {
        let wallet: WalletBalance =
            self.client.get(WALLET_PATH, RequestOptions::new().query("userId", user_id)).await?;
        Ok(wallet.balance)
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request
    #[instrument(skip(self))]
    pub async fn my_enrollments(&self, user_id: &str) -> Result<Vec<Enrollment>, ApiError> {
        let list: EnrollmentList =
            self.client.get(MY_ENROLLMENTS_PATH, RequestOptions::new().query("userId", user_id)).await?;
        Ok(list.enrollments)
    }
}

fn enroll_path(course_id: &str) -> String {
    format!("{COURSES_PATH}/{}/enroll", segment(course_id))
}
