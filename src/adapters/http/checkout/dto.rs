//! Request and response DTOs for the checkout API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::checkout::Order;
use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::Timestamp;

/// Order view returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub checkout_session_id: String,
    pub payment_intent_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: Timestamp,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: *order.id.as_uuid(),
            course_id: *order.course_id.as_uuid(),
            amount_cents: order.amount.amount_cents(),
            currency: order.amount.currency().to_string(),
            status: order.status.as_str().to_string(),
            checkout_session_id: order.checkout_session_id.clone(),
            payment_intent_id: order.payment_intent_id.clone(),
            failure_reason: order.failure_reason.clone(),
            created_at: order.created_at,
        }
    }
}

/// Enrollment view returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub progress_pct: u8,
    pub lessons_completed: u32,
    pub lessons_total: u32,
    pub enrolled_at: Timestamp,
}

impl From<&Enrollment> for EnrollmentResponse {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: *enrollment.id.as_uuid(),
            course_id: *enrollment.course_id.as_uuid(),
            status: enrollment.status.as_str().to_string(),
            progress_pct: enrollment.progress.value(),
            lessons_completed: enrollment.lessons_completed,
            lessons_total: enrollment.lessons_total,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

/// Response for a started checkout.
#[derive(Debug, Serialize)]
pub struct StartCheckoutResponse {
    pub message: String,
    pub checkout_url: String,
    pub session_id: String,
    pub order: OrderResponse,
}

/// Query parameters on the success redirect.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: String,
    pub course_id: Uuid,
}

/// Response for a confirmed checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutSuccessResponse {
    pub message: String,
    pub order: OrderResponse,
    pub enrollment: EnrollmentResponse,
}

/// Query parameters on the cancel redirect.
#[derive(Debug, Deserialize)]
pub struct CancelQuery {
    pub course_id: Option<Uuid>,
}

/// Response for a cancelled checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutCancelResponse {
    pub message: String,
    pub course_id: Option<Uuid>,
}

/// Response listing a user's orders.
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderResponse>,
}

/// Body for a refund request.
#[derive(Debug, Deserialize)]
pub struct RefundOrderBody {
    /// Partial refund amount in minor units; omit for a full refund.
    #[serde(default)]
    pub amount_cents: Option<i64>,
}

/// Response for a created refund.
#[derive(Debug, Serialize)]
pub struct RefundOrderResponse {
    pub message: String,
    pub refund_id: String,
    pub order: OrderResponse,
}

/// Acknowledgement body for processed webhooks.
#[derive(Debug, Serialize)]
pub struct WebhookAckResponse {
    pub message: String,
}

/// Error body returned on any failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
