//! Checkout-flow error types.
//!
//! Errors raised across checkout initiation, success-redirect
//! reconciliation, and refund handling.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | CourseNotFound | 404 |
//! | OrderNotFound | 404 |
//! | AlreadyEnrolled | 409 |
//! | InvalidState | 409 |
//! | CourseNotPublished | 422 |
//! | CourseMismatch | 422 |
//! | PaymentNotCompleted | 422 |
//! | ValidationFailed | 400 |
//! | PaymentProvider | 500 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, UserId};

/// Errors from the checkout and payment reconciliation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Course does not exist.
    CourseNotFound(CourseId),

    /// Order could not be located by the given reference.
    OrderNotFound { reference: String },

    /// User already holds an enrollment for this course.
    AlreadyEnrolled { user_id: UserId, course_id: CourseId },

    /// Course exists but is not available for purchase.
    CourseNotPublished(CourseId),

    /// Order belongs to a different course than the one claimed.
    CourseMismatch {
        expected: CourseId,
        received: CourseId,
    },

    /// Provider reports the checkout session is not paid.
    PaymentNotCompleted { session_id: String },

    /// Invalid state for the requested order transition.
    InvalidState {
        current: String,
        attempted: String,
    },

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Payment provider call failed.
    PaymentProvider(String),

    /// Infrastructure error.
    Infrastructure(String),
}

impl CheckoutError {
    pub fn course_not_found(id: CourseId) -> Self {
        CheckoutError::CourseNotFound(id)
    }

    pub fn order_not_found(reference: impl Into<String>) -> Self {
        CheckoutError::OrderNotFound {
            reference: reference.into(),
        }
    }

    pub fn already_enrolled(user_id: UserId, course_id: CourseId) -> Self {
        CheckoutError::AlreadyEnrolled { user_id, course_id }
    }

    pub fn course_not_published(id: CourseId) -> Self {
        CheckoutError::CourseNotPublished(id)
    }

    pub fn course_mismatch(expected: CourseId, received: CourseId) -> Self {
        CheckoutError::CourseMismatch { expected, received }
    }

    pub fn payment_not_completed(session_id: impl Into<String>) -> Self {
        CheckoutError::PaymentNotCompleted {
            session_id: session_id.into(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        CheckoutError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CheckoutError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn payment_provider(message: impl Into<String>) -> Self {
        CheckoutError::PaymentProvider(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CheckoutError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            CheckoutError::OrderNotFound { .. } => ErrorCode::OrderNotFound,
            CheckoutError::AlreadyEnrolled { .. } => ErrorCode::AlreadyEnrolled,
            CheckoutError::CourseNotPublished(_)
            | CheckoutError::CourseMismatch { .. }
            | CheckoutError::PaymentNotCompleted { .. } => ErrorCode::ValidationFailed,
            CheckoutError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            CheckoutError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CheckoutError::PaymentProvider(_) => ErrorCode::ExternalServiceError,
            CheckoutError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing message.
    ///
    /// Provider and infrastructure failures deliberately return generic
    /// text; the underlying detail is logged, not exposed to clients.
    pub fn message(&self) -> String {
        match self {
            CheckoutError::CourseNotFound(_) => "Course not found".to_string(),
            CheckoutError::OrderNotFound { .. } => "Order not found".to_string(),
            CheckoutError::AlreadyEnrolled { .. } => {
                "You are already enrolled in this course".to_string()
            }
            CheckoutError::CourseNotPublished(_) => {
                "This course is not available for purchase".to_string()
            }
            CheckoutError::CourseMismatch { .. } => "Order course mismatch".to_string(),
            CheckoutError::PaymentNotCompleted { .. } => "Payment not completed".to_string(),
            CheckoutError::InvalidState { current, attempted } => {
                format!("Cannot {} an order in {} state", attempted, current)
            }
            CheckoutError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CheckoutError::PaymentProvider(_) => {
                "Payment provider request failed".to_string()
            }
            CheckoutError::Infrastructure(_) => "Internal error".to_string(),
        }
    }
}

impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CheckoutError {}

impl From<DomainError> for CheckoutError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::OutOfRange | ErrorCode::InvalidFormat => {
                CheckoutError::ValidationFailed {
                    field: err
                        .details
                        .get("field")
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string()),
                    message: err.message,
                }
            }
            ErrorCode::ExternalServiceError => CheckoutError::PaymentProvider(err.message),
            _ => CheckoutError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_not_found_has_stable_message() {
        let err = CheckoutError::course_not_found(CourseId::new());
        assert_eq!(err.message(), "Course not found");
        assert_eq!(err.code(), ErrorCode::CourseNotFound);
    }

    #[test]
    fn already_enrolled_maps_to_conflict_code() {
        let err = CheckoutError::already_enrolled(UserId::new(), CourseId::new());
        assert_eq!(err.code(), ErrorCode::AlreadyEnrolled);
    }

    #[test]
    fn invalid_state_names_transition() {
        let err = CheckoutError::invalid_state("refunded", "mark paid");
        assert_eq!(err.message(), "Cannot mark paid an order in refunded state");
    }

    #[test]
    fn provider_message_does_not_leak_detail() {
        let err = CheckoutError::payment_provider("connect timeout to api.stripe.com");
        assert!(!err.message().contains("stripe.com"));
    }

    #[test]
    fn infrastructure_message_does_not_leak_detail() {
        let err = CheckoutError::infrastructure("relation \"orders\" does not exist");
        assert_eq!(err.message(), "Internal error");
    }

    #[test]
    fn domain_error_maps_by_code() {
        let db = DomainError::database("connection reset");
        assert!(matches!(
            CheckoutError::from(db),
            CheckoutError::Infrastructure(_)
        ));

        let validation = DomainError::validation("currency", "bad code");
        assert!(matches!(
            CheckoutError::from(validation),
            CheckoutError::ValidationFailed { .. }
        ));
    }
}
