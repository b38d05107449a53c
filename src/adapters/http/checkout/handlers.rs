//! HTTP handlers for checkout, orders, and webhook endpoints.
//!
//! These handlers connect Axum routes to application layer command and
//! query handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::handlers::checkout::{
    CheckoutUrls, ConfirmCheckoutCommand, ConfirmCheckoutHandler, ListOrdersHandler,
    ListOrdersQuery, OrderSettlement, StartCheckoutCommand, StartCheckoutHandler,
};
use crate::application::handlers::payments::{
    ChargeRefundedHandler, CheckoutCompletedHandler, CheckoutWebhookDispatcher,
    PaymentFailedHandler, PaymentSucceededHandler, ProcessStripeWebhookCommand,
    ProcessStripeWebhookHandler, RefundOrderCommand, RefundOrderHandler,
};
use crate::domain::checkout::CheckoutError;
use crate::domain::foundation::{CourseId, OrderId, UserId};
use crate::domain::payments::{StripeWebhookVerifier, WebhookError};
use crate::ports::{
    CourseReader, EnrollmentRepository, EventPublisher, OrderRepository, PaymentProvider,
    WebhookEventRepository,
};

use super::dto::{
    CancelQuery, CheckoutCancelResponse, CheckoutSuccessResponse, EnrollmentResponse,
    ErrorResponse, OrderResponse, OrdersResponse, RefundOrderBody, RefundOrderResponse,
    StartCheckoutResponse, SuccessQuery, WebhookAckResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct CheckoutAppState {
    pub courses: Arc<dyn CourseReader>,
    pub orders: Arc<dyn OrderRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub webhook_verifier: Arc<StripeWebhookVerifier>,
    pub checkout_urls: CheckoutUrls,
    /// Reject test-mode webhook events (enabled in production).
    pub require_livemode: bool,
}

impl CheckoutAppState {
    fn settlement(&self) -> Arc<OrderSettlement> {
        Arc::new(OrderSettlement::new(
            self.orders.clone(),
            self.enrollments.clone(),
            self.courses.clone(),
            self.event_publisher.clone(),
        ))
    }

    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            self.courses.clone(),
            self.orders.clone(),
            self.enrollments.clone(),
            self.payment_provider.clone(),
            self.checkout_urls.clone(),
        )
    }

    pub fn confirm_checkout_handler(&self) -> ConfirmCheckoutHandler {
        ConfirmCheckoutHandler::new(
            self.orders.clone(),
            self.payment_provider.clone(),
            self.settlement(),
        )
    }

    pub fn list_orders_handler(&self) -> ListOrdersHandler {
        ListOrdersHandler::new(self.orders.clone())
    }

    pub fn refund_order_handler(&self) -> RefundOrderHandler {
        RefundOrderHandler::new(
            self.orders.clone(),
            self.enrollments.clone(),
            self.payment_provider.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn webhook_handler(&self) -> ProcessStripeWebhookHandler {
        let dispatcher = Arc::new(CheckoutWebhookDispatcher::new(
            CheckoutCompletedHandler::new(self.orders.clone(), self.settlement()),
            PaymentSucceededHandler::new(self.orders.clone(), self.event_publisher.clone()),
            PaymentFailedHandler::new(self.orders.clone(), self.event_publisher.clone()),
            ChargeRefundedHandler::new(
                self.orders.clone(),
                self.enrollments.clone(),
                self.event_publisher.clone(),
            ),
        ));
        ProcessStripeWebhookHandler::new(
            self.webhook_verifier.clone(),
            self.webhook_events.clone(),
            dispatcher,
            self.require_livemode,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from the request.
///
/// In production this would be extracted from a validated JWT/session by
/// auth middleware. For development and testing an X-User-Id header is
/// accepted.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<UserId>().ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout/course/{id} - Start checkout for a course
pub async fn start_checkout(
    State(state): State<CheckoutAppState>,
    user: AuthenticatedUser,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.start_checkout_handler();
    let result = handler
        .handle(StartCheckoutCommand {
            user_id: user.user_id,
            course_id: CourseId::from_uuid(course_id),
        })
        .await?;

    let response = StartCheckoutResponse {
        message: "Checkout session created".to_string(),
        checkout_url: result.checkout_url,
        session_id: result.session_id,
        order: OrderResponse::from(&result.order),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/checkout/success - Confirm checkout after the hosted page redirect
pub async fn checkout_success(
    State(state): State<CheckoutAppState>,
    _user: AuthenticatedUser,
    Query(query): Query<SuccessQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.confirm_checkout_handler();
    let result = handler
        .handle(ConfirmCheckoutCommand {
            session_id: query.session_id,
            course_id: CourseId::from_uuid(query.course_id),
        })
        .await?;

    let response = CheckoutSuccessResponse {
        message: "Payment successful! You are now enrolled in the course.".to_string(),
        order: OrderResponse::from(&result.order),
        enrollment: EnrollmentResponse::from(&result.enrollment),
    };

    Ok(Json(response))
}

/// GET /api/checkout/cancel - Acknowledge a cancelled checkout
pub async fn checkout_cancel(
    _user: AuthenticatedUser,
    Query(query): Query<CancelQuery>,
) -> impl IntoResponse {
    Json(CheckoutCancelResponse {
        message: "Checkout was cancelled".to_string(),
        course_id: query.course_id,
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Order Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/orders - List the current user's orders
pub async fn list_orders(
    State(state): State<CheckoutAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.list_orders_handler();
    let orders = handler
        .handle(ListOrdersQuery {
            user_id: user.user_id,
        })
        .await?;

    let response = OrdersResponse {
        orders: orders.iter().map(OrderResponse::from).collect(),
    };
    Ok(Json(response))
}

/// POST /api/orders/{id}/refund - Refund an order
pub async fn refund_order(
    State(state): State<CheckoutAppState>,
    _user: AuthenticatedUser, // Would check admin role in production
    Path(order_id): Path<Uuid>,
    Json(body): Json<RefundOrderBody>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.refund_order_handler();
    let result = handler
        .handle(RefundOrderCommand {
            order_id: OrderId::from_uuid(order_id),
            amount_cents: body.amount_cents,
        })
        .await?;

    let response = RefundOrderResponse {
        message: "Refund created".to_string(),
        refund_id: result.refund.id,
        order: OrderResponse::from(&result.order),
    };
    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handler
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Handle Stripe webhook events
pub async fn stripe_webhook(
    State(state): State<CheckoutAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Stripe webhook signature header missing");
            WebhookApiError(WebhookError::ParseError(
                "Missing Stripe-Signature header".to_string(),
            ))
        })?;

    let handler = state.webhook_handler();
    handler
        .handle(ProcessStripeWebhookCommand {
            payload: body.to_vec(),
            signature: signature.to_string(),
        })
        .await?;

    Ok(Json(WebhookAckResponse {
        message: "Webhook received".to_string(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts checkout errors to HTTP responses.
pub struct ApiError(CheckoutError);

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            CheckoutError::CourseNotFound(_) => (StatusCode::NOT_FOUND, "COURSE_NOT_FOUND"),
            CheckoutError::OrderNotFound { .. } => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            CheckoutError::AlreadyEnrolled { .. } => (StatusCode::CONFLICT, "ALREADY_ENROLLED"),
            CheckoutError::InvalidState { .. } => {
                (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION")
            }
            CheckoutError::CourseNotPublished(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "COURSE_NOT_AVAILABLE")
            }
            CheckoutError::CourseMismatch { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "ORDER_COURSE_MISMATCH")
            }
            CheckoutError::PaymentNotCompleted { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "PAYMENT_NOT_COMPLETED")
            }
            CheckoutError::ValidationFailed { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            CheckoutError::PaymentProvider(detail) => {
                tracing::error!(error = %detail, "Payment provider failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "PAYMENT_PROVIDER_ERROR")
            }
            CheckoutError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "Infrastructure failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(error_code, self.0.message());
        (status, Json(body)).into_response()
    }
}

/// API error type for the webhook endpoint.
///
/// Status codes drive the provider's retry behavior, so the mapping
/// comes from `WebhookError::status_code`.
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Webhook processing failed");
        } else {
            tracing::warn!(error = %self.0, "Webhook rejected");
        }

        // Acknowledged-but-ignored events answer like a success
        if status == StatusCode::OK {
            return (
                status,
                Json(WebhookAckResponse {
                    message: "Webhook received".to_string(),
                }),
            )
                .into_response();
        }

        let code = match &self.0 {
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                "INVALID_SIGNATURE"
            }
            WebhookError::InvalidTimestamp => "INVALID_TIMESTAMP",
            WebhookError::ParseError(_) | WebhookError::MissingField(_) => "INVALID_PAYLOAD",
            WebhookError::InvalidTransition(_) => "INVALID_STATE_TRANSITION",
            WebhookError::Ignored(_) => "IGNORED",
            WebhookError::Database(_) => "INTERNAL_ERROR",
        };

        let body = ErrorResponse::new(code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CourseId;

    // ══════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn api_error_maps_course_not_found_to_404() {
        let err = ApiError(CheckoutError::course_not_found(CourseId::new()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_order_not_found_to_404() {
        let err = ApiError(CheckoutError::order_not_found("cs_1"));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_already_enrolled_to_409() {
        let err = ApiError(CheckoutError::already_enrolled(UserId::new(), CourseId::new()));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_maps_invalid_state_to_409() {
        let err = ApiError(CheckoutError::invalid_state("refunded", "mark paid"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_maps_unpublished_course_to_422() {
        let err = ApiError(CheckoutError::course_not_published(CourseId::new()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn api_error_maps_payment_not_completed_to_422() {
        let err = ApiError(CheckoutError::payment_not_completed("cs_1"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn api_error_maps_validation_to_400() {
        let err = ApiError(CheckoutError::validation("amount_cents", "must be positive"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_provider_failure_to_500() {
        let err = ApiError(CheckoutError::payment_provider("timeout"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn webhook_error_maps_invalid_signature_to_401() {
        let err = WebhookApiError(WebhookError::InvalidSignature);
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn webhook_error_maps_missing_header_to_400() {
        let err = WebhookApiError(WebhookError::ParseError("missing header".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn webhook_error_maps_ignored_to_200() {
        let err = WebhookApiError(WebhookError::Ignored("no order".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn webhook_error_maps_database_to_500() {
        let err = WebhookApiError(WebhookError::Database("down".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
