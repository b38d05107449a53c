//! Axum router configuration for the checkout API.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    checkout_cancel, checkout_success, list_orders, refund_order, start_checkout, stripe_webhook,
    CheckoutAppState,
};

/// Create the checkout router.
///
/// # Routes (require authentication)
/// - `POST /course/{id}` - Start checkout for a course
/// - `GET /success` - Confirm checkout after the hosted-page redirect
/// - `GET /cancel` - Acknowledge a cancelled checkout
pub fn checkout_routes() -> Router<CheckoutAppState> {
    Router::new()
        .route("/course/:course_id", post(start_checkout))
        .route("/success", get(checkout_success))
        .route("/cancel", get(checkout_cancel))
}

/// Create the orders router.
///
/// # Routes (require authentication)
/// - `GET /` - List the current user's orders
/// - `POST /{id}/refund` - Refund an order (operator action)
pub fn orders_routes() -> Router<CheckoutAppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/:order_id/refund", post(refund_order))
}

/// Create the webhook router.
///
/// Separate from the user-facing routers because webhooks carry no user
/// authentication; they are authenticated by signature.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<CheckoutAppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}

/// Create the complete API router, suitable for mounting at `/api`.
pub fn api_router() -> Router<CheckoutAppState> {
    Router::new()
        .nest("/checkout", checkout_routes())
        .nest("/orders", orders_routes())
        .nest("/webhooks", webhook_routes())
}
