//! ConfirmCheckoutHandler - Success-redirect reconciliation.
//!
//! Triggered by the buyer's browser returning from the hosted checkout
//! page. The redirect itself is untrusted: payment status is re-verified
//! with the provider before the shared settlement routine runs. This is
//! a deliberate second path to the same end state as the webhook's
//! checkout-completed handler, covering webhook delivery lag.

use std::sync::Arc;

use crate::domain::checkout::{CheckoutError, Order};
use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::CourseId;
use crate::ports::{OrderRepository, PaymentProvider};

use super::settlement::OrderSettlement;

/// Command carrying the redirect's query parameters.
#[derive(Debug, Clone)]
pub struct ConfirmCheckoutCommand {
    pub session_id: String,
    pub course_id: CourseId,
}

/// Result of a confirmed checkout.
#[derive(Debug, Clone)]
pub struct ConfirmCheckoutResult {
    pub order: Order,
    pub enrollment: Enrollment,
}

/// Handler for the success redirect.
pub struct ConfirmCheckoutHandler {
    orders: Arc<dyn OrderRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    settlement: Arc<OrderSettlement>,
}

impl ConfirmCheckoutHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        settlement: Arc<OrderSettlement>,
    ) -> Self {
        Self {
            orders,
            payment_provider,
            settlement,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmCheckoutCommand,
    ) -> Result<ConfirmCheckoutResult, CheckoutError> {
        let session = self
            .payment_provider
            .retrieve_checkout_session(&cmd.session_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    session_id = %cmd.session_id,
                    "Failed to retrieve checkout session"
                );
                CheckoutError::payment_provider(e.to_string())
            })?
            .ok_or_else(|| CheckoutError::order_not_found(cmd.session_id.clone()))?;

        if !session.payment_status.is_paid() {
            return Err(CheckoutError::payment_not_completed(cmd.session_id));
        }

        let order = self
            .orders
            .find_by_checkout_session(&cmd.session_id)
            .await?
            .ok_or_else(|| CheckoutError::order_not_found(cmd.session_id.clone()))?;

        if order.course_id != cmd.course_id {
            return Err(CheckoutError::course_mismatch(order.course_id, cmd.course_id));
        }

        let outcome = self
            .settlement
            .settle_paid_order(order, session.payment_intent_id)
            .await?;

        Ok(ConfirmCheckoutResult {
            order: outcome.order,
            enrollment: outcome.enrollment,
        })
    }
}
