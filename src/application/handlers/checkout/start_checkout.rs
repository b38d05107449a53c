//! StartCheckoutHandler - Command handler for checkout initiation.

use std::sync::Arc;

use crate::domain::checkout::{CheckoutError, Order};
use crate::domain::foundation::{CourseId, OrderId, Timestamp, UserId};
use crate::ports::{
    CheckoutSessionRequest, CourseReader, EnrollmentRepository, OrderRepository, PaymentProvider,
};

/// Redirect URLs handed to the payment provider at session creation.
///
/// The success URL carries the provider's session-id placeholder, which
/// the provider substitutes before redirecting the buyer back.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    frontend_url: String,
}

impl CheckoutUrls {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn success_url(&self, course_id: &CourseId) -> String {
        format!(
            "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}&course_id={}",
            self.frontend_url, course_id
        )
    }

    pub fn cancel_url(&self, course_id: &CourseId) -> String {
        format!("{}/checkout/cancel?course_id={}", self.frontend_url, course_id)
    }
}

/// Command to start checkout for a course.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub user_id: UserId,
    pub course_id: CourseId,
}

/// Result of a started checkout.
#[derive(Debug, Clone)]
pub struct StartCheckoutResult {
    pub order: Order,
    pub checkout_url: String,
    pub session_id: String,
}

/// Handler for checkout initiation.
///
/// Validates the purchase preconditions, obtains a hosted checkout
/// session from the provider, and only then persists a pending order.
/// Provider failure therefore leaves no partially created order behind.
pub struct StartCheckoutHandler {
    courses: Arc<dyn CourseReader>,
    orders: Arc<dyn OrderRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    urls: CheckoutUrls,
}

impl StartCheckoutHandler {
    pub fn new(
        courses: Arc<dyn CourseReader>,
        orders: Arc<dyn OrderRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            courses,
            orders,
            enrollments,
            payment_provider,
            urls,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
    ) -> Result<StartCheckoutResult, CheckoutError> {
        let course = self
            .courses
            .find(&cmd.course_id)
            .await?
            .ok_or_else(|| CheckoutError::course_not_found(cmd.course_id))?;

        if self
            .enrollments
            .is_enrolled(&cmd.user_id, &cmd.course_id)
            .await?
        {
            return Err(CheckoutError::already_enrolled(cmd.user_id, cmd.course_id));
        }

        if !course.published {
            return Err(CheckoutError::course_not_published(cmd.course_id));
        }

        let session = self
            .payment_provider
            .create_checkout_session(CheckoutSessionRequest {
                user_id: cmd.user_id,
                course_id: cmd.course_id,
                course_title: course.title.clone(),
                course_description: course.description.clone(),
                amount: course.price.clone(),
                success_url: self.urls.success_url(&cmd.course_id),
                cancel_url: self.urls.cancel_url(&cmd.course_id),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    user_id = %cmd.user_id,
                    course_id = %cmd.course_id,
                    "Failed to create checkout session"
                );
                CheckoutError::payment_provider(e.to_string())
            })?;

        let checkout_url = session.url.clone().ok_or_else(|| {
            CheckoutError::payment_provider("provider returned a session without a URL")
        })?;

        let order = Order::create_pending(
            OrderId::new(),
            cmd.user_id,
            cmd.course_id,
            course.price,
            session.id.clone(),
            Timestamp::now(),
        );
        self.orders.create(&order).await?;

        tracing::info!(
            order_id = %order.id,
            session_id = %session.id,
            user_id = %cmd.user_id,
            course_id = %cmd.course_id,
            "Checkout session created"
        );

        Ok(StartCheckoutResult {
            order,
            checkout_url,
            session_id: session.id,
        })
    }
}
