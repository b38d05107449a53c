//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe HTTP API
//! using form-encoded requests, as the API expects. One-time payments
//! only: checkout sessions are created in `payment` mode with inline
//! price data from the course, so no price objects need provisioning.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{
    CheckoutSessionRequest, PaymentError, PaymentErrorCode, PaymentProvider,
    ProviderCheckoutSession, Refund, RefundRequest, SessionPaymentStatus,
};

use super::wire_types::{
    StripeCheckoutSessionResponse, StripeErrorResponse, StripeRefundResponse,
};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe implementation of the `PaymentProvider` port.
pub struct StripeCheckoutAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeCheckoutAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Extracts the provider's error message from a non-2xx response.
    async fn provider_error(response: reqwest::Response, operation: &str) -> PaymentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StripeErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| body.clone());

        tracing::error!(
            operation = operation,
            status = %status,
            error = %message,
            "Stripe API call failed"
        );

        let code = match status.as_u16() {
            401 | 403 => PaymentErrorCode::AuthenticationError,
            404 => PaymentErrorCode::NotFound,
            429 => PaymentErrorCode::RateLimitExceeded,
            _ => PaymentErrorCode::ProviderError,
        };
        PaymentError::new(code, format!("Stripe {}: {}", operation, message))
    }

    fn session_from_response(response: StripeCheckoutSessionResponse) -> ProviderCheckoutSession {
        let payment_status = response
            .payment_status
            .as_deref()
            .map(SessionPaymentStatus::parse)
            .unwrap_or(SessionPaymentStatus::Unknown);

        ProviderCheckoutSession {
            id: response.id,
            url: response.url,
            payment_status,
            payment_intent_id: response.payment_intent,
            expires_at: response.expires_at,
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeCheckoutAdapter {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<ProviderCheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let amount = request.amount.amount_cents().to_string();
        let mut params = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            (
                "line_items[0][price_data][currency]",
                request.amount.currency().to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                request.course_title,
            ),
            ("line_items[0][price_data][unit_amount]", amount),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
            ("metadata[user_id]", request.user_id.to_string()),
            ("metadata[course_id]", request.course_id.to_string()),
        ];

        if let Some(description) = request.course_description {
            if !description.is_empty() {
                params.push((
                    "line_items[0][price_data][product_data][description]",
                    description,
                ));
            }
        }

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response, "create_checkout_session").await);
        }

        let session: StripeCheckoutSessionResponse = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        tracing::info!(
            session_id = %session.id,
            user_id = %request.user_id,
            course_id = %request.course_id,
            "Stripe checkout session created"
        );

        Ok(Self::session_from_response(session))
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ProviderCheckoutSession>, PaymentError> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Self::provider_error(response, "retrieve_checkout_session").await);
        }

        let session: StripeCheckoutSessionResponse = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(Some(Self::session_from_response(session)))
    }

    async fn create_refund(&self, request: RefundRequest) -> Result<Refund, PaymentError> {
        let url = format!("{}/v1/refunds", self.config.api_base_url);

        let mut params = vec![("payment_intent", request.payment_intent_id.clone())];
        if let Some(amount) = request.amount_cents {
            params.push(("amount", amount.to_string()));
        }

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response, "create_refund").await);
        }

        let refund: StripeRefundResponse = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        tracing::info!(
            refund_id = %refund.id,
            payment_intent_id = %request.payment_intent_id,
            "Stripe refund created"
        );

        Ok(Refund {
            id: refund.id,
            status: refund.status.unwrap_or_else(|| "pending".to_string()),
        })
    }
}
