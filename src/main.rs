//! Skillforge service binary.
//!
//! Loads configuration, connects the adapters, and serves the API.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use skillforge::adapters::events::InMemoryEventBus;
use skillforge::adapters::http::{api_router, CheckoutAppState};
use skillforge::adapters::postgres::{
    create_pool, PostgresCourseReader, PostgresEnrollmentRepository, PostgresOrderRepository,
    PostgresWebhookEventRepository,
};
use skillforge::adapters::stripe::{StripeCheckoutAdapter, StripeConfig};
use skillforge::application::handlers::checkout::CheckoutUrls;
use skillforge::config::AppConfig;
use skillforge::domain::payments::StripeWebhookVerifier;

/// Default request timeout for API endpoints.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    if config.is_production() && config.payment.is_test_mode() {
        tracing::warn!("Running in production with a Stripe test key");
    }

    let pool = create_pool(&config.database).await?;
    tracing::info!("Connected to database");

    let state = CheckoutAppState {
        courses: Arc::new(PostgresCourseReader::new(pool.clone())),
        orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
        enrollments: Arc::new(PostgresEnrollmentRepository::new(pool.clone())),
        webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool)),
        payment_provider: Arc::new(StripeCheckoutAdapter::new(StripeConfig::new(
            config.payment.stripe_api_key.clone(),
        ))),
        event_publisher: Arc::new(InMemoryEventBus::new()),
        webhook_verifier: Arc::new(StripeWebhookVerifier::new(
            config.payment.stripe_webhook_secret.clone(),
        )),
        checkout_urls: CheckoutUrls::new(config.server.frontend_url.clone()),
        require_livemode: config.payment.require_livemode,
    };

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}
