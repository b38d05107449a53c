//! Configuration error types

use thiserror::Error;

/// Errors that occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying configuration library error (missing variables,
    /// type mismatches).
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors from semantic validation of loaded configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration value missing: {0}")]
    MissingRequired(&'static str),

    #[error("Server port must be non-zero")]
    InvalidPort,

    #[error("Database URL must start with postgres:// or postgresql://")]
    InvalidDatabaseUrl,

    #[error("Frontend URL must start with http:// or https://")]
    InvalidFrontendUrl,

    #[error("Stripe API key must start with sk_")]
    InvalidStripeKey,

    #[error("Stripe webhook secret must start with whsec_")]
    InvalidStripeWebhookSecret,

    #[error("Database pool size must be at least 1")]
    InvalidPoolSize,
}
