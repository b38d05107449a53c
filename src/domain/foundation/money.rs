//! Money value object in minor currency units.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// An amount of money in minor currency units (cents) with its currency code.
///
/// Amounts are non-negative; the currency code is a lowercase ISO 4217
/// three-letter code as used by the payment provider API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount_cents: i64,
    currency: String,
}

impl Money {
    /// Creates a new Money value.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the amount is negative or the currency
    /// code is not three ASCII letters.
    pub fn new(amount_cents: i64, currency: impl Into<String>) -> Result<Self, ValidationError> {
        if amount_cents < 0 {
            return Err(ValidationError::out_of_range(
                "amount_cents",
                0,
                i32::MAX,
                amount_cents.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            ));
        }

        let currency = currency.into();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three-letter ISO 4217 code",
            ));
        }

        Ok(Self {
            amount_cents,
            currency: currency.to_ascii_lowercase(),
        })
    }

    /// US dollars, the platform default.
    pub fn usd(amount_cents: i64) -> Result<Self, ValidationError> {
        Self::new(amount_cents, "usd")
    }

    /// Returns the amount in minor units.
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    /// Returns the lowercase currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Returns true for a zero amount.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.amount_cents / 100,
            self.amount_cents % 100,
            self.currency
        )
    }
}
