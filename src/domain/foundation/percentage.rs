//! Percentage value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A value between 0 and 100 inclusive.
///
/// Used for enrollment progress tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100);

    /// Creates a new Percentage, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a Percentage, returning error if out of range.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::out_of_range(
                "percentage",
                0,
                100,
                i32::from(value),
            ));
        }
        Ok(Self(value))
    }

    /// Computes the percentage of `completed` out of `total`, rounded down.
    ///
    /// A zero total yields zero percent.
    pub fn of_counts(completed: u32, total: u32) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let pct = (u64::from(completed) * 100 / u64::from(total)).min(100);
        Self(pct as u8)
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_new_clamps_to_100() {
        assert_eq!(Percentage::new(101).value(), 100);
        assert_eq!(Percentage::new(255).value(), 100);
    }

    #[test]
    fn percentage_try_new_rejects_over_100() {
        assert!(Percentage::try_new(101).is_err());
        assert!(Percentage::try_new(100).is_ok());
    }

    #[test]
    fn of_counts_computes_floor_percentage() {
        assert_eq!(Percentage::of_counts(1, 3).value(), 33);
        assert_eq!(Percentage::of_counts(2, 3).value(), 66);
        assert_eq!(Percentage::of_counts(3, 3).value(), 100);
    }

    #[test]
    fn of_counts_zero_total_is_zero() {
        assert_eq!(Percentage::of_counts(0, 0), Percentage::ZERO);
        assert_eq!(Percentage::of_counts(5, 0), Percentage::ZERO);
    }

    #[test]
    fn of_counts_caps_at_100() {
        assert_eq!(Percentage::of_counts(7, 3).value(), 100);
    }

    #[test]
    fn displays_with_percent_sign() {
        assert_eq!(Percentage::new(42).to_string(), "42%");
    }
}
