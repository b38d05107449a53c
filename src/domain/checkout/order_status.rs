//! Order lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Checkout started, awaiting payment confirmation.
    Pending,
    /// Payment confirmed by the provider.
    Paid,
    /// Payment attempt failed.
    Failed,
    /// Payment was refunded.
    Refunded,
}

impl OrderStatus {
    /// Parse a status from its persisted string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// The persisted string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Refunded is the only terminal state; a failed payment can still
    /// succeed on a later attempt against the same order.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Refunded)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_all_persisted_forms() {
        assert_eq!(OrderStatus::parse("pending"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("paid"), Some(OrderStatus::Paid));
        assert_eq!(OrderStatus::parse("failed"), Some(OrderStatus::Failed));
        assert_eq!(OrderStatus::parse("refunded"), Some(OrderStatus::Refunded));
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!(OrderStatus::parse("completed"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn as_str_roundtrips() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Failed,
            OrderStatus::Refunded,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn only_refunded_is_terminal() {
        assert!(OrderStatus::Refunded.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
        assert!(!OrderStatus::Failed.is_terminal());
    }
}
