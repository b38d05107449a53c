//! Enrollment lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a course enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Student has access to course content.
    Active,
    /// Student finished the course.
    Completed,
    /// Access was revoked (originating order refunded).
    Cancelled,
}

impl EnrollmentStatus {
    /// Parse a status from its persisted string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// The persisted string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the enrollment grants access to course content.
    pub fn grants_access(&self) -> bool {
        matches!(self, Self::Active | Self::Completed)
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_roundtrips() {
        for status in [
            EnrollmentStatus::Active,
            EnrollmentStatus::Completed,
            EnrollmentStatus::Cancelled,
        ] {
            assert_eq!(EnrollmentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!(EnrollmentStatus::parse("paused"), None);
    }

    #[test]
    fn cancelled_does_not_grant_access() {
        assert!(EnrollmentStatus::Active.grants_access());
        assert!(EnrollmentStatus::Completed.grants_access());
        assert!(!EnrollmentStatus::Cancelled.grants_access());
    }
}
