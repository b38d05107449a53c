//! Order domain events.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::foundation::{CourseId, EventEnvelope, OrderId, Timestamp, UserId};

/// Events emitted by order state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
    /// Payment was confirmed by the provider.
    Paid {
        order_id: OrderId,
        user_id: UserId,
        course_id: CourseId,
        payment_intent_id: Option<String>,
        occurred_at: Timestamp,
    },
    /// A payment attempt failed.
    Failed {
        order_id: OrderId,
        reason: String,
        occurred_at: Timestamp,
    },
    /// The payment was refunded.
    Refunded {
        order_id: OrderId,
        user_id: UserId,
        course_id: CourseId,
        occurred_at: Timestamp,
    },
}

impl OrderEvent {
    /// Event type string used for routing.
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Paid { .. } => "order.paid",
            OrderEvent::Failed { .. } => "order.failed",
            OrderEvent::Refunded { .. } => "order.refunded",
        }
    }

    fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::Paid { order_id, .. }
            | OrderEvent::Failed { order_id, .. }
            | OrderEvent::Refunded { order_id, .. } => *order_id,
        }
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            OrderEvent::Paid { occurred_at, .. }
            | OrderEvent::Failed { occurred_at, .. }
            | OrderEvent::Refunded { occurred_at, .. } => *occurred_at,
        }
    }

    /// Wraps the event in a transport envelope.
    pub fn to_envelope(&self) -> EventEnvelope {
        let mut envelope = EventEnvelope::new(
            self.event_type(),
            self.order_id().to_string(),
            "Order",
            serde_json::to_value(self).unwrap_or_else(|_| json!(null)),
        );
        envelope.occurred_at = self.occurred_at();
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_event_envelope_routes_by_type() {
        let event = OrderEvent::Paid {
            order_id: OrderId::new(),
            user_id: UserId::new(),
            course_id: CourseId::new(),
            payment_intent_id: Some("pi_1".to_string()),
            occurred_at: Timestamp::from_unix_secs(1_704_067_200),
        };

        let envelope = event.to_envelope();

        assert_eq!(envelope.event_type, "order.paid");
        assert_eq!(envelope.aggregate_type, "Order");
        assert_eq!(
            envelope.occurred_at,
            Timestamp::from_unix_secs(1_704_067_200)
        );
    }

    #[test]
    fn event_types_are_distinct() {
        let failed = OrderEvent::Failed {
            order_id: OrderId::new(),
            reason: "card declined".to_string(),
            occurred_at: Timestamp::now(),
        };
        let refunded = OrderEvent::Refunded {
            order_id: OrderId::new(),
            user_id: UserId::new(),
            course_id: CourseId::new(),
            occurred_at: Timestamp::now(),
        };

        assert_eq!(failed.event_type(), "order.failed");
        assert_eq!(refunded.event_type(), "order.refunded");
    }
}
