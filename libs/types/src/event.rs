//! Canonical order events
//!
//! [`OrderEvent`]s on the `orders.events` topic are the authoritative order
//! history. The payload is the originating command or execution report,
//! embedded as raw JSON so consumers decode only what they need.

use crate::ids::new_event_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of order event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    OrderCreated,
    OrderAccepted,
    OrderLive,
    OrderPartiallyFilled,
    OrderFilled,
    OrderCancelRequested,
    OrderCanceled,
    OrderRejected,
}

impl OrderEventType {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEventType::OrderCreated => "ORDER_CREATED",
            OrderEventType::OrderAccepted => "ORDER_ACCEPTED",
            OrderEventType::OrderLive => "ORDER_LIVE",
            OrderEventType::OrderPartiallyFilled => "ORDER_PARTIALLY_FILLED",
            OrderEventType::OrderFilled => "ORDER_FILLED",
            OrderEventType::OrderCancelRequested => "ORDER_CANCEL_REQUESTED",
            OrderEventType::OrderCanceled => "ORDER_CANCELED",
            OrderEventType::OrderRejected => "ORDER_REJECTED",
        }
    }
}

impl fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical order event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_id: String,
    pub order_id: String,
    #[serde(rename = "type")]
    pub event_type: OrderEventType,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl OrderEvent {
    /// Build an event wrapping the originating command or report.
    pub fn new<P: Serialize>(
        order_id: &str,
        event_type: OrderEventType,
        payload: &P,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id: new_event_id(),
            order_id: order_id.to_string(),
            event_type,
            payload: serde_json::to_value(payload)?,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandType, OrderCommand};
    use crate::numeric::{Price, Quantity};
    use crate::order::Side;

    #[test]
    fn test_event_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderEventType::OrderCancelRequested).unwrap(),
            "\"ORDER_CANCEL_REQUESTED\""
        );
        assert_eq!(OrderEventType::OrderCreated.to_string(), "ORDER_CREATED");
    }

    #[test]
    fn test_event_wraps_command_payload() {
        let cmd = OrderCommand {
            command_id: "cmd-1".into(),
            command_type: CommandType::New,
            order_id: "ord-1".into(),
            client_id: "ACC_CHILD_1".into(),
            symbol: "BTC-USD".into(),
            side: Some(Side::Buy),
            quantity: Quantity::from_str("1").unwrap(),
            price: Price::from_u64(50000),
            timestamp: None,
        };
        let event = OrderEvent::new("ord-1", OrderEventType::OrderCreated, &cmd).unwrap();

        assert_eq!(event.order_id, "ord-1");
        assert!(!event.event_id.is_empty());

        // The payload decodes back into the originating command.
        let decoded: OrderCommand = serde_json::from_value(event.payload.clone()).unwrap();
        assert_eq!(decoded, cmd);
    }

    #[test]
    fn test_event_round_trip() {
        let event =
            OrderEvent::new("ord-2", OrderEventType::OrderFilled, &serde_json::json!({"k": 1}))
                .unwrap();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ORDER_FILLED\""));
        let decoded: OrderEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, decoded);
    }
}
