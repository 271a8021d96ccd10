//! Wire-level message definitions for the WebSocket adapter.
//!
//! Domain events are transformed into these payloads before being
//! serialized to JSON and pushed to connected clients. Clients send
//! nothing but heartbeats, so there is no inbound payload.

use serde::Serialize;

use crate::domain::{OrderId, OrderStatus, OrderStatusEvent};

/// Outbound server-push events, tagged by `type` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// An order changed status.
    #[serde(rename = "ORDER_STATUS", rename_all = "camelCase")]
    OrderStatus {
        /// The order that changed.
        order_id: OrderId,
        /// The state it changed to.
        status: OrderStatus,
    },
}

impl From<OrderStatusEvent> for ServerEvent {
    fn from(event: OrderStatusEvent) -> Self {
        Self::OrderStatus {
            order_id: event.order_id,
            status: event.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn serialises_status_events_with_the_public_tag() {
        let order_id = OrderId::generate();
        let event = ServerEvent::from(OrderStatusEvent {
            order_id,
            status: OrderStatus::Completed,
        });

        let value = serde_json::to_value(event).expect("event serialises");
        assert_eq!(value["type"], "ORDER_STATUS");
        assert_eq!(value["orderId"], order_id.to_string());
        assert_eq!(value["status"], "completed");
    }
}
