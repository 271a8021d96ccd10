//! Order payloads exchanged across the driving ports.
//!
//! Adapters consume these instead of the domain aggregate so totals are
//! computed exactly once, at the boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::order::{Order, OrderId, OrderLine, OrderStatus, OwnerRef};

/// One order line with its computed total.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLinePayload {
    /// Referenced catalog item.
    pub item_id: String,
    /// Display name captured at order time.
    pub name: String,
    /// Ordered quantity.
    pub quantity: u32,
    /// Unit price captured at order time.
    pub unit_price: Decimal,
    /// Quantity × unit price.
    pub line_total: Decimal,
}

impl From<&OrderLine> for OrderLinePayload {
    fn from(line: &OrderLine) -> Self {
        Self {
            item_id: line.item_id().as_str().to_owned(),
            name: line.name().to_owned(),
            quantity: line.quantity(),
            unit_price: line.unit_price(),
            line_total: line.line_total(),
        }
    }
}

/// An order with per-line and grand totals computed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPayload {
    /// Order identifier.
    pub id: OrderId,
    /// Attributed owner.
    pub owner: OwnerRef,
    /// Submission timestamp.
    pub placed_at: DateTime<Utc>,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// Lines with computed totals.
    pub lines: Vec<OrderLinePayload>,
    /// Grand total under the running-accumulation rounding policy.
    pub total: Decimal,
}

impl From<&Order> for OrderPayload {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            owner: order.owner().clone(),
            placed_at: order.placed_at(),
            status: order.status(),
            lines: order.lines().iter().map(OrderLinePayload::from).collect(),
            total: order.total(),
        }
    }
}
