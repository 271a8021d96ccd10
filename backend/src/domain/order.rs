//! Order aggregate and its value types.
//!
//! An order is created once with at least one line, mutated only by the
//! pending → completed transition, and never deleted by the normal flow
//! (a retention sweep purges old completed orders separately). Line unit
//! prices are captured at submission time and immutable afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::domain::catalog::ItemId;

/// Globally unique order identifier, lexicographically sortable by
/// creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Ulid);

impl OrderId {
    /// Generate a fresh identifier for a new order.
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Wrap an existing ULID.
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

/// Opaque reference to whoever an order is attributed to.
///
/// The surrounding auth collaborator decides what the string means (user,
/// device, tab); the core never inspects it. Submissions without an
/// identity fall back to [`OwnerRef::anonymous`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerRef(String);

impl OwnerRef {
    /// Wrap a concrete owner identity.
    pub fn new(owner: impl Into<String>) -> Self {
        Self(owner.into())
    }

    /// The fallback owner used when no identity is provided.
    pub fn anonymous() -> Self {
        Self("anonymous".to_owned())
    }

    /// Borrow the reference as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an order. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Submitted and awaiting preparation.
    Pending,
    /// Served; no transition leaves this state.
    Completed,
}

impl OrderStatus {
    /// Stable string form used on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when a stored status string is not a known state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownOrderStatus(other.to_owned())),
        }
    }
}

/// Validation failures raised by the order constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    /// An order must carry at least one line.
    #[error("an order must contain at least one line")]
    EmptyLines,
    /// Quantities are positive integers.
    #[error("quantity for item {item_id} must be positive")]
    ZeroQuantity {
        /// Offending item id.
        item_id: ItemId,
    },
    /// Captured unit prices must not be negative.
    #[error("unit price for item {item_id} must not be negative")]
    NegativePrice {
        /// Offending item id.
        item_id: ItemId,
    },
}

/// One line of an order: an item, how many, and the price captured when
/// the order was placed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    item_id: ItemId,
    name: String,
    quantity: u32,
    unit_price: Decimal,
}

impl OrderLine {
    /// Build a line, rejecting zero quantities and negative prices.
    pub fn new(
        item_id: ItemId,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<Self, OrderValidationError> {
        if quantity == 0 {
            return Err(OrderValidationError::ZeroQuantity { item_id });
        }
        if unit_price.is_sign_negative() {
            return Err(OrderValidationError::NegativePrice { item_id });
        }
        Ok(Self {
            item_id,
            name: name.into(),
            quantity,
            unit_price,
        })
    }

    /// Referenced catalog item.
    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    /// Display name captured at order time.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Ordered quantity (always positive).
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price captured at order time.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Quantity × captured unit price.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Unvalidated field bundle for [`Order::new`].
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// Assigned identifier.
    pub id: OrderId,
    /// Attributed owner.
    pub owner: OwnerRef,
    /// Submission timestamp.
    pub placed_at: DateTime<Utc>,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// Ordered lines, at least one.
    pub lines: Vec<OrderLine>,
}

/// An order together with its lines, treated as one consistency boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    owner: OwnerRef,
    placed_at: DateTime<Utc>,
    status: OrderStatus,
    lines: Vec<OrderLine>,
}

impl Order {
    /// Validate a draft into an order. Fails when the draft has no lines;
    /// line-level invariants are enforced by [`OrderLine::new`].
    pub fn new(draft: OrderDraft) -> Result<Self, OrderValidationError> {
        let OrderDraft {
            id,
            owner,
            placed_at,
            status,
            lines,
        } = draft;
        if lines.is_empty() {
            return Err(OrderValidationError::EmptyLines);
        }
        Ok(Self {
            id,
            owner,
            placed_at,
            status,
            lines,
        })
    }

    /// Order identifier.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Attributed owner.
    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    /// Submission timestamp.
    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Current lifecycle state.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Ordered lines.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Grand total of the order.
    ///
    /// Numeric policy: the running total is rounded to 2 decimal places
    /// after each line is added, not once at the end. With 2-decimal
    /// prices the results coincide, but the accumulation order is part of
    /// the observable contract and must not be "simplified" to a final
    /// rounding.
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |total, line| {
                (total + line.line_total()).round_dp(2)
            })
    }
}

/// Event emitted when an order changes status, fanned out to every live
/// subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStatusEvent {
    /// The order that changed.
    pub order_id: OrderId,
    /// The state it changed to.
    pub status: OrderStatus,
}
