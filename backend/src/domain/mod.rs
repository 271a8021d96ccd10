//! Domain types, ports, and services.
//!
//! The domain layer is transport and storage agnostic: aggregates and
//! value types live here together with the ports that adapters implement
//! (driven) or consume (driving), and the services wiring the order
//! lifecycle together.

pub mod catalog;
pub mod error;
pub mod order;
mod order_service;
pub mod ports;

pub use self::catalog::{CatalogItem, CatalogValidationError, ItemId, default_catalog};
pub use self::error::{Error, ErrorCode};
pub use self::order::{
    Order, OrderDraft, OrderId, OrderLine, OrderStatus, OrderStatusEvent, OrderValidationError,
    OwnerRef, UnknownOrderStatus,
};
pub use self::order_service::{OrderCommandService, OrderQueryService};
