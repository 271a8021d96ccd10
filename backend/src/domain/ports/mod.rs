//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (catalog repository, order repository, event publisher)
//! are implemented by outbound adapters; driving ports (order command and
//! query) are implemented by the domain services and consumed by inbound
//! adapters.

mod catalog_repository;
mod event_publisher;
mod order_command;
mod order_query;
mod order_repository;
mod payloads;

#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
pub use catalog_repository::{CatalogRepository, CatalogRepositoryError, FixtureCatalogRepository};
#[cfg(test)]
pub use event_publisher::MockOrderEventPublisher;
pub use event_publisher::{FixtureOrderEventPublisher, OrderEventPublisher, PublisherError};
#[cfg(test)]
pub use order_command::MockOrderCommand;
pub use order_command::{
    CompleteOrderRequest, CompleteOrderResponse, OrderCommand, SubmitOrderRequest,
    SubmitOrderResponse,
};
#[cfg(test)]
pub use order_query::MockOrderQuery;
pub use order_query::{ListPendingOrdersRequest, ListPendingOrdersResponse, OrderQuery};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{
    CompletionOutcome, FixtureOrderRepository, OrderRepository, OrderRepositoryError,
};
pub use payloads::{OrderLinePayload, OrderPayload};
