//! Order domain services.
//!
//! `OrderCommandService` validates submissions against the catalog,
//! delegates atomic persistence to the order repository, and broadcasts
//! status changes through the event publisher once the completion has
//! committed. `OrderQueryService` serves the pending-order listing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::domain::Error;
use crate::domain::catalog::{CatalogItem, ItemId};
use crate::domain::order::{
    Order, OrderDraft, OrderId, OrderLine, OrderStatus, OrderStatusEvent, OwnerRef,
};
use crate::domain::ports::{
    CatalogRepository, CatalogRepositoryError, CompleteOrderRequest, CompleteOrderResponse,
    CompletionOutcome, ListPendingOrdersRequest, ListPendingOrdersResponse, OrderCommand,
    OrderEventPublisher, OrderPayload, OrderQuery, OrderRepository, OrderRepositoryError,
    SubmitOrderRequest, SubmitOrderResponse,
};

fn map_catalog_error(error: CatalogRepositoryError) -> Error {
    error!(error = %error, "catalog repository failure");
    match error {
        CatalogRepositoryError::Connection { .. } => {
            Error::service_unavailable("catalog unavailable")
        }
        CatalogRepositoryError::Query { .. } => Error::internal("catalog lookup failed"),
    }
}

fn map_order_repository_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { .. } => {
            error!(error = %error, "order repository failure");
            Error::service_unavailable("order storage unavailable")
        }
        OrderRepositoryError::Query { .. } => {
            error!(error = %error, "order repository failure");
            Error::internal("order storage failed")
        }
        OrderRepositoryError::UnknownItems { ids } => {
            Error::invalid_request("unknown item ids").with_details(json!({
                "unknownItemIds": ids,
            }))
        }
        OrderRepositoryError::OrderNotFound { id } => {
            Error::not_found(format!("order {id} not found"))
        }
    }
}

/// Order service implementing the mutation driving port.
#[derive(Clone)]
pub struct OrderCommandService {
    catalog: Arc<dyn CatalogRepository>,
    orders: Arc<dyn OrderRepository>,
    publisher: Arc<dyn OrderEventPublisher>,
}

impl OrderCommandService {
    /// Create a command service over its driven ports.
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        orders: Arc<dyn OrderRepository>,
        publisher: Arc<dyn OrderEventPublisher>,
    ) -> Self {
        Self {
            catalog,
            orders,
            publisher,
        }
    }

    /// Validate quantities and resolve catalog prices into order lines.
    ///
    /// All offending ids are collected before failing so the caller sees
    /// the whole problem at once, and storage is never touched on the
    /// validation path.
    async fn build_lines(&self, items: &BTreeMap<ItemId, u32>) -> Result<Vec<OrderLine>, Error> {
        let zero_quantity: Vec<&str> = items
            .iter()
            .filter(|(_, quantity)| **quantity == 0)
            .map(|(id, _)| id.as_str())
            .collect();
        if !zero_quantity.is_empty() {
            return Err(
                Error::invalid_request("item quantities must be positive").with_details(json!({
                    "field": "items",
                    "zeroQuantityItemIds": zero_quantity,
                })),
            );
        }

        let ids: Vec<ItemId> = items.keys().cloned().collect();
        let resolved: HashMap<ItemId, CatalogItem> = self
            .catalog
            .resolve(&ids)
            .await
            .map_err(map_catalog_error)?
            .into_iter()
            .map(|item| (item.id().clone(), item))
            .collect();

        let mut missing = Vec::new();
        let mut lines = Vec::with_capacity(items.len());
        for (item_id, quantity) in items {
            match resolved.get(item_id) {
                Some(item) => {
                    let line =
                        OrderLine::new(item_id.clone(), item.name(), *quantity, item.unit_price())
                            .map_err(|err| Error::invalid_request(err.to_string()))?;
                    lines.push(line);
                }
                None => missing.push(item_id.as_str().to_owned()),
            }
        }
        if !missing.is_empty() {
            return Err(
                Error::invalid_request("unknown item ids").with_details(json!({
                    "field": "items",
                    "unknownItemIds": missing,
                })),
            );
        }
        Ok(lines)
    }
}

#[async_trait]
impl OrderCommand for OrderCommandService {
    async fn submit_order(
        &self,
        request: SubmitOrderRequest,
    ) -> Result<SubmitOrderResponse, Error> {
        if request.items.is_empty() {
            return Err(
                Error::invalid_request("order contains no items").with_details(json!({
                    "field": "items",
                })),
            );
        }

        let lines = self.build_lines(&request.items).await?;
        let order = Order::new(OrderDraft {
            id: OrderId::generate(),
            owner: request.owner.unwrap_or_else(OwnerRef::anonymous),
            placed_at: Utc::now(),
            status: OrderStatus::Pending,
            lines,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.orders
            .create(&order)
            .await
            .map_err(map_order_repository_error)?;

        debug!(order_id = %order.id(), owner = %order.owner(), "order submitted");
        Ok(SubmitOrderResponse {
            order: OrderPayload::from(&order),
        })
    }

    async fn complete_order(
        &self,
        request: CompleteOrderRequest,
    ) -> Result<CompleteOrderResponse, Error> {
        let outcome = self
            .orders
            .mark_completed(&request.order_id)
            .await
            .map_err(map_order_repository_error)?;

        match outcome {
            CompletionOutcome::Completed => {
                // Commit-then-notify: the broadcast is a side effect of an
                // already-committed change and must never fail the request.
                let event = OrderStatusEvent {
                    order_id: request.order_id,
                    status: OrderStatus::Completed,
                };
                match self.publisher.publish(event).await {
                    Ok(delivered) => {
                        debug!(order_id = %request.order_id, delivered, "order completion broadcast");
                    }
                    Err(publish_error) => {
                        warn!(
                            order_id = %request.order_id,
                            error = %publish_error,
                            "completion committed but broadcast failed"
                        );
                    }
                }
            }
            CompletionOutcome::AlreadyCompleted => {
                debug!(order_id = %request.order_id, "order already completed; no-op");
            }
        }

        Ok(CompleteOrderResponse {
            order_id: request.order_id,
            status: OrderStatus::Completed,
        })
    }
}

/// Order service implementing the read driving port.
#[derive(Clone)]
pub struct OrderQueryService {
    orders: Arc<dyn OrderRepository>,
}

impl OrderQueryService {
    /// Create a query service over the order repository.
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl OrderQuery for OrderQueryService {
    async fn list_pending(
        &self,
        request: ListPendingOrdersRequest,
    ) -> Result<ListPendingOrdersResponse, Error> {
        let orders = self
            .orders
            .list_pending(request.owner)
            .await
            .map_err(map_order_repository_error)?;

        Ok(ListPendingOrdersResponse {
            orders: orders.iter().map(OrderPayload::from).collect(),
        })
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
