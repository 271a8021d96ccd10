//! Driving ports for order mutations.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::catalog::ItemId;
use crate::domain::order::{OrderId, OrderStatus, OwnerRef};

use super::payloads::OrderPayload;

/// Request to submit a new order.
#[derive(Debug, Clone)]
pub struct SubmitOrderRequest {
    /// Owner identity provided by the auth collaborator, if any.
    pub owner: Option<OwnerRef>,
    /// Item id → quantity. Lines are created in item-id order.
    pub items: BTreeMap<ItemId, u32>,
}

/// Response carrying the created order with computed totals.
#[derive(Debug, Clone)]
pub struct SubmitOrderResponse {
    /// The persisted order.
    pub order: OrderPayload,
}

/// Request to complete a pending order.
#[derive(Debug, Clone, Copy)]
pub struct CompleteOrderRequest {
    /// The order to transition.
    pub order_id: OrderId,
}

/// Acknowledgement of a completion.
#[derive(Debug, Clone, Copy)]
pub struct CompleteOrderResponse {
    /// The transitioned order.
    pub order_id: OrderId,
    /// Always [`OrderStatus::Completed`]; present so acknowledgements
    /// carry the resulting state explicitly.
    pub status: OrderStatus,
}

/// Port for order mutations: submission and completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Validate and persist a new order, capturing catalog prices.
    async fn submit_order(&self, request: SubmitOrderRequest)
    -> Result<SubmitOrderResponse, Error>;

    /// Transition an order pending → completed, then broadcast the change
    /// to live subscribers (best-effort, after commit).
    async fn complete_order(
        &self,
        request: CompleteOrderRequest,
    ) -> Result<CompleteOrderResponse, Error>;
}
