//! Driving port for order reads.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::order::OwnerRef;

use super::payloads::OrderPayload;

/// Request for the pending-order listing.
#[derive(Debug, Clone, Default)]
pub struct ListPendingOrdersRequest {
    /// Restrict the listing to one owner when set.
    pub owner: Option<OwnerRef>,
}

/// Pending orders, newest first, possibly empty.
#[derive(Debug, Clone)]
pub struct ListPendingOrdersResponse {
    /// Matching orders with computed totals.
    pub orders: Vec<OrderPayload>,
}

/// Port for reading pending orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// List pending orders with line details and totals, newest first.
    async fn list_pending(
        &self,
        request: ListPendingOrdersRequest,
    ) -> Result<ListPendingOrdersResponse, Error>;
}
