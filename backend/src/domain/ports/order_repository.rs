//! Port for transactional order persistence.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::order::{Order, OrderId, OwnerRef};

/// Errors raised by order repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderRepositoryError {
    /// Repository connection could not be established.
    #[error("order repository connection failed: {message}")]
    Connection {
        /// Adapter-level detail, logged but never shown to callers.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("order repository query failed: {message}")]
    Query {
        /// Adapter-level detail, logged but never shown to callers.
        message: String,
    },
    /// One or more line items reference ids the catalog does not know.
    /// Distinguished from storage failure so callers can report it as
    /// their own mistake.
    #[error("unknown item ids: {ids:?}")]
    UnknownItems {
        /// The offending item ids.
        ids: Vec<String>,
    },
    /// The referenced order does not exist.
    #[error("order {id} does not exist")]
    OrderNotFound {
        /// The missing order id.
        id: String,
    },
}

impl OrderRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create an unknown-items error naming the offending ids.
    pub fn unknown_items(ids: Vec<String>) -> Self {
        Self::UnknownItems { ids }
    }

    /// Create a not-found error for the given order id.
    pub fn order_not_found(id: impl Into<String>) -> Self {
        Self::OrderNotFound { id: id.into() }
    }
}

/// Result of a completion attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The order transitioned pending → completed.
    Completed,
    /// The order was already completed; the call was a no-op.
    AlreadyCompleted,
}

/// Port for writing and reading order aggregates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist an order and all of its lines atomically: either every row
    /// commits or none do.
    async fn create(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    /// List pending orders, optionally scoped to one owner, newest first.
    /// An empty result is `Ok(vec![])`, never an error.
    async fn list_pending(
        &self,
        owner: Option<OwnerRef>,
    ) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Transition an order to completed. Completing an order twice is a
    /// no-op reported as [`CompletionOutcome::AlreadyCompleted`].
    async fn mark_completed(
        &self,
        order_id: &OrderId,
    ) -> Result<CompletionOutcome, OrderRepositoryError>;

    /// Delete completed orders older than `age`. Returns the number of
    /// orders removed. Pending orders are never touched.
    async fn purge_completed_older_than(&self, age: Duration)
    -> Result<u64, OrderRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderRepository;

#[async_trait]
impl OrderRepository for FixtureOrderRepository {
    async fn create(&self, _order: &Order) -> Result<(), OrderRepositoryError> {
        Ok(())
    }

    async fn list_pending(
        &self,
        _owner: Option<OwnerRef>,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        Ok(Vec::new())
    }

    async fn mark_completed(
        &self,
        order_id: &OrderId,
    ) -> Result<CompletionOutcome, OrderRepositoryError> {
        Err(OrderRepositoryError::order_not_found(order_id.to_string()))
    }

    async fn purge_completed_older_than(
        &self,
        _age: Duration,
    ) -> Result<u64, OrderRepositoryError> {
        Ok(0)
    }
}
