//! Port for fanning out order status events to live subscribers.
//!
//! Publishing is best-effort: the order service calls it only after the
//! status change has committed, logs failures, and never propagates them
//! to the request that triggered the change.

use async_trait::async_trait;

use crate::domain::order::OrderStatusEvent;

/// Errors raised by event publisher adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublisherError {
    /// The event could not be encoded for the wire.
    #[error("failed to encode status event: {message}")]
    Encoding {
        /// Adapter-level detail.
        message: String,
    },
}

impl PublisherError {
    /// Create an encoding error with the given message.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}

/// Port for broadcasting a status change to every live subscriber.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderEventPublisher: Send + Sync {
    /// Deliver the event to all current subscribers, dropping any whose
    /// connection has died. Returns the number of successful deliveries.
    async fn publish(&self, event: OrderStatusEvent) -> Result<usize, PublisherError>;
}

/// Fixture publisher that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderEventPublisher;

#[async_trait]
impl OrderEventPublisher for FixtureOrderEventPublisher {
    async fn publish(&self, _event: OrderStatusEvent) -> Result<usize, PublisherError> {
        Ok(0)
    }
}
