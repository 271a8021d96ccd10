//! Subscriber registry and broadcast fan-out.
//!
//! The hub owns the only mutable state shared across connection tasks:
//! the set of live subscriber sinks. Everything is in-memory with no
//! durability guarantee; subscribers reconnect after a restart.
//!
//! Broadcast snapshots the registry under the lock, delivers outside it
//! (so a slow subscriber never blocks `subscribe`/`unsubscribe`), bounds
//! each send with a timeout, and prunes every failed sink in the same
//! pass without aborting delivery to the rest.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use actix_ws::Session;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::OrderStatusEvent;
use crate::domain::ports::{OrderEventPublisher, PublisherError};
use crate::inbound::ws::messages::ServerEvent;

/// Upper bound on a single subscriber send before the connection is
/// declared dead (shortened in tests).
#[cfg(not(test))]
const SEND_TIMEOUT: Duration = Duration::from_secs(2);
#[cfg(test)]
const SEND_TIMEOUT: Duration = Duration::from_millis(50);

/// Raised by a sink whose peer has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("subscriber connection closed")]
pub struct SinkClosed;

/// Duplex send handle a subscriber is reached through.
///
/// Abstracted from `actix_ws::Session` so the hub can be exercised in
/// tests without sockets.
#[async_trait]
pub trait EventSink: Clone + Send + 'static {
    /// Push one text frame to the subscriber.
    async fn send_text(&mut self, text: &str) -> Result<(), SinkClosed>;
}

#[async_trait]
impl EventSink for Session {
    async fn send_text(&mut self, text: &str) -> Result<(), SinkClosed> {
        self.text(text.to_owned()).await.map_err(|_closed| SinkClosed)
    }
}

/// Opaque handle identifying one live subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hub specialised to real WebSocket sessions.
pub type WsHub = NotificationHub;

/// Process-wide notification hub, injected into handlers as an owned
/// component (never a global).
pub struct NotificationHub<S: EventSink = Session> {
    connections: Mutex<HashMap<ConnectionId, S>>,
    next_id: AtomicU64,
    send_timeout: Duration,
}

impl<S: EventSink> Default for NotificationHub<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> NotificationHub<S> {
    /// Create an empty hub with the default send timeout.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            send_timeout: SEND_TIMEOUT,
        }
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<ConnectionId, S>> {
        // A poisoned registry only means another task panicked mid-update;
        // the map itself is still coherent for membership operations.
        self.connections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a live connection. Non-blocking; returns immediately.
    pub fn subscribe(&self, sink: S) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry().insert(id, sink);
        debug!(connection_id = %id, "subscriber registered");
        id
    }

    /// Remove a connection. Removing an already-absent handle is a no-op.
    pub fn unsubscribe(&self, id: ConnectionId) {
        if self.registry().remove(&id).is_some() {
            debug!(connection_id = %id, "subscriber removed");
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry().len()
    }

    /// Deliver one already-serialized frame to every subscriber.
    ///
    /// Failed or timed-out sinks are unsubscribed as part of this pass;
    /// the lock is never held across a send. Returns the number of
    /// successful deliveries.
    pub async fn broadcast(&self, text: &str) -> usize {
        let snapshot: Vec<(ConnectionId, S)> = self
            .registry()
            .iter()
            .map(|(id, sink)| (*id, sink.clone()))
            .collect();

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, mut sink) in snapshot {
            match tokio::time::timeout(self.send_timeout, sink.send_text(text)).await {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(SinkClosed)) => {
                    warn!(connection_id = %id, "subscriber send failed; dropping connection");
                    dead.push(id);
                }
                Err(_elapsed) => {
                    warn!(connection_id = %id, "subscriber send timed out; dropping connection");
                    dead.push(id);
                }
            }
        }

        if !dead.is_empty() {
            let mut registry = self.registry();
            for id in dead {
                registry.remove(&id);
            }
        }
        delivered
    }
}

#[async_trait]
impl<S: EventSink> OrderEventPublisher for NotificationHub<S> {
    async fn publish(&self, event: OrderStatusEvent) -> Result<usize, PublisherError> {
        // Serialize once per broadcast pass, not per subscriber.
        let text = serde_json::to_string(&ServerEvent::from(event))
            .map_err(|err| PublisherError::encoding(err.to_string()))?;
        Ok(self.broadcast(&text).await)
    }
}
