//! Shared HTTP adapter state.
//!
//! Handlers accept this bundle via `actix_web::web::Data` so they depend
//! only on domain ports and stay testable with deterministic doubles.

use std::sync::Arc;

use crate::domain::ports::{OrderCommand, OrderQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Order mutation port (submit, complete).
    pub orders: Arc<dyn OrderCommand>,
    /// Order read port (pending listing).
    pub orders_query: Arc<dyn OrderQuery>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    pub fn new(orders: Arc<dyn OrderCommand>, orders_query: Arc<dyn OrderQuery>) -> Self {
        Self {
            orders,
            orders_query,
        }
    }
}
