//! Taproom backend library.
//!
//! An order-taking service for a bar: clients submit drink orders, staff
//! mark them completed, and connected clients receive live status updates
//! over WebSocket. Laid out hexagonally: `domain` holds the types, ports,
//! and services; `inbound` the HTTP and WebSocket adapters; `outbound`
//! the PostgreSQL persistence adapters; `server` the wiring.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
