//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Thin adapters only: repository implementations translate between
//! Diesel row structs and domain types, with no business logic. Row
//! structs (`models.rs`) and table definitions (`schema.rs`) stay
//! internal to this module. Connections come from a `bb8` pool through
//! `diesel-async`, and every database error is mapped into the owning
//! port's error type.

mod diesel_catalog_repository;
mod diesel_order_repository;
mod models;
mod pool;
mod schema;

pub use diesel_catalog_repository::DieselCatalogRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use pool::{DbPool, PoolError, PoolOptions};
