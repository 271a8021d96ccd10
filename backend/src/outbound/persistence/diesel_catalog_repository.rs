//! PostgreSQL-backed `CatalogRepository` implementation using Diesel ORM.
//!
//! Seeding uses `ON CONFLICT (id) DO NOTHING`, so repeated startup runs
//! never duplicate rows or rewrite prices.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::catalog::{CatalogItem, ItemId};
use crate::domain::ports::{CatalogRepository, CatalogRepositoryError};

use super::models::{ItemRow, NewItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::items;

/// Diesel-backed implementation of the catalog repository port.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CatalogRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            CatalogRepositoryError::connection(info.message().to_owned())
        }
        other => CatalogRepositoryError::query(other.to_string()),
    }
}

fn row_to_item(row: ItemRow) -> Result<CatalogItem, CatalogRepositoryError> {
    CatalogItem::new(ItemId::new(row.id), row.name, row.unit_price)
        .map_err(|err| CatalogRepositoryError::query(err.to_string()))
}

#[async_trait]
impl CatalogRepository for DieselCatalogRepository {
    async fn price_of(&self, item_id: &ItemId) -> Result<Option<Decimal>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        items::table
            .find(item_id.as_str())
            .select(items::unit_price)
            .first::<Decimal>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn resolve(
        &self,
        item_ids: &[ItemId],
    ) -> Result<Vec<CatalogItem>, CatalogRepositoryError> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<&str> = item_ids.iter().map(ItemId::as_str).collect();
        let rows: Vec<ItemRow> = items::table
            .filter(items::id.eq_any(ids))
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_item).collect()
    }

    async fn seed(&self, seed_items: &[CatalogItem]) -> Result<(), CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NewItemRow<'_>> = seed_items
            .iter()
            .map(|item| NewItemRow {
                id: item.id().as_str(),
                name: item.name(),
                unit_price: item.unit_price(),
            })
            .collect();

        let inserted = diesel::insert_into(items::table)
            .values(&rows)
            .on_conflict(items::id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!(seeded = inserted, total = seed_items.len(), "catalog seeded");
        Ok(())
    }
}
