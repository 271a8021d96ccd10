//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.
//!
//! Every operation scopes its own transaction: creation commits the
//! header and all line rows together or not at all, the listing reads a
//! consistent snapshot, and completion disambiguates "already completed"
//! from "never existed" without racing concurrent updates. No transaction
//! is held across anything but database I/O.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use rust_decimal::Decimal;

use crate::domain::catalog::ItemId;
use crate::domain::order::{Order, OrderDraft, OrderId, OrderLine, OrderStatus, OwnerRef};
use crate::domain::ports::{CompletionOutcome, OrderRepository, OrderRepositoryError};

use super::models::{NewOrderLineRow, NewOrderRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::{items, order_items, orders};

/// Joined line row: (order id, item id, display name, quantity, price).
type LineRow = (String, String, String, i32, Decimal);

/// Diesel-backed implementation of the order repository port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            OrderRepositoryError::connection(message)
        }
    }
}

impl From<diesel::result::Error> for OrderRepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                Self::connection(info.message().to_owned())
            }
            other => Self::query(other.to_string()),
        }
    }
}

fn quantity_from_db(raw: i32, order_id: &str) -> Result<u32, OrderRepositoryError> {
    u32::try_from(raw).map_err(|_| {
        OrderRepositoryError::query(format!("order {order_id} has a non-positive quantity"))
    })
}

fn quantity_for_db(line: &OrderLine) -> Result<i32, OrderRepositoryError> {
    i32::try_from(line.quantity()).map_err(|_| {
        OrderRepositoryError::query(format!(
            "quantity for item {} exceeds storage range",
            line.item_id()
        ))
    })
}

/// Join header and line rows fetched by the two listing queries into
/// domain orders, preserving the header ordering (newest first).
fn assemble_orders(
    order_rows: Vec<OrderRow>,
    line_rows: Vec<LineRow>,
) -> Result<Vec<Order>, OrderRepositoryError> {
    let mut lines_by_order: HashMap<String, Vec<OrderLine>> = HashMap::new();
    for (order_id, item_id, name, quantity, unit_price) in line_rows {
        let quantity = quantity_from_db(quantity, &order_id)?;
        let line = OrderLine::new(ItemId::new(item_id), name, quantity, unit_price)
            .map_err(|err| OrderRepositoryError::query(err.to_string()))?;
        lines_by_order.entry(order_id).or_default().push(line);
    }

    order_rows
        .into_iter()
        .map(|row| {
            let OrderRow {
                id,
                owner_ref,
                placed_at,
                status,
            } = row;
            let order_id = id
                .parse::<OrderId>()
                .map_err(|err| OrderRepositoryError::query(format!("order id {id}: {err}")))?;
            let status = status
                .parse::<OrderStatus>()
                .map_err(|err| OrderRepositoryError::query(err.to_string()))?;
            let lines = lines_by_order.remove(&id).unwrap_or_default();

            Order::new(OrderDraft {
                id: order_id,
                owner: OwnerRef::new(owner_ref),
                placed_at,
                status,
                lines,
            })
            .map_err(|err| OrderRepositoryError::query(format!("order {id}: {err}")))
        })
        .collect()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let order_id = order.id().to_string();
        let owner = order.owner().as_str().to_owned();
        let placed_at = order.placed_at();
        let status = order.status().as_str();
        let line_data: Vec<(String, i32, Decimal)> = order
            .lines()
            .iter()
            .map(|line| {
                Ok((
                    line.item_id().as_str().to_owned(),
                    quantity_for_db(line)?,
                    line.unit_price(),
                ))
            })
            .collect::<Result<_, OrderRepositoryError>>()?;

        conn.transaction::<_, OrderRepositoryError, _>(|conn| {
            async move {
                // Verify the referenced items inside the same transaction
                // so an unknown id rolls everything back and is reported
                // as the caller's mistake, not a storage failure.
                let referenced: Vec<String> =
                    line_data.iter().map(|(item_id, _, _)| item_id.clone()).collect();
                let known: Vec<String> = items::table
                    .filter(items::id.eq_any(&referenced))
                    .select(items::id)
                    .load(conn)
                    .await?;
                let missing: Vec<String> = referenced
                    .iter()
                    .filter(|item_id| !known.contains(item_id))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(OrderRepositoryError::unknown_items(missing));
                }

                let header = NewOrderRow {
                    id: order_id.as_str(),
                    owner_ref: owner.as_str(),
                    placed_at,
                    status,
                };
                diesel::insert_into(orders::table)
                    .values(&header)
                    .execute(conn)
                    .await?;

                let rows: Vec<NewOrderLineRow<'_>> = line_data
                    .iter()
                    .map(|(item_id, quantity, unit_price)| NewOrderLineRow {
                        order_id: order_id.as_str(),
                        item_id: item_id.as_str(),
                        quantity: *quantity,
                        unit_price: *unit_price,
                    })
                    .collect();
                diesel::insert_into(order_items::table)
                    .values(&rows)
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_pending(
        &self,
        owner: Option<OwnerRef>,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner_filter = owner.map(|owner| owner.as_str().to_owned());

        let (order_rows, line_rows) = conn
            .transaction::<_, OrderRepositoryError, _>(|conn| {
                async move {
                    let mut headers = orders::table
                        .select(OrderRow::as_select())
                        .filter(orders::status.eq(OrderStatus::Pending.as_str()))
                        .into_boxed();
                    if let Some(owner) = owner_filter {
                        headers = headers.filter(orders::owner_ref.eq(owner));
                    }
                    let order_rows: Vec<OrderRow> = headers
                        .order((orders::placed_at.desc(), orders::id.desc()))
                        .load(conn)
                        .await?;

                    if order_rows.is_empty() {
                        return Ok((order_rows, Vec::new()));
                    }

                    // One batched round trip for every line of every
                    // returned order; joined in memory afterwards.
                    let ids: Vec<String> = order_rows.iter().map(|row| row.id.clone()).collect();
                    let line_rows: Vec<LineRow> = order_items::table
                        .inner_join(items::table)
                        .filter(order_items::order_id.eq_any(&ids))
                        .order((order_items::order_id.asc(), items::name.asc()))
                        .select((
                            order_items::order_id,
                            order_items::item_id,
                            items::name,
                            order_items::quantity,
                            order_items::unit_price,
                        ))
                        .load(conn)
                        .await?;

                    Ok((order_rows, line_rows))
                }
                .scope_boxed()
            })
            .await?;

        assemble_orders(order_rows, line_rows)
    }

    async fn mark_completed(
        &self,
        order_id: &OrderId,
    ) -> Result<CompletionOutcome, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = order_id.to_string();

        conn.transaction::<_, OrderRepositoryError, _>(|conn| {
            async move {
                let updated = diesel::update(
                    orders::table.filter(
                        orders::id
                            .eq(id.as_str())
                            .and(orders::status.eq(OrderStatus::Pending.as_str())),
                    ),
                )
                .set(orders::status.eq(OrderStatus::Completed.as_str()))
                .execute(conn)
                .await?;

                if updated > 0 {
                    return Ok(CompletionOutcome::Completed);
                }

                // Zero rows: either the order is already completed (no-op
                // success) or it never existed.
                let existing: Option<String> = orders::table
                    .find(id.as_str())
                    .select(orders::status)
                    .first(conn)
                    .await
                    .optional()?;
                match existing {
                    Some(_) => Ok(CompletionOutcome::AlreadyCompleted),
                    None => Err(OrderRepositoryError::order_not_found(id.clone())),
                }
            }
            .scope_boxed()
        })
        .await
    }

    async fn purge_completed_older_than(
        &self,
        age: Duration,
    ) -> Result<u64, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let cutoff = Utc::now() - age;

        conn.transaction::<_, OrderRepositoryError, _>(|conn| {
            async move {
                let doomed: Vec<String> = orders::table
                    .filter(
                        orders::status
                            .eq(OrderStatus::Completed.as_str())
                            .and(orders::placed_at.lt(cutoff)),
                    )
                    .select(orders::id)
                    .load(conn)
                    .await?;

                if doomed.is_empty() {
                    return Ok(0);
                }

                diesel::delete(order_items::table.filter(order_items::order_id.eq_any(&doomed)))
                    .execute(conn)
                    .await?;
                let removed =
                    diesel::delete(orders::table.filter(orders::id.eq_any(&doomed)))
                        .execute(conn)
                        .await?;

                Ok(removed as u64)
            }
            .scope_boxed()
        })
        .await
    }
}
