//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Domain conversions live in the repository adapters.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::{items, order_items, orders};

/// Row struct for reading from the items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: String,
    pub name: String,
    pub unit_price: Decimal,
}

/// Insertable struct for seeding catalog items.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub unit_price: Decimal,
}

/// Row struct for reading order headers.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: String,
    pub owner_ref: String,
    pub placed_at: DateTime<Utc>,
    pub status: String,
}

/// Insertable struct for creating order headers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub id: &'a str,
    pub owner_ref: &'a str,
    pub placed_at: DateTime<Utc>,
    pub status: &'a str,
}

/// Insertable struct for creating order lines.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub(crate) struct NewOrderLineRow<'a> {
    pub order_id: &'a str,
    pub item_id: &'a str,
    pub quantity: i32,
    pub unit_price: Decimal,
}
