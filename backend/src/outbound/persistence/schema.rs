//! Diesel table definitions for the PostgreSQL schema.
//!
//! Schema bootstrapping lives with the deployment tooling; these
//! definitions must match it exactly and exist for compile-time query
//! validation and type-safe SQL generation.

diesel::table! {
    /// Drink catalog reference data, seeded idempotently at startup.
    items (id) {
        /// Primary key: stable item identifier (e.g. `small_beer`).
        id -> Text,
        /// Human-readable display name.
        name -> Text,
        /// Current unit price.
        unit_price -> Numeric,
    }
}

diesel::table! {
    /// Order headers.
    orders (id) {
        /// Primary key: ULID, lexicographically sortable by creation time.
        id -> Text,
        /// Opaque owner reference (user, device, or tab).
        owner_ref -> Text,
        /// Submission timestamp.
        placed_at -> Timestamptz,
        /// Lifecycle state: `pending` or `completed`.
        status -> Text,
    }
}

diesel::table! {
    /// Order lines with the unit price captured at order time.
    order_items (order_id, item_id) {
        /// Owning order.
        order_id -> Text,
        /// Referenced catalog item.
        item_id -> Text,
        /// Ordered quantity (positive).
        quantity -> Int4,
        /// Unit price captured at order time; never re-read from `items`.
        unit_price -> Numeric,
    }
}

diesel::joinable!(order_items -> items (item_id));
diesel::joinable!(order_items -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(items, orders, order_items);
