//! Drink catalog reference data.
//!
//! Catalog items are immutable: an id, a display name, and a unit price.
//! Orders capture the unit price at submission time, so later catalog
//! edits never rewrite history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a catalog item (e.g. `small_beer`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap a raw item identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Validation failures raised by [`CatalogItem::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogValidationError {
    /// Unit prices must not be negative.
    #[error("unit price for item {item_id} must not be negative")]
    NegativePrice {
        /// Offending item id.
        item_id: ItemId,
    },
}

/// A single priced item in the drink catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    id: ItemId,
    name: String,
    unit_price: Decimal,
}

impl CatalogItem {
    /// Build a catalog item, rejecting negative prices.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        unit_price: Decimal,
    ) -> Result<Self, CatalogValidationError> {
        if unit_price.is_sign_negative() {
            return Err(CatalogValidationError::NegativePrice { item_id: id });
        }
        Ok(Self {
            id,
            name: name.into(),
            unit_price,
        })
    }

    /// Item identifier.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Human-readable display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Unit price in the venue currency.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

/// The fixed drink list seeded into storage at startup.
///
/// Seeding is insert-if-absent, so running it on every boot never
/// duplicates rows or rewrites prices.
pub fn default_catalog() -> Vec<CatalogItem> {
    [
        ("small_beer", "Small Beer", Decimal::new(270, 2)),
        ("large_beer", "Large Beer", Decimal::new(320, 2)),
        ("whiskey", "Whiskey", Decimal::new(300, 2)),
        ("wine", "Wine", Decimal::new(400, 2)),
        ("vodka", "Vodka", Decimal::new(250, 2)),
        ("borovicka", "Borovicka", Decimal::new(200, 2)),
    ]
    .into_iter()
    .filter_map(|(id, name, price)| CatalogItem::new(ItemId::new(id), name, price).ok())
    .collect()
}
