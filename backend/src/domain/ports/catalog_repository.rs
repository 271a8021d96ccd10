//! Port for read-only catalog lookups and idempotent seeding.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::catalog::{CatalogItem, ItemId};

/// Errors raised by catalog repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogRepositoryError {
    /// Repository connection could not be established.
    #[error("catalog repository connection failed: {message}")]
    Connection {
        /// Adapter-level detail, logged but never shown to callers.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("catalog repository query failed: {message}")]
    Query {
        /// Adapter-level detail, logged but never shown to callers.
        message: String,
    },
}

impl CatalogRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for resolving item prices and seeding the reference data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Look up the unit price of a single item. `None` when unknown.
    async fn price_of(&self, item_id: &ItemId) -> Result<Option<Decimal>, CatalogRepositoryError>;

    /// Resolve a batch of item ids in one round trip. Unknown ids are
    /// simply absent from the result; callers decide whether that is an
    /// error.
    async fn resolve(&self, item_ids: &[ItemId])
    -> Result<Vec<CatalogItem>, CatalogRepositoryError>;

    /// Seed the catalog with insert-if-absent semantics: repeated runs
    /// never duplicate rows or change existing prices.
    async fn seed(&self, items: &[CatalogItem]) -> Result<(), CatalogRepositoryError>;
}

/// Fixture implementation backed by nothing; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogRepository;

#[async_trait]
impl CatalogRepository for FixtureCatalogRepository {
    async fn price_of(&self, _item_id: &ItemId) -> Result<Option<Decimal>, CatalogRepositoryError> {
        Ok(None)
    }

    async fn resolve(
        &self,
        _item_ids: &[ItemId],
    ) -> Result<Vec<CatalogItem>, CatalogRepositoryError> {
        Ok(Vec::new())
    }

    async fn seed(&self, _items: &[CatalogItem]) -> Result<(), CatalogRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_lookups_miss() {
        let repo = FixtureCatalogRepository;
        let price = repo
            .price_of(&ItemId::new("wine"))
            .await
            .expect("fixture lookup succeeds");
        assert!(price.is_none());
    }

    #[rstest]
    fn error_constructors_preserve_messages() {
        assert!(
            CatalogRepositoryError::connection("refused")
                .to_string()
                .contains("refused")
        );
        assert!(
            CatalogRepositoryError::query("syntax")
                .to_string()
                .contains("syntax")
        );
    }
}
