//! bb8-backed connection pool for the Diesel PostgreSQL adapters.
//!
//! Repositories check a connection out per operation and release it on
//! every exit path, so no connection outlives the call that borrowed it.
//! The driver is natively async; nothing here blocks the runtime.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Failure modes of pool construction and checkout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available within the checkout timeout.
    #[error("connection checkout failed: {message}")]
    Checkout {
        /// Driver-level detail, logged but never shown to callers.
        message: String,
    },

    /// The pool itself could not be constructed.
    #[error("pool construction failed: {message}")]
    Build {
        /// Driver-level detail, logged but never shown to callers.
        message: String,
    },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Tuning knobs for [`DbPool::connect_with`].
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// How long a checkout waits before failing.
    pub checkout_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 8,
            checkout_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared handle to the PostgreSQL connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open a pool against `database_url` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the pool cannot be constructed.
    pub async fn connect(database_url: &str) -> Result<Self, PoolError> {
        Self::connect_with(database_url, PoolOptions::default()).await
    }

    /// Open a pool against `database_url` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the pool cannot be constructed.
    pub async fn connect_with(
        database_url: &str,
        options: PoolOptions,
    ) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(options.max_connections)
            .connection_timeout(options.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner })
    }

    /// Borrow a connection for the duration of one repository operation.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when no connection becomes
    /// available within the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
