//! `PostgreSQL` storage for YaMDb.
//!
//! [`PostgresStore`] implements every repository trait of
//! `yamdb-core` with runtime `sqlx` queries over a connection pool.
//! The schema lives in `migrations/` and is embedded with `sqlx::migrate!`.
//!
//! - Uniqueness (usernames, emails, slugs, title names, one review per
//!   author and title) is enforced by `UNIQUE` constraints; a violation is
//!   reported as a field-scoped validation error.
//! - Cascades are declared in the schema: deleting a title removes its
//!   reviews and their comments, deleting a category detaches its titles.
//! - Title ratings are computed by one grouped `AVG` per query, and the
//!   genres of a page of titles are fetched with a single `ANY($1)` lookup.
//!
//! # Example
//!
//! ```no_run
//! use yamdb_postgres::{PoolSettings, PostgresStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresStore::connect("postgres://localhost/yamdb", &PoolSettings::default()).await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
pub mod error;
mod feedback;
mod users;

pub use error::{StorageError, StoreResult};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::future::Future;
use std::time::Duration;
use yamdb_core::YamdbError;
use yamdb_core::repository::{HealthCheck, RepoFuture};

/// Connection pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum number of connections.
    ///
    /// Default: 10
    pub max_connections: u32,
    /// Connections kept open while idle.
    ///
    /// Default: 1
    pub min_connections: u32,
    /// How long to wait for a free connection.
    ///
    /// Default: 30 seconds
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolSettings {
    /// Set the maximum pool size.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the number of idle connections kept open.
    #[must_use]
    pub const fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Set the acquire timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// `PostgreSQL`-backed store.
///
/// Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Open a pool to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if no connection can be established.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.connect_timeout)
            .connect(database_url)
            .await?;
        tracing::info!(
            max_connections = settings.max_connections,
            "PostgreSQL pool connected"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Migration`] if a migration fails.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

/// Box a store query as a repository future.
fn run<'a, T, F>(query: F) -> RepoFuture<'a, T>
where
    F: Future<Output = StoreResult<T>> + Send + 'a,
{
    Box::pin(async move { query.await.map_err(YamdbError::from) })
}

/// Convert a row count to the page metadata type.
fn row_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Convert a page offset or limit to a bind parameter.
fn bind_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl HealthCheck for PostgresStore {
    fn ping(&self) -> RepoFuture<'_, ()> {
        run(async move {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
    }
}
