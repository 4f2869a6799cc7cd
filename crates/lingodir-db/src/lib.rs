//! # lingodir-db
//!
//! PostgreSQL storage for lingodir.
//!
//! This crate provides:
//! - Connection pool management
//! - [`PgStore`], the PostgreSQL [`DirectoryStore`] implementation
//! - The CSV bulk loader behind the `lingodir-import` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use lingodir_db::{Database, Language};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/lingodir").await?;
//!     db.migrate().await?;
//!
//!     let view = db.service().get("원티드랩", Language::En).await?;
//!     println!("{} has {} tags", view.company_name, view.tags.len());
//!     Ok(())
//! }
//! ```
pub mod import;
pub mod pool;
pub mod store;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use lingodir_core::*;

pub use import::{load_csv, parse_rows, ImportRow, ImportSummary, LoadError};
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use store::{PgStore, PgTx};

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Database context: the pool plus the store built on it.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Directory store sharing the pool.
    pub store: PgStore,
}

impl Database {
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            store: PgStore::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Directory service over this database.
    pub fn service(&self) -> DirectoryService {
        DirectoryService::new(self.store.clone())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Round-trip a trivial query to confirm the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
