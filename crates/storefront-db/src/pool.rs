//! # Database Handle
//!
//! Opens the SQLite pool the storefront runs on and hands out repositories.
//!
//! ```text
//! StorefrontConfig ──► DbConfig::new(path).max_connections(n)
//!                               │
//!                               ▼
//!                   Database::new(config) ── WAL, foreign keys, busy timeout
//!                               │              then embedded migrations
//!                               ▼
//!            AppState.db ──► categories() products() discounts()
//!                            coupons() carts()
//! ```
//!
//! Catalog reads keep flowing under WAL while a checkout holds the write
//! lock. Writers queue behind one another for up to `busy_timeout`, which is
//! what serializes two redemptions of the same coupon.

use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::cart::CartRepository;
use crate::repository::catalog::{CategoryRepository, ProductRepository};
use crate::repository::coupon::CouponRepository;
use crate::repository::discount::DiscountRepository;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private in-memory database, gone when the pool closes.
    Memory,
}

/// Database settings.
///
/// ```rust,ignore
/// let config = DbConfig::new("./storefront.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,

    /// Pool size. Default: 5
    pub max_connections: u32,

    /// How long a request waits for a free connection. Default: 30s
    pub acquire_timeout: Duration,

    /// How long a writer waits on a locked database. Default: 5s
    pub busy_timeout: Duration,

    /// Apply pending migrations on open. Default: true
    pub migrate: bool,
}

impl DbConfig {
    /// File-backed database, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    /// In-memory database for tests.
    ///
    /// One connection, so every query sees the same database.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
            migrate: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Opens without touching the schema.
    pub fn skip_migrations(mut self) -> Self {
        self.migrate = false;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.location {
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            // WAL does not apply to in-memory databases
            DbLocation::Memory => SqliteConnectOptions::new().in_memory(true),
        };

        options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
    }
}

/// Shared database handle. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = ?config.location, max_connections = config.max_connections, "Opening database");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        if config.migrate {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn discounts(&self) -> DiscountRepository {
        DiscountRepository::new(self.pool.clone())
    }

    /// Lookup, creation and redemption of coupons.
    pub fn coupons(&self) -> CouponRepository {
        CouponRepository::new(self.pool.clone())
    }

    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    /// Closes the pool; later queries fail.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// True when the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
        assert!(db.categories().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_skip_migrations_leaves_schema_empty() {
        let db = Database::new(DbConfig::in_memory().skip_migrations())
            .await
            .unwrap();
        assert!(db.categories().list().await.is_err());
    }

    #[test]
    fn test_builder() {
        let config = DbConfig::new("/tmp/storefront-test.db")
            .max_connections(10)
            .busy_timeout(Duration::from_secs(2));

        assert_eq!(config.location, DbLocation::File(PathBuf::from("/tmp/storefront-test.db")));
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout, Duration::from_secs(2));
        assert!(config.migrate);
    }

    #[tokio::test]
    async fn test_closed_pool_fails_health_check() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }
}
