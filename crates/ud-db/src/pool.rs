//! # Ledger Store Handle
//!
//! Opens the SQLite store behind the ledger and hands out repositories.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig ──► Database::new ──► migrations ──► SqlitePool               │
//! │                                                   │                     │
//! │            ┌──────────────┬──────────────┬────────┴─────┬────────────┐  │
//! │            ▼              ▼              ▼              ▼            ▼  │
//! │      trading_units     kitchens        goods         periods   transactions
//! │                                                                 + line_items
//! │                                                       activity_logs     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository is a clone of the same pool. A store call borrows one
//! connection; item replacement borrows one for the span of its SQLite
//! transaction.
//!
//! File stores run in WAL mode with foreign keys on. The `:memory:` store is
//! pinned to a single connection that never expires, since the data lives
//! and dies with it.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::activity_log::ActivityLogRepository;
use crate::repository::goods::GoodsRepository;
use crate::repository::kitchen::KitchenRepository;
use crate::repository::period::PeriodRepository;
use crate::repository::trading_unit::TradingUnitRepository;
use crate::repository::transaction::TransactionRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// How to open the store.
///
/// ```rust,ignore
/// let config = DbConfig::new("./ud-ledger.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub min_connections: u32,

    /// Longest wait for a free connection before a call fails.
    pub acquire_timeout: Duration,

    /// `None` keeps idle connections open.
    pub idle_timeout: Option<Duration>,

    pub run_migrations: bool,
}

impl DbConfig {
    /// File store with 1..=5 connections, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Isolated throwaway store, used by tests and the `:memory:` setting.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map(|options| options.foreign_keys(true))
                .map_err(|e| DbError::ConnectionFailed(e.to_string()));
        }

        Ok(SqliteConnectOptions::new()
            .filename(&self.database_path)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the ledger store. Clones share one pool.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::in_memory()).await?;
/// let open = db.periods().get_by_id(&period_id).await?;
/// let lines = db.transactions().get_items(&transaction_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening ledger store");

        let options = config.connect_options()?;
        let in_memory = config.is_in_memory();

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout);
        if in_memory {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(in_memory, max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Ledger schema up to date");
        Ok(())
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn trading_units(&self) -> TradingUnitRepository {
        TradingUnitRepository::new(self.pool.clone())
    }

    pub fn kitchens(&self) -> KitchenRepository {
        KitchenRepository::new(self.pool.clone())
    }

    pub fn goods(&self) -> GoodsRepository {
        GoodsRepository::new(self.pool.clone())
    }

    pub fn periods(&self) -> PeriodRepository {
        PeriodRepository::new(self.pool.clone())
    }

    /// Headers and line items.
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone())
    }

    pub fn activity_logs(&self) -> ActivityLogRepository {
        ActivityLogRepository::new(self.pool.clone())
    }

    /// Closes every connection. Later calls on any clone fail.
    pub async fn close(&self) {
        info!("Closing ledger store");
        self.pool.close().await;
    }

    /// True when the store still answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);

        let periods: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM periods")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(periods, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/ud-ledger.db")
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(3))
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_closed_store_fails_health_check() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let clone = db.clone();
        db.close().await;
        assert!(!clone.health_check().await);
    }
}
