//! # Repository Module
//!
//! Database repository implementations for UD Ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  ud-engine service                                                     │
//! │       │                                                                 │
//! │       │  db.transactions().update_draft(&header, Some(&items))          │
//! │       ▼                                                                 │
//! │  TransactionRepository                                                 │
//! │  ├── insert_with_items(&self, header, items)                           │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── get_items(&self, id)                                              │
//! │  └── update_draft(&self, header, items)                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories enforce storage facts only (existence, uniqueness,       │
//! │  atomicity). Business rules live in ud-core and ud-engine.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TradingUnitRepository`](trading_unit::TradingUnitRepository) - UD records and code lookup
//! - [`KitchenRepository`](kitchen::KitchenRepository) - Kitchens and code lookup
//! - [`GoodsRepository`](goods::GoodsRepository) - Goods catalog
//! - [`PeriodRepository`](period::PeriodRepository) - Accounting periods
//! - [`TransactionRepository`](transaction::TransactionRepository) - Headers, line items, summaries
//! - [`ActivityLogRepository`](activity_log::ActivityLogRepository) - Activity log rows

pub mod activity_log;
pub mod goods;
pub mod kitchen;
pub mod period;
pub mod trading_unit;
pub mod transaction;

use sqlx::SqlitePool;

use crate::error::DbResult;

/// Highest `code` in `table` that starts with `prefix`.
///
/// Longer codes rank first, so `-1000` beats `-999` once a sequence outgrows
/// its padding. Within one width the order is lexicographic.
///
/// `table` is always a literal from this crate, never caller input.
pub(crate) async fn latest_code(
    pool: &SqlitePool,
    table: &'static str,
    prefix: &str,
) -> DbResult<Option<String>> {
    let sql = format!(
        "SELECT code FROM {table} \
         WHERE substr(code, 1, length(?1)) = ?1 \
         ORDER BY length(code) DESC, code DESC LIMIT 1"
    );

    let code: Option<String> = sqlx::query_scalar(&sql)
        .bind(prefix)
        .fetch_optional(pool)
        .await?;

    Ok(code)
}

/// `%term%` for LIKE filters.
pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}

// =============================================================================
// Test Fixtures
// =============================================================================
