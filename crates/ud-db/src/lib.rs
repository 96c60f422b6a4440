//! # ud-db: Database Layer for UD Ledger
//!
//! SQLite persistence for trading units, goods, kitchens, periods,
//! transactions and the activity log, through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        UD Ledger Data Flow                              │
//! │                                                                         │
//! │  ud-engine service (create / update / complete / cancel)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ud-db (THIS CRATE)                          │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ TradingUnit   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Kitchen Goods │    │ 001_initial  │  │   │
//! │  │   │ Connection    │    │ Period        │    │              │  │   │
//! │  │   │ Management    │    │ Transaction   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories do no business checks of their own beyond the guarded
//! writes (`WHERE status = 'draft'`, `WHERE is_closed = 0`); a guard that
//! matches nothing surfaces as [`DbError::NotFound`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ud_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("ud-ledger.db")).await?;
//! let items = db.transactions().get_items(&transaction_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::activity_log::{ActivityLogFilter, ActivityLogRepository};
pub use repository::goods::{GoodsFilter, GoodsRepository};
pub use repository::kitchen::{KitchenFilter, KitchenRepository};
pub use repository::period::{PeriodFilter, PeriodRepository};
pub use repository::trading_unit::{TradingUnitFilter, TradingUnitRepository};
pub use repository::transaction::{CompletedTotals, TransactionFilter, TransactionRepository};
