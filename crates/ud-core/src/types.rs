//! # Domain Types
//!
//! Core domain types used throughout UD Ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  TradingUnit    │   │     Goods       │   │    Kitchen      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  trading_unit_id│   │  id (UUID)      │       │
//! │  │  code UD-XXX-n  │   │  sale_price     │   │  code DAPUR-..  │       │
//! │  │  name           │   │  cost_price     │   │  name           │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │           ▲                     ▲                     │                 │
//! │           │ (denormalized)      │                     ▼                 │
//! │  ┌────────┴────────┐   ┌────────┴────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │──►│   Transaction   │◄──│     Period      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  quantity       │   │  code TRX-..    │   │  start / end    │       │
//! │  │  price snapshot │   │  status         │   │  is_closed      │       │
//! │  │  subtotals      │   │  totals         │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every coded entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `code`: generated, human-readable, unique, never reassigned

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Trading Unit
// =============================================================================

/// A small trading unit (UD) that owns a goods catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TradingUnit {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Generated identity code (`UD-UDM-001`). Immutable once assigned.
    pub code: String,

    pub name: String,
    pub address: Option<String>,
    pub owner_name: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,

    /// KBLI business classification codes.
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub kbli: Vec<String>,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Kitchen
// =============================================================================

/// A fulfillment kitchen/location (Dapur). Referenced by transaction headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Kitchen {
    pub id: String,

    /// Generated identity code (`DAPUR-DPS-001`).
    pub code: String,

    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Goods
// =============================================================================

/// Unit of measure for goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    #[default]
    Piece,
    Kg,
    Liter,
    Box,
    Tray,
    Gallon,
    Unit,
}

impl UnitOfMeasure {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Piece => "piece",
            UnitOfMeasure::Kg => "kg",
            UnitOfMeasure::Liter => "liter",
            UnitOfMeasure::Box => "box",
            UnitOfMeasure::Tray => "tray",
            UnitOfMeasure::Gallon => "gallon",
            UnitOfMeasure::Unit => "unit",
        }
    }
}

/// A catalog item owned by a trading unit.
///
/// Prices may change at any time. Line items snapshot them at creation, so
/// a change here never rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Goods {
    pub id: String,

    /// Owning trading unit.
    pub trading_unit_id: String,

    pub name: String,
    pub unit: UnitOfMeasure,
    pub sale_price: Money,

    /// Defaults to zero when not supplied.
    pub cost_price: Money,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Period
// =============================================================================

/// An accounting period (Periode).
///
/// ## Rules
/// - `end_date > start_date`
/// - `is_closed` is monotonic: once true it never reverts
/// - A closed period rejects transaction creation and mutation, and its own
///   update/deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Period {
    pub id: String,
    pub name: String,

    #[ts(as = "String")]
    pub start_date: NaiveDate,

    #[ts(as = "String")]
    pub end_date: NaiveDate,

    pub is_active: bool,
    pub is_closed: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Period {
    /// Checks if a date falls within the period (inclusive on both ends).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// Status of a transaction.
///
/// ## State Machine
/// ```text
///                ┌───────────┐
///  create ──────►│   Draft   │◄──── update (items / header)
///                └─────┬─────┘
///                      │
///          ┌───────────┴───────────┐
///          │ complete              │ cancel
///          ▼                       ▼
///   ┌─────────────┐  cancel  ┌─────────────┐
///   │  Completed  │─────────►│  Cancelled  │  (terminal)
///   └─────────────┘          └─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Items may still be replaced.
    #[default]
    Draft,
    /// Items are frozen; totals were recomputed from persisted items.
    Completed,
    /// Terminal. Items and totals are left as they were.
    Cancelled,
}

impl TransactionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Draft => "draft",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A transaction header (Transaksi).
///
/// `total_profit` always equals `total_sale - total_cost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,

    /// Date-scoped sequence code (`TRX-20250115-001`).
    pub code: String,

    pub period_id: String,
    pub kitchen_id: String,

    #[ts(as = "String")]
    pub transaction_date: NaiveDate,

    pub status: TransactionStatus,

    /// Actor who created the transaction.
    pub created_by: String,

    pub total_sale: Money,
    pub total_cost: Money,
    pub total_profit: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Line Item
// =============================================================================

/// A priced line of a transaction (TransaksiDetail).
///
/// Prices are snapshots taken from the goods record when the item was
/// created. `trading_unit_id` is copied from the goods at the same moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub transaction_id: String,
    pub goods_id: String,
    pub trading_unit_id: String,

    /// Zero-based position within the transaction.
    pub position: i64,

    pub quantity: i64,
    pub sale_price: Money,
    pub cost_price: Money,
    pub subtotal_sale: Money,
    pub subtotal_cost: Money,
    pub profit: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One requested line: which goods and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemRequest {
    pub goods_id: String,
    pub quantity: i64,
}

impl ItemRequest {
    pub fn new(goods_id: impl Into<String>, quantity: i64) -> Self {
        ItemRequest {
            goods_id: goods_id.into(),
            quantity,
        }
    }
}

/// A requested line that was not inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SkippedItem {
    /// Zero-based index in the request list.
    pub index: usize,
    pub goods_id: String,
    pub reason: SkipReason,
}

/// Why a requested line was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    GoodsNotFound,
}

/// A transaction header together with its ordered line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub items: Vec<LineItem>,
}

// =============================================================================
// Activity Log
// =============================================================================

/// What kind of mutation an activity entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
}

/// Which area of the system an activity entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ActivityModule {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ud"))]
    #[serde(rename = "ud")]
    TradingUnit,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "barang"))]
    #[serde(rename = "barang")]
    Goods,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "dapur"))]
    #[serde(rename = "dapur")]
    Kitchen,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "periode"))]
    #[serde(rename = "periode")]
    Period,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "transaksi"))]
    #[serde(rename = "transaksi")]
    Transaction,
}

/// A persisted activity log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ActivityLogEntry {
    pub id: String,
    pub actor_id: String,
    pub action: ActivityAction,
    pub module: ActivityModule,
    pub description: String,
    pub target_id: Option<String>,

    /// Free-form JSON, stored as text.
    pub metadata: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Summaries
// =============================================================================

/// Counts of active reference data plus completed-transaction totals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerSummary {
    pub trading_units: i64,
    pub goods: i64,
    pub kitchens: i64,
    pub periods: i64,
    pub completed_transactions: i64,
    pub total_sale: Money,
    pub total_cost: Money,
    pub total_profit: Money,
}

/// Sales of one trading unit over completed transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TradingUnitSales {
    pub trading_unit_id: String,
    pub code: String,
    pub name: String,
    pub total_quantity: i64,
    pub total_sale: Money,
    pub total_cost: Money,
    pub total_profit: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(TransactionStatus::default(), TransactionStatus::Draft);
        assert_eq!(TransactionStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_unit_of_measure_default_and_names() {
        assert_eq!(UnitOfMeasure::default(), UnitOfMeasure::Piece);
        let parsed: UnitOfMeasure = serde_json::from_str("\"gallon\"").unwrap();
        assert_eq!(parsed, UnitOfMeasure::Gallon);
        assert_eq!(UnitOfMeasure::Box.as_str(), "box");
    }

    #[test]
    fn test_activity_module_uses_short_names() {
        assert_eq!(
            serde_json::to_string(&ActivityModule::Kitchen).unwrap(),
            "\"dapur\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityModule::TradingUnit).unwrap(),
            "\"ud\""
        );
    }

    #[test]
    fn test_period_contains() {
        let now = Utc::now();
        let period = Period {
            id: "p".into(),
            name: "January".into(),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
            is_active: true,
            is_closed: false,
            created_at: now,
            updated_at: now,
        };
        assert!(period.contains(date(2025, 1, 1)));
        assert!(period.contains(date(2025, 1, 31)));
        assert!(!period.contains(date(2025, 2, 1)));
    }
}
