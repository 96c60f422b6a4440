//! # ud-core: Pure Business Logic for UD Ledger
//!
//! This crate is the **heart** of UD Ledger. It contains the transaction
//! rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        UD Ledger Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    API layer (out of workspace)                 │   │
//! │  │    routing, tokens, sessions ──► Actor { id, role }             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ud-engine (services)                         │   │
//! │  │    create/update/complete/cancel, periods, catalog, summaries   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ud-core (THIS CRATE) ★                          │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ pricing  │ │aggregate │ │lifecycle │ │  period  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │   code   │ │  types   │ │  money   │ │validation│          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ud-db (Database Layer)                       │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (TradingUnit, Goods, Period, Transaction, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Line subtotals and profit
//! - [`aggregate`] - Header totals from line items
//! - [`lifecycle`] - Draft/completed/cancelled state machine
//! - [`period`] - Period guard and date range rule
//! - [`code`] - Identity code prefixes and sequence numbers
//! - [`page`] - Pagination
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation
//!
//! ## Example Usage
//!
//! ```rust
//! use ud_core::money::Money;
//! use ud_core::pricing;
//!
//! let line = pricing::compute("goods-a", Money::from_amount(10_000), Money::from_amount(6_000), 3).unwrap();
//! assert_eq!(line.profit.amount(), 12_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod code;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod page;
pub mod period;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::Totals;
pub use code::CodeScope;
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use lifecycle::Transition;
pub use money::Money;
pub use page::{Page, PageRequest};
pub use pricing::LinePricing;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Abbreviation used when a trading unit name yields no letters.
pub const DEFAULT_TRADING_UNIT_ABBR: &str = "UDX";

/// Abbreviation used when a kitchen name yields no letters.
pub const DEFAULT_KITCHEN_ABBR: &str = "DPR";

/// Minimum digits in the numeric part of a generated code.
pub const SEQUENCE_WIDTH: usize = 3;

/// Longest accepted display name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Page size when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Upper bound on page size.
pub const MAX_PAGE_LIMIT: u32 = 100;
