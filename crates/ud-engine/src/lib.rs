//! # ud-engine: Transaction Engine for UD Ledger
//!
//! Orchestrates the pure rules of `ud-core` over the repositories of
//! `ud-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        UD Ledger Layers                                 │
//! │                                                                         │
//! │  API layer (routing, auth, pagination params)                          │
//! │       │  Actor + request                                                │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   ud-engine (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   Engine ──► services ──► guards / lifecycle / aggregation     │   │
//! │  │                 │                                               │   │
//! │  │                 ├──► retry::with_code (code allocation)         │   │
//! │  │                 └──► PostCommitHooks (activity sinks)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ud-db repositories ──► SQLite                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use ud_engine::{Actor, CreateTransaction, Engine, EngineConfig, Role};
//! use ud_core::ItemRequest;
//!
//! let config = EngineConfig::load_or_default(None);
//! ud_engine::telemetry::init_tracing(&config.logging.filter);
//! let engine = Engine::connect(&config).await?;
//!
//! let actor = Actor::new(user_id, Role::UdOperator);
//! let result = engine
//!     .transactions()
//!     .create(&actor, CreateTransaction {
//!         period_id,
//!         kitchen_id,
//!         transaction_date: None,
//!         items: vec![ItemRequest::new(goods_id, 3)],
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod actor;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod retry;
pub mod services;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use actor::{Actor, Capability, Role};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DatabaseSettings, EngineConfig, EngineSettings, LoggingSettings};
pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, EngineResult, ErrorBody};
pub use hooks::{
    ActivityEvent, ActivitySink, DbActivitySink, NoOpSink, PostCommitHooks, SinkError, TracingSink,
};
pub use services::*;

pub use ud_db::{
    ActivityLogFilter, GoodsFilter, KitchenFilter, PeriodFilter, TradingUnitFilter,
    TransactionFilter,
};
