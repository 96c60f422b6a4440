//! # Engine
//!
//! The handle callers hold. It owns the database, the clock, the activity
//! hooks and the engine switches, and hands out one service per area.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Engine                                                                 │
//! │  ├── trading_units()  → TradingUnitService                             │
//! │  ├── kitchens()       → KitchenService                                 │
//! │  ├── goods()          → GoodsService                                   │
//! │  ├── periods()        → PeriodService                                  │
//! │  ├── transactions()   → TransactionService                             │
//! │  └── dashboard()      → DashboardService                               │
//! │                                                                         │
//! │  All services share one Arc<EngineContext>; cloning is cheap.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use ud_core::{period as period_guard, Kitchen, Period, TradingUnit};
use ud_db::Database;

use crate::clock::{Clock, SystemClock};
use crate::config::{EngineConfig, EngineSettings};
use crate::error::{EngineError, EngineResult};
use crate::hooks::{ActivityEvent, ActivitySink, DbActivitySink, PostCommitHooks};
use crate::services::{
    DashboardService, GoodsService, KitchenService, PeriodService, TradingUnitService,
    TransactionService,
};

// =============================================================================
// Shared Context
// =============================================================================

/// State shared by every service.
pub(crate) struct EngineContext {
    pub(crate) db: Database,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) hooks: PostCommitHooks,
    pub(crate) settings: EngineSettings,
}

impl EngineContext {
    pub(crate) async fn period(&self, id: &str) -> EngineResult<Period> {
        self.db
            .periods()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Period", id))
    }

    /// Loads a period and runs the period guard on it.
    pub(crate) async fn open_period(&self, id: &str) -> EngineResult<Period> {
        let period = self.period(id).await?;
        period_guard::assert_open(&period)?;
        Ok(period)
    }

    pub(crate) async fn kitchen(&self, id: &str) -> EngineResult<Kitchen> {
        self.db
            .kitchens()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Kitchen", id))
    }

    pub(crate) async fn trading_unit(&self, id: &str) -> EngineResult<TradingUnit> {
        self.db
            .trading_units()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Trading unit", id))
    }

    pub(crate) async fn notify(&self, event: ActivityEvent) {
        self.hooks.notify(event).await;
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Entry point of the transaction engine.
///
/// ## Usage
/// ```rust,ignore
/// let engine = Engine::connect(&EngineConfig::load_or_default(None)).await?;
/// let created = engine.transactions().create(&actor, request).await?;
/// let done = engine.transactions().complete(&actor, &created.detail.transaction.id).await?;
/// ```
#[derive(Clone)]
pub struct Engine {
    ctx: Arc<EngineContext>,
}

impl Engine {
    /// Starts building an engine over an open database.
    pub fn builder(db: Database) -> EngineBuilder {
        EngineBuilder::new(db)
    }

    /// Opens the configured database and records activity into it.
    pub async fn connect(config: &EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let db = Database::new(config.to_db_config()).await?;

        info!(
            path = ?config.database.path,
            guard_completion = config.engine.guard_completion,
            "Engine connected"
        );

        Ok(Engine::builder(db)
            .settings(config.engine.clone())
            .record_activity(true)
            .build())
    }

    pub fn trading_units(&self) -> TradingUnitService {
        TradingUnitService::new(self.ctx.clone())
    }

    pub fn kitchens(&self) -> KitchenService {
        KitchenService::new(self.ctx.clone())
    }

    pub fn goods(&self) -> GoodsService {
        GoodsService::new(self.ctx.clone())
    }

    pub fn periods(&self) -> PeriodService {
        PeriodService::new(self.ctx.clone())
    }

    pub fn transactions(&self) -> TransactionService {
        TransactionService::new(self.ctx.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.ctx.clone())
    }

    pub fn database(&self) -> &Database {
        &self.ctx.db
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.ctx.settings
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.ctx.settings)
            .field("hooks", &self.ctx.hooks)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Engine`].
///
/// ## Example
/// ```rust,ignore
/// let engine = Engine::builder(db)
///     .clock(Arc::new(FixedClock::new(at)))
///     .sink(Arc::new(TracingSink))
///     .record_activity(true)
///     .build();
/// ```
pub struct EngineBuilder {
    db: Database,
    clock: Arc<dyn Clock>,
    hooks: PostCommitHooks,
    settings: EngineSettings,
    record_activity: bool,
}

impl EngineBuilder {
    fn new(db: Database) -> Self {
        EngineBuilder {
            db,
            clock: Arc::new(SystemClock),
            hooks: PostCommitHooks::new(),
            settings: EngineSettings::default(),
            record_activity: false,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Adds a post-commit sink. Sinks run in the order they were added.
    pub fn sink(mut self, sink: Arc<dyn ActivitySink>) -> Self {
        self.hooks.push(sink);
        self
    }

    /// Longest wait on any one sink before its event is dropped.
    pub fn sink_timeout(mut self, timeout: Duration) -> Self {
        self.hooks.set_timeout(timeout);
        self
    }

    /// Appends a sink writing to `activity_logs`, after any added sinks.
    pub fn record_activity(mut self, enabled: bool) -> Self {
        self.record_activity = enabled;
        self
    }

    pub fn build(self) -> Engine {
        let mut hooks = self.hooks;
        if self.record_activity {
            hooks.push(Arc::new(DbActivitySink::new(
                self.db.activity_logs(),
                self.clock.clone(),
            )));
        }

        Engine {
            ctx: Arc::new(EngineContext {
                db: self.db,
                clock: self.clock,
                hooks,
                settings: self.settings,
            }),
        }
    }
}
