//! # Transaction Service
//!
//! The transaction lifecycle: create, update, complete, cancel.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create / update                                                        │
//! │     │                                                                   │
//! │     ├─► capability: RecordTransactions                                 │
//! │     ├─► lifecycle check (update only: must be draft)                   │
//! │     ├─► period guard (current period, and the new one when moving)     │
//! │     ├─► price each requested line from the goods record                │
//! │     │      missing goods → skipped and reported                        │
//! │     ├─► recompute header totals from the priced lines                  │
//! │     ├─► write header + items in one database transaction               │
//! │     │      (create: allocate code, retry on conflict)                  │
//! │     └─► post-commit hooks                                              │
//! │                                                                         │
//! │  complete                                                               │
//! │     ├─► lifecycle check (draft → completed)                            │
//! │     ├─► period guard only if engine.guard_completion                   │
//! │     ├─► re-read persisted items, recompute totals                      │
//! │     └─► UPDATE ... WHERE status = 'draft'                              │
//! │                                                                         │
//! │  cancel                                                                 │
//! │     ├─► lifecycle check (anything but cancelled)                       │
//! │     └─► status only; items and totals stay as they were                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ud_core::{
    aggregate, lifecycle, pricing, validation, ActivityAction, ActivityModule, CodeScope, CoreError,
    ItemRequest, LineItem, Page, PageRequest, SkipReason, SkippedItem, Transaction,
    TransactionDetail, TransactionStatus, Transition,
};
use ud_db::{DbError, TransactionFilter};

use crate::actor::{Actor, Capability};
use crate::engine::EngineContext;
use crate::error::{EngineError, EngineResult};
use crate::hooks::ActivityEvent;
use crate::retry;

// =============================================================================
// Requests and Results
// =============================================================================

/// Input of [`TransactionService::create`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTransaction {
    pub period_id: String,
    pub kitchen_id: String,

    /// Defaults to the engine clock's current date.
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,

    #[serde(default)]
    pub items: Vec<ItemRequest>,
}

/// Input of [`TransactionService::update`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTransaction {
    #[serde(default)]
    pub period_id: Option<String>,

    #[serde(default)]
    pub kitchen_id: Option<String>,

    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,

    /// `Some` replaces the whole item set; `Some(vec![])` clears it.
    #[serde(default)]
    pub items: Option<Vec<ItemRequest>>,
}

/// Outcome of a create or update: the stored transaction plus the requested
/// lines that were dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionResult {
    pub detail: TransactionDetail,
    pub skipped: Vec<SkippedItem>,
}

impl TransactionResult {
    pub fn transaction(&self) -> &Transaction {
        &self.detail.transaction
    }
}

#[derive(Debug, Default)]
struct PricedItems {
    items: Vec<LineItem>,
    skipped: Vec<SkippedItem>,
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone)]
pub struct TransactionService {
    ctx: Arc<EngineContext>,
}

impl TransactionService {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        TransactionService { ctx }
    }

    /// Creates a draft, optionally with an initial item set.
    ///
    /// ## Errors
    /// - `NotFound` when the period or kitchen does not exist
    /// - `PeriodClosed` when the period is closed
    /// - `InvalidQuantity` when any requested quantity is not positive
    /// - `DuplicateCode` when every allocation attempt lost a race
    ///
    /// Nothing is written on any of these.
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateTransaction,
    ) -> EngineResult<TransactionResult> {
        actor.require(Capability::RecordTransactions)?;
        validation::validate_required("period_id", &request.period_id)?;
        validation::validate_required("kitchen_id", &request.kitchen_id)?;

        let period = self.ctx.open_period(&request.period_id).await?;
        let kitchen = self.ctx.kitchen(&request.kitchen_id).await?;

        let now = self.ctx.clock.now();
        let date = request.transaction_date.unwrap_or_else(|| self.ctx.clock.today());
        let id = Uuid::new_v4().to_string();

        let priced = self.price_items(&id, &request.items, now).await?;
        let totals = aggregate::recompute(&priced.items)?;

        let draft = Transaction {
            id,
            code: String::new(),
            period_id: period.id,
            kitchen_id: kitchen.id,
            transaction_date: date,
            status: TransactionStatus::Draft,
            created_by: actor.id.clone(),
            total_sale: totals.total_sale,
            total_cost: totals.total_cost,
            total_profit: totals.total_profit,
            created_at: now,
            updated_at: now,
        };

        let repo = self.ctx.db.transactions();
        let items = priced.items.as_slice();
        let header = retry::with_code(
            &CodeScope::transaction(date),
            self.ctx.settings.max_code_attempts,
            |prefix| {
                let repo = repo.clone();
                async move { repo.latest_code(&prefix).await }
            },
            |code| {
                let repo = repo.clone();
                let mut header = draft.clone();
                header.code = code;
                async move {
                    repo.insert_with_items(&header, items).await?;
                    EngineResult::Ok(header)
                }
            },
        )
        .await?;

        info!(
            id = %header.id,
            code = %header.code,
            items = priced.items.len(),
            skipped = priced.skipped.len(),
            total_sale = %header.total_sale,
            "Transaction created"
        );

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Create,
                    ActivityModule::Transaction,
                    format!("Created transaction {}", header.code),
                )
                .target(&header.id)
                .metadata(json!({
                    "code": header.code,
                    "items": priced.items.len(),
                    "skipped": priced.skipped.len(),
                })),
            )
            .await;

        Ok(TransactionResult {
            detail: TransactionDetail {
                transaction: header,
                items: priced.items,
            },
            skipped: priced.skipped,
        })
    }

    /// Updates header fields and/or replaces the item set of a draft.
    ///
    /// ## Errors
    /// - `InvalidTransition` when the transaction is not a draft
    /// - `PeriodClosed` when its period, or the period it moves to, is closed
    /// - `NotFound` for a missing transaction, target period or kitchen
    /// - `InvalidQuantity` when any requested quantity is not positive
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        request: UpdateTransaction,
    ) -> EngineResult<TransactionResult> {
        actor.require(Capability::RecordTransactions)?;

        let mut header = self.load(id).await?;
        lifecycle::check(&header.id, header.status, Transition::Update)?;
        self.ctx.open_period(&header.period_id).await?;

        if let Some(period_id) = request.period_id {
            if period_id != header.period_id {
                self.ctx.open_period(&period_id).await?;
                header.period_id = period_id;
            }
        }
        if let Some(kitchen_id) = request.kitchen_id {
            if kitchen_id != header.kitchen_id {
                self.ctx.kitchen(&kitchen_id).await?;
                header.kitchen_id = kitchen_id;
            }
        }
        if let Some(date) = request.transaction_date {
            header.transaction_date = date;
        }

        let now = self.ctx.clock.now();
        header.updated_at = now;

        let mut skipped = Vec::new();
        let replacement = match request.items {
            Some(requests) => {
                let priced = self.price_items(&header.id, &requests, now).await?;
                aggregate::recompute(&priced.items)?.apply_to(&mut header);
                skipped = priced.skipped;
                Some(priced.items)
            }
            // Stored totals were written with the stored items.
            None => None,
        };

        let repo = self.ctx.db.transactions();
        if let Err(err) = repo.update_draft(&header, replacement.as_deref()).await {
            return Err(self.lost_race(id, Transition::Update, err).await);
        }

        let items = match replacement {
            Some(items) => items,
            None => repo.get_items(id).await?,
        };

        info!(
            id = %header.id,
            items = items.len(),
            skipped = skipped.len(),
            total_sale = %header.total_sale,
            "Transaction updated"
        );

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Update,
                    ActivityModule::Transaction,
                    format!("Updated transaction {}", header.code),
                )
                .target(&header.id),
            )
            .await;

        Ok(TransactionResult {
            detail: TransactionDetail {
                transaction: header,
                items,
            },
            skipped,
        })
    }

    /// Moves a draft to `completed` after recomputing its totals from the
    /// persisted items.
    pub async fn complete(&self, actor: &Actor, id: &str) -> EngineResult<TransactionDetail> {
        actor.require(Capability::RecordTransactions)?;

        let mut header = self.load(id).await?;
        let next = lifecycle::check(&header.id, header.status, Transition::Complete)?;
        if self.ctx.settings.guard_completion {
            self.ctx.open_period(&header.period_id).await?;
        }

        let repo = self.ctx.db.transactions();
        let items = repo.get_items(id).await?;
        let totals = aggregate::recompute(&items)?;
        let now = self.ctx.clock.now();

        if let Err(err) = repo.complete(id, &totals, now).await {
            return Err(self.lost_race(id, Transition::Complete, err).await);
        }

        totals.apply_to(&mut header);
        header.status = next;
        header.updated_at = now;

        info!(
            id = %header.id,
            code = %header.code,
            total_sale = %header.total_sale,
            total_profit = %header.total_profit,
            "Transaction completed"
        );

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Update,
                    ActivityModule::Transaction,
                    format!("Completed transaction {}", header.code),
                )
                .target(&header.id),
            )
            .await;

        Ok(TransactionDetail {
            transaction: header,
            items,
        })
    }

    /// Cancels a draft or completed transaction. Items and totals are kept.
    pub async fn cancel(&self, actor: &Actor, id: &str) -> EngineResult<Transaction> {
        actor.require(Capability::RecordTransactions)?;

        let mut header = self.load(id).await?;
        let next = lifecycle::check(&header.id, header.status, Transition::Cancel)?;
        let now = self.ctx.clock.now();

        if let Err(err) = self.ctx.db.transactions().cancel(id, now).await {
            return Err(self.lost_race(id, Transition::Cancel, err).await);
        }

        info!(id = %header.id, code = %header.code, from = %header.status, "Transaction cancelled");
        header.status = next;
        header.updated_at = now;

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Delete,
                    ActivityModule::Transaction,
                    format!("Cancelled transaction {}", header.code),
                )
                .target(&header.id),
            )
            .await;

        Ok(header)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Header plus line items in their stored order.
    pub async fn get_detail(&self, id: &str) -> EngineResult<TransactionDetail> {
        let transaction = self.load(id).await?;
        let items = self.ctx.db.transactions().get_items(id).await?;
        Ok(TransactionDetail { transaction, items })
    }

    /// Headers matching `filter`, newest transaction date first.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> EngineResult<Page<Transaction>> {
        let (headers, total) = self.ctx.db.transactions().list(filter, page).await?;
        Ok(Page::new(headers, total, page))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn load(&self, id: &str) -> EngineResult<Transaction> {
        self.ctx
            .db
            .transactions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Transaction", id))
    }

    /// Prices each requested line from its goods record.
    ///
    /// Quantities are checked for the whole request before any lookup, so a
    /// bad line rejects the request outright. Lines whose goods no longer
    /// exist are skipped and reported.
    async fn price_items(
        &self,
        transaction_id: &str,
        requests: &[ItemRequest],
        now: DateTime<Utc>,
    ) -> EngineResult<PricedItems> {
        if let Some(bad) = requests.iter().find(|r| r.quantity <= 0) {
            return Err(CoreError::InvalidQuantity {
                goods_id: bad.goods_id.clone(),
                quantity: bad.quantity,
            }
            .into());
        }

        let goods_repo = self.ctx.db.goods();
        let mut priced = PricedItems::default();

        for (index, request) in requests.iter().enumerate() {
            let Some(goods) = goods_repo.get_by_id(&request.goods_id).await? else {
                warn!(
                    transaction_id,
                    goods_id = %request.goods_id,
                    index,
                    "Goods not found, line skipped"
                );
                priced.skipped.push(SkippedItem {
                    index,
                    goods_id: request.goods_id.clone(),
                    reason: SkipReason::GoodsNotFound,
                });
                continue;
            };

            let line = pricing::compute(
                &goods.id,
                goods.sale_price,
                goods.cost_price,
                request.quantity,
            )?;
            let position = priced.items.len() as i64;

            priced.items.push(LineItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction_id.to_string(),
                goods_id: goods.id,
                trading_unit_id: goods.trading_unit_id,
                position,
                quantity: request.quantity,
                sale_price: goods.sale_price,
                cost_price: goods.cost_price,
                subtotal_sale: line.subtotal_sale,
                subtotal_cost: line.subtotal_cost,
                profit: line.profit,
                created_at: now,
            });
        }

        debug!(
            transaction_id,
            accepted = priced.items.len(),
            skipped = priced.skipped.len(),
            "Priced items"
        );
        Ok(priced)
    }

    /// Explains a guarded write that touched no row: the status moved under
    /// us, or the row is gone.
    async fn lost_race(&self, id: &str, transition: Transition, err: DbError) -> EngineError {
        if !matches!(err, DbError::NotFound { .. }) {
            return err.into();
        }

        match self.ctx.db.transactions().get_by_id(id).await {
            Ok(Some(current)) => match lifecycle::check(id, current.status, transition) {
                Err(rejected) => rejected.into(),
                Ok(_) => err.into(),
            },
            Ok(None) => EngineError::not_found("Transaction", id),
            Err(e) => e.into(),
        }
    }
}
