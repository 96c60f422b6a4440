//! # Dashboard Service
//!
//! Read-only summaries. Only `completed` transactions count towards money
//! totals; drafts and cancelled ones are ignored.

use std::sync::Arc;
use tracing::debug;

use ud_core::{ActivityLogEntry, LedgerSummary, Page, PageRequest, TradingUnitSales, Transaction};
use ud_db::{ActivityLogFilter, TransactionFilter};

use crate::engine::EngineContext;
use crate::error::EngineResult;

#[derive(Clone)]
pub struct DashboardService {
    ctx: Arc<EngineContext>,
}

impl DashboardService {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        DashboardService { ctx }
    }

    /// Active reference-data counts plus completed-transaction totals,
    /// optionally restricted to one period.
    pub async fn summary(&self, period_id: Option<&str>) -> EngineResult<LedgerSummary> {
        let db = &self.ctx.db;

        let completed = db.transactions().completed_totals(period_id).await?;
        debug!(period_id = ?period_id, completed = completed.count, "Computed summary");

        Ok(LedgerSummary {
            trading_units: db.trading_units().count_active().await?,
            goods: db.goods().count_active().await?,
            kitchens: db.kitchens().count_active().await?,
            periods: db.periods().count_active().await?,
            completed_transactions: completed.count,
            total_sale: completed.total_sale,
            total_cost: completed.total_cost,
            total_profit: completed.total_profit,
        })
    }

    /// Per trading unit sums over completed transactions, best seller first.
    pub async fn sales_by_trading_unit(
        &self,
        period_id: Option<&str>,
    ) -> EngineResult<Vec<TradingUnitSales>> {
        Ok(self.ctx.db.transactions().sales_by_trading_unit(period_id).await?)
    }

    /// The `limit` most recent transactions of any status.
    pub async fn recent_transactions(&self, limit: u32) -> EngineResult<Vec<Transaction>> {
        let page = PageRequest::new(Some(1), Some(limit));
        let (headers, _) = self
            .ctx
            .db
            .transactions()
            .list(&TransactionFilter::default(), page)
            .await?;
        Ok(headers)
    }

    /// Activity log, newest first.
    pub async fn activity(
        &self,
        filter: &ActivityLogFilter,
        page: PageRequest,
    ) -> EngineResult<Page<ActivityLogEntry>> {
        let (entries, total) = self.ctx.db.activity_logs().list(filter, page).await?;
        Ok(Page::new(entries, total, page))
    }
}
