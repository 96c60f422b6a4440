//! # Period Service
//!
//! Accounting periods and their closing.
//!
//! ## Rules
//! - `end_date` must be strictly after `start_date`, at creation and on
//!   every update that touches either date
//! - A closed period cannot be updated, deleted or closed again
//! - Closing is one-way
//! - A period that still owns transactions cannot be deleted

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use ud_core::{
    period as period_guard, validation, ActivityAction, ActivityModule, CoreError, Page,
    PageRequest, Period, ValidationError,
};
use ud_db::{DbError, PeriodFilter};

use crate::actor::{Actor, Capability};
use crate::engine::EngineContext;
use crate::error::{EngineError, EngineResult};
use crate::hooks::ActivityEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePeriod {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CreatePeriod {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        CreatePeriod {
            name: name.into(),
            start_date,
            end_date,
            is_active: true,
        }
    }
}

/// `None` leaves a field alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePeriod {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct PeriodService {
    ctx: Arc<EngineContext>,
}

impl PeriodService {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        PeriodService { ctx }
    }

    /// Creates an open period.
    ///
    /// ## Errors
    /// `ValidationFailed` for an empty name or an inverted/empty date range.
    pub async fn create(&self, actor: &Actor, request: CreatePeriod) -> EngineResult<Period> {
        actor.require(Capability::ManagePeriods)?;
        validation::validate_name("name", &request.name)?;
        period_guard::validate_date_range(request.start_date, request.end_date)?;

        let now = self.ctx.clock.now();
        let period = Period {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
            is_active: request.is_active,
            is_closed: false,
            created_at: now,
            updated_at: now,
        };

        self.ctx.db.periods().insert(&period).await?;
        info!(
            id = %period.id,
            start = %period.start_date,
            end = %period.end_date,
            "Period created"
        );

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Create,
                    ActivityModule::Period,
                    format!("Created period {}", period.name),
                )
                .target(&period.id),
            )
            .await;

        Ok(period)
    }

    pub async fn get(&self, id: &str) -> EngineResult<Period> {
        self.ctx.period(id).await
    }

    /// Most recent start date first.
    pub async fn list(
        &self,
        filter: &PeriodFilter,
        page: PageRequest,
    ) -> EngineResult<Page<Period>> {
        let (periods, total) = self.ctx.db.periods().list(filter, page).await?;
        Ok(Page::new(periods, total, page))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        request: UpdatePeriod,
    ) -> EngineResult<Period> {
        actor.require(Capability::ManagePeriods)?;

        let mut period = self.ctx.open_period(id).await?;

        if let Some(name) = request.name {
            validation::validate_name("name", &name)?;
            period.name = name.trim().to_string();
        }
        if request.start_date.is_some() || request.end_date.is_some() {
            period.start_date = request.start_date.unwrap_or(period.start_date);
            period.end_date = request.end_date.unwrap_or(period.end_date);
            period_guard::validate_date_range(period.start_date, period.end_date)?;
        }
        if let Some(active) = request.is_active {
            period.is_active = active;
        }
        period.updated_at = self.ctx.clock.now();

        match self.ctx.db.periods().update(&period).await {
            Ok(()) => {}
            // Closed between our read and the write.
            Err(DbError::NotFound { .. }) => return Err(self.closed_or_missing(id).await),
            Err(e) => return Err(e.into()),
        }

        info!(id = %period.id, "Period updated");
        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Update,
                    ActivityModule::Period,
                    format!("Updated period {}", period.name),
                )
                .target(&period.id),
            )
            .await;

        Ok(period)
    }

    /// Closes a period. Closing an already closed period fails with
    /// `PeriodClosed`.
    pub async fn close(&self, actor: &Actor, id: &str) -> EngineResult<Period> {
        actor.require(Capability::ManagePeriods)?;

        let mut period = self.ctx.open_period(id).await?;
        let now = self.ctx.clock.now();

        if !self.ctx.db.periods().close(id, now).await? {
            return Err(self.closed_or_missing(id).await);
        }

        period.is_closed = true;
        period.updated_at = now;
        info!(id = %period.id, name = %period.name, "Period closed");

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Update,
                    ActivityModule::Period,
                    format!("Closed period {}", period.name),
                )
                .target(&period.id),
            )
            .await;

        Ok(period)
    }

    /// Deletes an open period that owns no transactions.
    pub async fn delete(&self, actor: &Actor, id: &str) -> EngineResult<()> {
        actor.require(Capability::ManagePeriods)?;

        let period = self.ctx.open_period(id).await?;
        let repo = self.ctx.db.periods();

        let count = repo.count_transactions(id).await?;
        if count > 0 {
            return Err(ValidationError::StillReferenced {
                entity: "Period".into(),
                id: id.to_string(),
                count,
            }
            .into());
        }

        match repo.delete(id).await {
            Ok(()) => {}
            Err(DbError::NotFound { .. }) => return Err(self.closed_or_missing(id).await),
            Err(e) => return Err(e.into()),
        }

        info!(id = %id, "Period deleted");
        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Delete,
                    ActivityModule::Period,
                    format!("Deleted period {}", period.name),
                )
                .target(id),
            )
            .await;

        Ok(())
    }

    async fn closed_or_missing(&self, id: &str) -> EngineError {
        match self.ctx.period(id).await {
            Ok(period) if period.is_closed => CoreError::PeriodClosed {
                period_id: period.id,
            }
            .into(),
            Ok(_) => EngineError::not_found("Open period", id),
            Err(e) => e,
        }
    }
}
