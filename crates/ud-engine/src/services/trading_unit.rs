//! # Trading Unit Service
//!
//! Trading units (UD) own the goods catalog and appear on every line item.
//! Their code is allocated from the name (`Usaha Dagang Maju` →
//! `UD-UDM-001`) and never changes afterwards.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use ud_core::{
    validation, ActivityAction, ActivityModule, CodeScope, Page, PageRequest, TradingUnit,
};
use ud_db::TradingUnitFilter;

use crate::actor::{Actor, Capability};
use crate::engine::EngineContext;
use crate::error::EngineResult;
use crate::hooks::ActivityEvent;
use crate::retry;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTradingUnit {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub bank_account: Option<String>,
    #[serde(default)]
    pub kbli: Vec<String>,
}

impl CreateTradingUnit {
    pub fn named(name: impl Into<String>) -> Self {
        CreateTradingUnit {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// `None` leaves a field alone. The code is not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTradingUnit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub bank_account: Option<String>,
    #[serde(default)]
    pub kbli: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct TradingUnitService {
    ctx: Arc<EngineContext>,
}

impl TradingUnitService {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        TradingUnitService { ctx }
    }

    /// Creates an active trading unit with a freshly allocated code.
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateTradingUnit,
    ) -> EngineResult<TradingUnit> {
        actor.require(Capability::ManageCatalog)?;
        validation::validate_name("name", &request.name)?;

        let now = self.ctx.clock.now();
        let draft = TradingUnit {
            id: Uuid::new_v4().to_string(),
            code: String::new(),
            name: request.name.trim().to_string(),
            address: request.address,
            owner_name: request.owner_name,
            bank_name: request.bank_name,
            bank_account: request.bank_account,
            kbli: request.kbli,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let repo = self.ctx.db.trading_units();
        let unit = retry::with_code(
            &CodeScope::trading_unit(&draft.name),
            self.ctx.settings.max_code_attempts,
            |prefix| {
                let repo = repo.clone();
                async move { repo.latest_code(&prefix).await }
            },
            |code| {
                let repo = repo.clone();
                let mut unit = draft.clone();
                unit.code = code;
                async move {
                    repo.insert(&unit).await?;
                    EngineResult::Ok(unit)
                }
            },
        )
        .await?;

        info!(id = %unit.id, code = %unit.code, "Trading unit created");
        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Create,
                    ActivityModule::TradingUnit,
                    format!("Created trading unit {}", unit.code),
                )
                .target(&unit.id),
            )
            .await;

        Ok(unit)
    }

    pub async fn get(&self, id: &str) -> EngineResult<TradingUnit> {
        self.ctx.trading_unit(id).await
    }

    /// Ordered by code. `search` matches name, owner name or code.
    pub async fn list(
        &self,
        filter: &TradingUnitFilter,
        page: PageRequest,
    ) -> EngineResult<Page<TradingUnit>> {
        let filter = TradingUnitFilter {
            search: validation::normalize_search(filter.search.as_deref()),
            is_active: filter.is_active,
        };
        let (units, total) = self.ctx.db.trading_units().list(&filter, page).await?;
        Ok(Page::new(units, total, page))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        request: UpdateTradingUnit,
    ) -> EngineResult<TradingUnit> {
        actor.require(Capability::ManageCatalog)?;

        let mut unit = self.ctx.trading_unit(id).await?;
        if let Some(name) = request.name {
            validation::validate_name("name", &name)?;
            unit.name = name.trim().to_string();
        }
        if request.address.is_some() {
            unit.address = request.address;
        }
        if request.owner_name.is_some() {
            unit.owner_name = request.owner_name;
        }
        if request.bank_name.is_some() {
            unit.bank_name = request.bank_name;
        }
        if request.bank_account.is_some() {
            unit.bank_account = request.bank_account;
        }
        if let Some(kbli) = request.kbli {
            unit.kbli = kbli;
        }
        if let Some(active) = request.is_active {
            unit.is_active = active;
        }
        unit.updated_at = self.ctx.clock.now();

        self.ctx.db.trading_units().update(&unit).await?;
        info!(id = %unit.id, code = %unit.code, "Trading unit updated");

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Update,
                    ActivityModule::TradingUnit,
                    format!("Updated trading unit {}", unit.code),
                )
                .target(&unit.id),
            )
            .await;

        Ok(unit)
    }

    /// Marks the unit inactive. Its goods and historical line items stay.
    pub async fn deactivate(&self, actor: &Actor, id: &str) -> EngineResult<TradingUnit> {
        self.update(
            actor,
            id,
            UpdateTradingUnit {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}
