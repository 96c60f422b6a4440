//! # Goods Service
//!
//! The catalog the transaction engine prices from. A price change here
//! only affects line items created afterwards.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use ud_core::{
    validation, ActivityAction, ActivityModule, Goods, Money, Page, PageRequest, UnitOfMeasure,
};
use ud_db::GoodsFilter;

use crate::actor::{Actor, Capability};
use crate::engine::EngineContext;
use crate::error::{EngineError, EngineResult};
use crate::hooks::ActivityEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGoods {
    pub trading_unit_id: String,
    pub name: String,
    #[serde(default)]
    pub unit: UnitOfMeasure,
    pub sale_price: Money,
    /// Zero when absent.
    #[serde(default)]
    pub cost_price: Money,
}

impl CreateGoods {
    pub fn new(
        trading_unit_id: impl Into<String>,
        name: impl Into<String>,
        sale_price: Money,
        cost_price: Money,
    ) -> Self {
        CreateGoods {
            trading_unit_id: trading_unit_id.into(),
            name: name.into(),
            unit: UnitOfMeasure::default(),
            sale_price,
            cost_price,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGoods {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: Option<UnitOfMeasure>,
    #[serde(default)]
    pub sale_price: Option<Money>,
    #[serde(default)]
    pub cost_price: Option<Money>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Search over active goods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoodsSearch {
    /// Substring of the goods name.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub trading_unit_id: Option<String>,
}

#[derive(Clone)]
pub struct GoodsService {
    ctx: Arc<EngineContext>,
}

impl GoodsService {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        GoodsService { ctx }
    }

    /// ## Errors
    /// - `NotFound` when the trading unit does not exist
    /// - `ValidationFailed` for an empty name or a negative price
    pub async fn create(&self, actor: &Actor, request: CreateGoods) -> EngineResult<Goods> {
        actor.require(Capability::ManageCatalog)?;
        validation::validate_name("name", &request.name)?;
        validation::validate_price("sale_price", request.sale_price)?;
        validation::validate_price("cost_price", request.cost_price)?;

        let unit = self.ctx.trading_unit(&request.trading_unit_id).await?;

        let now = self.ctx.clock.now();
        let goods = Goods {
            id: Uuid::new_v4().to_string(),
            trading_unit_id: unit.id,
            name: request.name.trim().to_string(),
            unit: request.unit,
            sale_price: request.sale_price,
            cost_price: request.cost_price,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.ctx.db.goods().insert(&goods).await?;
        info!(id = %goods.id, trading_unit_id = %goods.trading_unit_id, "Goods created");

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Create,
                    ActivityModule::Goods,
                    format!("Created goods {}", goods.name),
                )
                .target(&goods.id),
            )
            .await;

        Ok(goods)
    }

    pub async fn get(&self, id: &str) -> EngineResult<Goods> {
        self.ctx
            .db
            .goods()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Goods", id))
    }

    /// Active goods only, ordered by name.
    pub async fn search(
        &self,
        search: &GoodsSearch,
        page: PageRequest,
    ) -> EngineResult<Page<Goods>> {
        let filter = GoodsFilter {
            search: validation::normalize_search(search.query.as_deref()),
            trading_unit_id: search.trading_unit_id.clone(),
            is_active: Some(true),
        };
        let (goods, total) = self.ctx.db.goods().list(&filter, page).await?;
        Ok(Page::new(goods, total, page))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        request: UpdateGoods,
    ) -> EngineResult<Goods> {
        actor.require(Capability::ManageCatalog)?;

        let mut goods = self.get(id).await?;
        if let Some(name) = request.name {
            validation::validate_name("name", &name)?;
            goods.name = name.trim().to_string();
        }
        if let Some(unit) = request.unit {
            goods.unit = unit;
        }
        if let Some(price) = request.sale_price {
            validation::validate_price("sale_price", price)?;
            goods.sale_price = price;
        }
        if let Some(price) = request.cost_price {
            validation::validate_price("cost_price", price)?;
            goods.cost_price = price;
        }
        if let Some(active) = request.is_active {
            goods.is_active = active;
        }
        goods.updated_at = self.ctx.clock.now();

        self.ctx.db.goods().update(&goods).await?;
        info!(
            id = %goods.id,
            sale_price = %goods.sale_price,
            cost_price = %goods.cost_price,
            "Goods updated"
        );

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Update,
                    ActivityModule::Goods,
                    format!("Updated goods {}", goods.name),
                )
                .target(&goods.id),
            )
            .await;

        Ok(goods)
    }

    /// Removes the catalog entry. Line items keep their snapshot.
    pub async fn delete(&self, actor: &Actor, id: &str) -> EngineResult<()> {
        actor.require(Capability::ManageCatalog)?;

        let goods = self.get(id).await?;
        self.ctx.db.goods().delete(id).await?;
        info!(id = %id, "Goods deleted");

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Delete,
                    ActivityModule::Goods,
                    format!("Deleted goods {}", goods.name),
                )
                .target(id),
            )
            .await;

        Ok(())
    }
}
