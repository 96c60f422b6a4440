//! # Kitchen Service
//!
//! Kitchens (Dapur) are the fulfillment locations a transaction is booked
//! against. Codes follow `DAPUR-{ABBR}-NNN`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use ud_core::{validation, ActivityAction, ActivityModule, CodeScope, Kitchen, Page, PageRequest};
use ud_db::KitchenFilter;

use crate::actor::{Actor, Capability};
use crate::engine::EngineContext;
use crate::error::EngineResult;
use crate::hooks::ActivityEvent;
use crate::retry;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateKitchen {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateKitchen {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct KitchenService {
    ctx: Arc<EngineContext>,
}

impl KitchenService {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        KitchenService { ctx }
    }

    pub async fn create(&self, actor: &Actor, request: CreateKitchen) -> EngineResult<Kitchen> {
        actor.require(Capability::ManageCatalog)?;
        validation::validate_name("name", &request.name)?;

        let now = self.ctx.clock.now();
        let draft = Kitchen {
            id: Uuid::new_v4().to_string(),
            code: String::new(),
            name: request.name.trim().to_string(),
            address: request.address,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let repo = self.ctx.db.kitchens();
        let kitchen = retry::with_code(
            &CodeScope::kitchen(&draft.name),
            self.ctx.settings.max_code_attempts,
            |prefix| {
                let repo = repo.clone();
                async move { repo.latest_code(&prefix).await }
            },
            |code| {
                let repo = repo.clone();
                let mut kitchen = draft.clone();
                kitchen.code = code;
                async move {
                    repo.insert(&kitchen).await?;
                    EngineResult::Ok(kitchen)
                }
            },
        )
        .await?;

        info!(id = %kitchen.id, code = %kitchen.code, "Kitchen created");
        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Create,
                    ActivityModule::Kitchen,
                    format!("Created kitchen {}", kitchen.code),
                )
                .target(&kitchen.id),
            )
            .await;

        Ok(kitchen)
    }

    pub async fn get(&self, id: &str) -> EngineResult<Kitchen> {
        self.ctx.kitchen(id).await
    }

    pub async fn list(
        &self,
        filter: &KitchenFilter,
        page: PageRequest,
    ) -> EngineResult<Page<Kitchen>> {
        let filter = KitchenFilter {
            search: validation::normalize_search(filter.search.as_deref()),
            is_active: filter.is_active,
        };
        let (kitchens, total) = self.ctx.db.kitchens().list(&filter, page).await?;
        Ok(Page::new(kitchens, total, page))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        request: UpdateKitchen,
    ) -> EngineResult<Kitchen> {
        actor.require(Capability::ManageCatalog)?;

        let mut kitchen = self.ctx.kitchen(id).await?;
        if let Some(name) = request.name {
            validation::validate_name("name", &name)?;
            kitchen.name = name.trim().to_string();
        }
        if request.address.is_some() {
            kitchen.address = request.address;
        }
        if let Some(active) = request.is_active {
            kitchen.is_active = active;
        }
        kitchen.updated_at = self.ctx.clock.now();

        self.ctx.db.kitchens().update(&kitchen).await?;
        info!(id = %kitchen.id, code = %kitchen.code, "Kitchen updated");

        self.ctx
            .notify(
                ActivityEvent::new(
                    &actor.id,
                    ActivityAction::Update,
                    ActivityModule::Kitchen,
                    format!("Updated kitchen {}", kitchen.code),
                )
                .target(&kitchen.id),
            )
            .await;

        Ok(kitchen)
    }

    pub async fn deactivate(&self, actor: &Actor, id: &str) -> EngineResult<Kitchen> {
        self.update(
            actor,
            id,
            UpdateKitchen {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}
