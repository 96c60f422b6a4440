//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

use ud_core::{Goods, ItemRequest, Kitchen, Money, Period, TradingUnit};
use ud_db::{Database, DbConfig};
use ud_engine::{
    Actor, CreateGoods, CreateKitchen, CreatePeriod, CreateTradingUnit, CreateTransaction, Engine,
    EngineSettings, FixedClock, Role, TransactionResult,
};

/// 2025-01-15 09:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn engine_with(settings: EngineSettings) -> Engine {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Engine::builder(db)
        .clock(Arc::new(FixedClock::new(now())))
        .settings(settings)
        .record_activity(true)
        .build()
}

pub struct Fixture {
    pub engine: Engine,
    pub admin: Actor,
    pub operator: Actor,
    pub unit: TradingUnit,
    pub kitchen: Kitchen,
    /// January 2025, open.
    pub period: Period,
}

pub async fn fixture() -> Fixture {
    fixture_with(EngineSettings::default()).await
}

pub async fn fixture_with(settings: EngineSettings) -> Fixture {
    let engine = engine_with(settings).await;
    let admin = Actor::new("admin-1", Role::Admin);
    let operator = Actor::new("operator-1", Role::UdOperator);

    let unit = engine
        .trading_units()
        .create(&admin, CreateTradingUnit::named("Usaha Dagang Maju"))
        .await
        .unwrap();
    let kitchen = engine
        .kitchens()
        .create(
            &admin,
            CreateKitchen {
                name: "Dapur Sehat".into(),
                address: None,
            },
        )
        .await
        .unwrap();
    let period = engine
        .periods()
        .create(&admin, CreatePeriod::new("January 2025", date(2025, 1, 1), date(2025, 1, 31)))
        .await
        .unwrap();

    Fixture {
        engine,
        admin,
        operator,
        unit,
        kitchen,
        period,
    }
}

impl Fixture {
    pub async fn goods(&self, name: &str, sale: i64, cost: i64) -> Goods {
        self.engine
            .goods()
            .create(
                &self.admin,
                CreateGoods::new(
                    &self.unit.id,
                    name,
                    Money::from_amount(sale),
                    Money::from_amount(cost),
                ),
            )
            .await
            .unwrap()
    }

    pub fn request(&self, items: Vec<ItemRequest>) -> CreateTransaction {
        CreateTransaction {
            period_id: self.period.id.clone(),
            kitchen_id: self.kitchen.id.clone(),
            transaction_date: Some(date(2025, 1, 15)),
            items,
        }
    }

    pub async fn draft(&self, items: Vec<ItemRequest>) -> TransactionResult {
        self.engine
            .transactions()
            .create(&self.operator, self.request(items))
            .await
            .unwrap()
    }

    pub async fn close_period(&self) {
        self.engine
            .periods()
            .close(&self.admin, &self.period.id)
            .await
            .unwrap();
    }
}
