//! # Seed Data Generator
//!
//! Populates a database with a small, realistic ledger for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./ud_ledger_dev.db with 20 transactions (default)
//! cargo run -p ud-engine --bin seed
//!
//! # Custom amount
//! cargo run -p ud-engine --bin seed -- --transactions 200
//!
//! # Specify database path
//! cargo run -p ud-engine --bin seed -- --db ./data/ud-ledger.db
//! ```
//!
//! ## Generated Data
//! - Trading units with a few goods each
//! - Kitchens
//! - One open period covering the current month
//! - Transactions spread over that month; every other one is completed,
//!   every fifth is cancelled

use chrono::{Datelike, Duration, NaiveDate};
use std::env;

use ud_core::{ItemRequest, Money, UnitOfMeasure};
use ud_engine::{
    telemetry, Actor, CreateGoods, CreateKitchen, CreatePeriod, CreateTradingUnit,
    CreateTransaction, Engine, EngineConfig, Role, TradingUnitFilter,
};

/// Trading units and their goods: (name, owner, [(goods, unit, sale, cost)]).
const CATALOG: &[(&str, &str, &[(&str, UnitOfMeasure, i64, i64)])] = &[
    (
        "Usaha Dagang Maju",
        "Budi Santoso",
        &[
            ("Beras Premium", UnitOfMeasure::Kg, 14_000, 11_500),
            ("Minyak Goreng", UnitOfMeasure::Liter, 18_000, 15_000),
            ("Gula Pasir", UnitOfMeasure::Kg, 16_000, 13_000),
        ],
    ),
    (
        "Sumber Pangan Sejahtera",
        "Siti Rahma",
        &[
            ("Telur Ayam", UnitOfMeasure::Tray, 52_000, 45_000),
            ("Tepung Terigu", UnitOfMeasure::Kg, 12_000, 9_500),
        ],
    ),
    (
        "Tani Makmur",
        "Agus Wijaya",
        &[
            ("Sayur Bayam", UnitOfMeasure::Piece, 5_000, 3_000),
            ("Air Galon", UnitOfMeasure::Gallon, 20_000, 16_000),
            ("Kecap Manis", UnitOfMeasure::Box, 96_000, 84_000),
        ],
    ),
];

const KITCHENS: &[&str] = &["Dapur Sehat Sentosa", "Dapur Umum Mataram"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 20;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--transactions" | "-t" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("UD Ledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --transactions <N>  Transactions to generate (default: 20)");
                println!("  -d, --db <PATH>         Database file (default: ./ud_ledger_dev.db)");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = EngineConfig::load_or_default(None);
    config.database.path = db_path.unwrap_or_else(|| "./ud_ledger_dev.db".to_string()).into();
    telemetry::init_tracing(&config.logging.filter);

    println!("UD Ledger Seed Data Generator");
    println!("=============================");
    println!("Database:     {}", config.database.path.display());
    println!("Transactions: {}", count);
    println!();

    let engine = Engine::connect(&config).await?;
    let admin = Actor::new("seed-admin", Role::Admin);

    let existing = engine
        .trading_units()
        .list(&TradingUnitFilter::default(), Default::default())
        .await?;
    if existing.total > 0 {
        println!("Database already has {} trading units", existing.total);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    let mut goods_ids = Vec::new();
    for (name, owner, goods) in CATALOG {
        let unit = engine
            .trading_units()
            .create(
                &admin,
                CreateTradingUnit {
                    owner_name: Some(owner.to_string()),
                    ..CreateTradingUnit::named(*name)
                },
            )
            .await?;
        println!("  {} {}", unit.code, unit.name);

        for (goods_name, measure, sale, cost) in goods.iter() {
            let mut request = CreateGoods::new(
                &unit.id,
                *goods_name,
                Money::from_amount(*sale),
                Money::from_amount(*cost),
            );
            request.unit = *measure;
            goods_ids.push(engine.goods().create(&admin, request).await?.id);
        }
    }

    let mut kitchen_ids = Vec::new();
    for name in KITCHENS {
        let kitchen = engine
            .kitchens()
            .create(
                &admin,
                CreateKitchen {
                    name: name.to_string(),
                    address: None,
                },
            )
            .await?;
        println!("  {} {}", kitchen.code, kitchen.name);
        kitchen_ids.push(kitchen.id);
    }

    // Period: the current month
    let today = chrono::Utc::now().date_naive();
    let start = today.with_day(1).unwrap_or(today);
    let end = last_day_of_month(start);
    let period = engine
        .periods()
        .create(&admin, CreatePeriod::new(start.format("%B %Y").to_string(), start, end))
        .await?;
    println!("  Period {} ({} .. {})", period.name, period.start_date, period.end_date);

    // Transactions
    println!();
    println!("Generating transactions...");
    let operator = Actor::new("seed-operator", Role::UdOperator);
    let started = std::time::Instant::now();
    let days = (end - start).num_days().max(1);

    for n in 0..count {
        let items = (0..(1 + n % 3))
            .map(|k| {
                let goods_id = goods_ids[(n + k * 3) % goods_ids.len()].clone();
                ItemRequest::new(goods_id, 1 + ((n + k) % 5) as i64)
            })
            .collect();

        let created = engine
            .transactions()
            .create(
                &operator,
                CreateTransaction {
                    period_id: period.id.clone(),
                    kitchen_id: kitchen_ids[n % kitchen_ids.len()].clone(),
                    transaction_date: Some(start + Duration::days(n as i64 % days)),
                    items,
                },
            )
            .await?;

        let id = created.transaction().id.clone();
        if n % 5 == 4 {
            engine.transactions().cancel(&operator, &id).await?;
        } else if n % 2 == 0 {
            engine.transactions().complete(&operator, &id).await?;
        }
    }

    let elapsed = started.elapsed();
    println!("Generated {} transactions in {:?}", count, elapsed);

    let summary = engine.dashboard().summary(Some(&period.id)).await?;
    println!();
    println!("Completed transactions: {}", summary.completed_transactions);
    println!("  Sales:  {}", summary.total_sale);
    println!("  Cost:   {}", summary.total_cost);
    println!("  Profit: {}", summary.total_profit);

    println!();
    println!("Seed complete!");

    Ok(())
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}
