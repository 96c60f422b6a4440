//! # Services
//!
//! One service per area. Every mutating operation takes the [`Actor`]
//! first, checks its capability, runs the guards, writes, and only then
//! notifies the post-commit hooks.
//!
//! [`Actor`]: crate::actor::Actor

pub mod dashboard;
pub mod goods;
pub mod kitchen;
pub mod period;
pub mod trading_unit;
pub mod transaction;

pub use dashboard::DashboardService;
pub use goods::{CreateGoods, GoodsSearch, GoodsService, UpdateGoods};
pub use kitchen::{CreateKitchen, KitchenService, UpdateKitchen};
pub use period::{CreatePeriod, PeriodService, UpdatePeriod};
pub use trading_unit::{CreateTradingUnit, TradingUnitService, UpdateTradingUnit};
pub use transaction::{CreateTransaction, TransactionResult, TransactionService, UpdateTransaction};
