//! # Trading Unit Repository
//!
//! Database operations for trading units (UD).
//!
//! ## Key Operations
//! - Insert with generated code (unique)
//! - Latest code lookup for the sequence allocator
//! - Filtered, paginated listing

use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{latest_code, like_pattern};
use crate::error::{DbError, DbResult};
use ud_core::{PageRequest, TradingUnit};

/// List filters. `None` means "don't filter".
#[derive(Debug, Clone, Default)]
pub struct TradingUnitFilter {
    /// Substring of name, owner name or code.
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for trading unit database operations.
#[derive(Debug, Clone)]
pub struct TradingUnitRepository {
    pool: SqlitePool,
}

impl TradingUnitRepository {
    /// Creates a new TradingUnitRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TradingUnitRepository { pool }
    }

    /// Inserts a new trading unit.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` (field `trading_units.code`) when the code
    /// is already taken.
    pub async fn insert(&self, unit: &TradingUnit) -> DbResult<()> {
        debug!(id = %unit.id, code = %unit.code, "Inserting trading unit");

        sqlx::query(
            r#"
            INSERT INTO trading_units (
                id, code, name, address, owner_name, bank_name, bank_account,
                kbli, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&unit.id)
        .bind(&unit.code)
        .bind(&unit.name)
        .bind(&unit.address)
        .bind(&unit.owner_name)
        .bind(&unit.bank_name)
        .bind(&unit.bank_account)
        .bind(Json(&unit.kbli))
        .bind(unit.is_active)
        .bind(unit.created_at)
        .bind(unit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&unit.code))?;

        Ok(())
    }

    /// Gets a trading unit by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TradingUnit>> {
        let unit = sqlx::query_as::<_, TradingUnit>("SELECT * FROM trading_units WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(unit)
    }

    /// Latest code starting with `prefix`, if any.
    pub async fn latest_code(&self, prefix: &str) -> DbResult<Option<String>> {
        latest_code(&self.pool, "trading_units", prefix).await
    }

    /// Lists trading units ordered by code. Returns the page and the total
    /// row count matching the filter.
    pub async fn list(
        &self,
        filter: &TradingUnitFilter,
        page: PageRequest,
    ) -> DbResult<(Vec<TradingUnit>, i64)> {
        let mut count =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM trading_units WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM trading_units WHERE 1 = 1");
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY code ASC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let units = query
            .build_query_as::<TradingUnit>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = units.len(), total, "Listed trading units");
        Ok((units, total))
    }

    /// Updates everything except `id`, `code` and `created_at`.
    pub async fn update(&self, unit: &TradingUnit) -> DbResult<()> {
        debug!(id = %unit.id, "Updating trading unit");

        let result = sqlx::query(
            r#"
            UPDATE trading_units
            SET name = ?2, address = ?3, owner_name = ?4, bank_name = ?5,
                bank_account = ?6, kbli = ?7, is_active = ?8, updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&unit.id)
        .bind(&unit.name)
        .bind(&unit.address)
        .bind(&unit.owner_name)
        .bind(&unit.bank_name)
        .bind(&unit.bank_account)
        .bind(Json(&unit.kbli))
        .bind(unit.is_active)
        .bind(unit.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TradingUnit", &unit.id));
        }

        Ok(())
    }

    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM trading_units WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &TradingUnitFilter) {
    if let Some(active) = filter.is_active {
        query.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query
            .push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR owner_name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR code LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
