//! # Goods Repository
//!
//! Database operations for the goods catalog (Barang).
//!
//! Price changes here never touch `line_items`: items carry their own price
//! snapshot.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::like_pattern;
use crate::error::{DbError, DbResult};
use ud_core::{Goods, PageRequest};

#[derive(Debug, Clone, Default)]
pub struct GoodsFilter {
    /// Substring of the goods name.
    pub search: Option<String>,
    pub trading_unit_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for goods database operations.
#[derive(Debug, Clone)]
pub struct GoodsRepository {
    pool: SqlitePool,
}

impl GoodsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        GoodsRepository { pool }
    }

    /// Inserts a goods record.
    ///
    /// ## Errors
    /// `ForeignKeyViolation` when the trading unit does not exist.
    pub async fn insert(&self, goods: &Goods) -> DbResult<()> {
        debug!(id = %goods.id, trading_unit_id = %goods.trading_unit_id, "Inserting goods");

        sqlx::query(
            r#"
            INSERT INTO goods (
                id, trading_unit_id, name, unit, sale_price, cost_price,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&goods.id)
        .bind(&goods.trading_unit_id)
        .bind(&goods.name)
        .bind(goods.unit)
        .bind(goods.sale_price)
        .bind(goods.cost_price)
        .bind(goods.is_active)
        .bind(goods.created_at)
        .bind(goods.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Goods>> {
        let goods = sqlx::query_as::<_, Goods>("SELECT * FROM goods WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(goods)
    }

    /// Lists goods ordered by name.
    pub async fn list(
        &self,
        filter: &GoodsFilter,
        page: PageRequest,
    ) -> DbResult<(Vec<Goods>, i64)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM goods WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM goods WHERE 1 = 1");
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY name ASC, id ASC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let goods = query.build_query_as::<Goods>().fetch_all(&self.pool).await?;

        debug!(count = goods.len(), total, "Listed goods");
        Ok((goods, total))
    }

    /// Updates name, unit, prices and active flag.
    pub async fn update(&self, goods: &Goods) -> DbResult<()> {
        debug!(id = %goods.id, sale_price = %goods.sale_price, "Updating goods");

        let result = sqlx::query(
            r#"
            UPDATE goods
            SET name = ?2, unit = ?3, sale_price = ?4, cost_price = ?5,
                is_active = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&goods.id)
        .bind(&goods.name)
        .bind(goods.unit)
        .bind(goods.sale_price)
        .bind(goods.cost_price)
        .bind(goods.is_active)
        .bind(goods.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Goods", &goods.id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting goods");

        let result = sqlx::query("DELETE FROM goods WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Goods", id));
        }

        Ok(())
    }

    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM goods WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &GoodsFilter) {
    if let Some(active) = filter.is_active {
        query.push(" AND is_active = ").push_bind(active);
    }
    if let Some(unit_id) = &filter.trading_unit_id {
        query.push(" AND trading_unit_id = ").push_bind(unit_id.clone());
    }
    if let Some(search) = &filter.search {
        query.push(" AND name LIKE ").push_bind(like_pattern(search));
    }
}
