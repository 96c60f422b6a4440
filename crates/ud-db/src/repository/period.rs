//! # Period Repository
//!
//! Database operations for accounting periods.
//!
//! The closed flag is monotonic. [`PeriodRepository::close`] only flips
//! `0 → 1` and [`PeriodRepository::update`] never writes `is_closed`.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use ud_core::{PageRequest, Period};

#[derive(Debug, Clone, Default)]
pub struct PeriodFilter {
    pub is_active: Option<bool>,
    pub is_closed: Option<bool>,
}

/// Repository for period database operations.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    pool: SqlitePool,
}

impl PeriodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PeriodRepository { pool }
    }

    pub async fn insert(&self, period: &Period) -> DbResult<()> {
        debug!(
            id = %period.id,
            start = %period.start_date,
            end = %period.end_date,
            "Inserting period"
        );

        sqlx::query(
            r#"
            INSERT INTO periods (
                id, name, start_date, end_date, is_active, is_closed, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&period.id)
        .bind(&period.name)
        .bind(period.start_date)
        .bind(period.end_date)
        .bind(period.is_active)
        .bind(period.is_closed)
        .bind(period.created_at)
        .bind(period.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Period>> {
        let period = sqlx::query_as::<_, Period>("SELECT * FROM periods WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(period)
    }

    /// Lists periods, most recent start date first.
    pub async fn list(
        &self,
        filter: &PeriodFilter,
        page: PageRequest,
    ) -> DbResult<(Vec<Period>, i64)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM periods WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM periods WHERE 1 = 1");
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY start_date DESC, id ASC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let periods = query.build_query_as::<Period>().fetch_all(&self.pool).await?;
        Ok((periods, total))
    }

    /// Updates name, dates and active flag of an open period.
    ///
    /// The `is_closed = 0` condition makes a close that raced ahead of this
    /// update win; the caller sees `NotFound`.
    pub async fn update(&self, period: &Period) -> DbResult<()> {
        debug!(id = %period.id, "Updating period");

        let result = sqlx::query(
            r#"
            UPDATE periods
            SET name = ?2, start_date = ?3, end_date = ?4, is_active = ?5, updated_at = ?6
            WHERE id = ?1 AND is_closed = 0
            "#,
        )
        .bind(&period.id)
        .bind(&period.name)
        .bind(period.start_date)
        .bind(period.end_date)
        .bind(period.is_active)
        .bind(period.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open period", &period.id));
        }

        Ok(())
    }

    /// Sets the closed flag. Returns `false` when the period was already
    /// closed or does not exist.
    pub async fn close(&self, id: &str, at: DateTime<Utc>) -> DbResult<bool> {
        debug!(id = %id, "Closing period");

        let result = sqlx::query(
            "UPDATE periods SET is_closed = 1, updated_at = ?2 WHERE id = ?1 AND is_closed = 0",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes an open period.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting period");

        let result = sqlx::query("DELETE FROM periods WHERE id = ?1 AND is_closed = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open period", id));
        }

        Ok(())
    }

    /// Number of transactions (any status) owned by the period.
    pub async fn count_transactions(&self, id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE period_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM periods WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &PeriodFilter) {
    if let Some(active) = filter.is_active {
        query.push(" AND is_active = ").push_bind(active);
    }
    if let Some(closed) = filter.is_closed {
        query.push(" AND is_closed = ").push_bind(closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{date, db, period};

    #[tokio::test]
    async fn test_close_is_one_way() {
        let db = db().await;
        let repo = db.periods();
        let p = period(false);
        repo.insert(&p).await.unwrap();

        assert!(repo.close(&p.id, Utc::now()).await.unwrap());
        assert!(!repo.close(&p.id, Utc::now()).await.unwrap());

        let loaded = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert!(loaded.is_closed);
    }

    #[tokio::test]
    async fn test_closed_period_rejects_update_and_delete() {
        let db = db().await;
        let repo = db.periods();
        let mut p = period(false);
        repo.insert(&p).await.unwrap();
        repo.close(&p.id, Utc::now()).await.unwrap();

        p.name = "renamed".to_string();
        assert!(matches!(repo.update(&p).await.unwrap_err(), DbError::NotFound { .. }));
        assert!(matches!(repo.delete(&p.id).await.unwrap_err(), DbError::NotFound { .. }));
        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().name, "January 2025");
    }

    #[tokio::test]
    async fn test_schema_rejects_inverted_range() {
        let db = db().await;
        let mut p = period(false);
        p.start_date = date(2025, 1, 1);
        p.end_date = date(2024, 12, 31);
        assert!(db.periods().insert(&p).await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = db().await;
        let repo = db.periods();
        let open = period(false);
        let closed = period(true);
        repo.insert(&open).await.unwrap();
        repo.insert(&closed).await.unwrap();

        let filter = PeriodFilter {
            is_active: None,
            is_closed: Some(false),
        };
        let (periods, total) = repo.list(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(periods[0].id, open.id);
        assert_eq!(repo.count_transactions(&open.id).await.unwrap(), 0);
    }
}
