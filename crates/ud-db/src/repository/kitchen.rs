//! # Kitchen Repository
//!
//! Database operations for kitchens (Dapur).

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{latest_code, like_pattern};
use crate::error::{DbError, DbResult};
use ud_core::{Kitchen, PageRequest};

#[derive(Debug, Clone, Default)]
pub struct KitchenFilter {
    /// Substring of name or code.
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for kitchen database operations.
#[derive(Debug, Clone)]
pub struct KitchenRepository {
    pool: SqlitePool,
}

impl KitchenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        KitchenRepository { pool }
    }

    /// Inserts a new kitchen. A taken code yields `UniqueViolation`.
    pub async fn insert(&self, kitchen: &Kitchen) -> DbResult<()> {
        debug!(id = %kitchen.id, code = %kitchen.code, "Inserting kitchen");

        sqlx::query(
            r#"
            INSERT INTO kitchens (id, code, name, address, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&kitchen.id)
        .bind(&kitchen.code)
        .bind(&kitchen.name)
        .bind(&kitchen.address)
        .bind(kitchen.is_active)
        .bind(kitchen.created_at)
        .bind(kitchen.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&kitchen.code))?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Kitchen>> {
        let kitchen = sqlx::query_as::<_, Kitchen>("SELECT * FROM kitchens WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(kitchen)
    }

    pub async fn latest_code(&self, prefix: &str) -> DbResult<Option<String>> {
        latest_code(&self.pool, "kitchens", prefix).await
    }

    pub async fn list(
        &self,
        filter: &KitchenFilter,
        page: PageRequest,
    ) -> DbResult<(Vec<Kitchen>, i64)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM kitchens WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM kitchens WHERE 1 = 1");
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY code ASC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let kitchens = query.build_query_as::<Kitchen>().fetch_all(&self.pool).await?;
        Ok((kitchens, total))
    }

    /// Updates name, address and active flag. The code never changes.
    pub async fn update(&self, kitchen: &Kitchen) -> DbResult<()> {
        debug!(id = %kitchen.id, "Updating kitchen");

        let result = sqlx::query(
            r#"
            UPDATE kitchens
            SET name = ?2, address = ?3, is_active = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&kitchen.id)
        .bind(&kitchen.name)
        .bind(&kitchen.address)
        .bind(kitchen.is_active)
        .bind(kitchen.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Kitchen", &kitchen.id));
        }

        Ok(())
    }

    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kitchens WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &KitchenFilter) {
    if let Some(active) = filter.is_active {
        query.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query
            .push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR code LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{db, kitchen};

    #[tokio::test]
    async fn test_insert_get_update() {
        let db = db().await;
        let repo = db.kitchens();
        let mut k = kitchen("DAPUR-DPP-001");
        repo.insert(&k).await.unwrap();

        k.name = "Dapur Pusat Baru".to_string();
        repo.update(&k).await.unwrap();

        let loaded = repo.get_by_id(&k.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Dapur Pusat Baru");
        assert_eq!(loaded.code, "DAPUR-DPP-001");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = db().await;
        let err = db.kitchens().update(&kitchen("DAPUR-X-001")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_latest_code_and_duplicates() {
        let db = db().await;
        let repo = db.kitchens();
        repo.insert(&kitchen("DAPUR-DPP-001")).await.unwrap();
        repo.insert(&kitchen("DAPUR-DPP-002")).await.unwrap();

        assert_eq!(
            repo.latest_code("DAPUR-DPP-").await.unwrap().as_deref(),
            Some("DAPUR-DPP-002")
        );

        let err = repo.insert(&kitchen("DAPUR-DPP-002")).await.unwrap_err();
        assert!(err.is_unique_violation_on("code"));

        let (all, total) = repo
            .list(&KitchenFilter::default(), PageRequest::new(Some(1), Some(1)))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].code, "DAPUR-DPP-001");
    }
}
