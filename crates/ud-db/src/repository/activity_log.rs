//! # Activity Log Repository
//!
//! Append-only store for activity entries written by the engine's
//! post-commit hooks.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use ud_core::{ActivityLogEntry, ActivityModule, PageRequest};

#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    pub actor_id: Option<String>,
    pub module: Option<ActivityModule>,
    pub target_id: Option<String>,
}

/// Repository for activity log rows.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    pool: SqlitePool,
}

impl ActivityLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ActivityLogRepository { pool }
    }

    pub async fn insert(&self, entry: &ActivityLogEntry) -> DbResult<()> {
        debug!(id = %entry.id, actor_id = %entry.actor_id, "Recording activity");

        sqlx::query(
            r#"
            INSERT INTO activity_logs (
                id, actor_id, action, module, description, target_id, metadata, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.actor_id)
        .bind(entry.action)
        .bind(entry.module)
        .bind(&entry.description)
        .bind(&entry.target_id)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Newest entries first.
    pub async fn list(
        &self,
        filter: &ActivityLogFilter,
        page: PageRequest,
    ) -> DbResult<(Vec<ActivityLogEntry>, i64)> {
        let mut count =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM activity_logs WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM activity_logs WHERE 1 = 1");
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC, id ASC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let entries = query
            .build_query_as::<ActivityLogEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok((entries, total))
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &ActivityLogFilter) {
    if let Some(actor_id) = &filter.actor_id {
        query.push(" AND actor_id = ").push_bind(actor_id.clone());
    }
    if let Some(module) = filter.module {
        query.push(" AND module = ").push_bind(module);
    }
    if let Some(target_id) = &filter.target_id {
        query.push(" AND target_id = ").push_bind(target_id.clone());
    }
}
