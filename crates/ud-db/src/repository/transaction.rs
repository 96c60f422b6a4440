//! # Transaction Repository
//!
//! Database operations for transaction headers and their line items.
//!
//! ## Atomic Item Replacement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update_draft(header, Some(items))                                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE transactions SET ...totals... WHERE id = ? AND status='draft' │
//! │    DELETE FROM line_items WHERE transaction_id = ?                      │
//! │    INSERT INTO line_items ... (one per accepted item)                   │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls back: old items and old totals stay in place.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Header and items are always written together, so a reader never sees new
//! items with old totals.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::latest_code;
use crate::error::{DbError, DbResult};
use ud_core::{
    LineItem, Money, PageRequest, Totals, TradingUnitSales, Transaction, TransactionStatus,
};

/// List filters. All present filters must match.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub period_id: Option<String>,
    pub kitchen_id: Option<String>,
    pub status: Option<TransactionStatus>,
    /// Inclusive lower bound on the transaction date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the transaction date.
    pub date_to: Option<NaiveDate>,
}

/// Count and sums over completed transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletedTotals {
    pub count: i64,
    pub total_sale: Money,
    pub total_cost: Money,
    pub total_profit: Money,
}

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a header together with its initial items in one database
    /// transaction.
    ///
    /// ## Errors
    /// `UniqueViolation` on `transactions.code` when another writer took the
    /// code first. Nothing is written in that case.
    pub async fn insert_with_items(
        &self,
        header: &Transaction,
        items: &[LineItem],
    ) -> DbResult<()> {
        debug!(
            id = %header.id,
            code = %header.code,
            items = items.len(),
            "Inserting transaction"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, code, period_id, kitchen_id, transaction_date, status, created_by,
                total_sale, total_cost, total_profit, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&header.id)
        .bind(&header.code)
        .bind(&header.period_id)
        .bind(&header.kitchen_id)
        .bind(header.transaction_date)
        .bind(header.status)
        .bind(&header.created_by)
        .bind(header.total_sale)
        .bind(header.total_cost)
        .bind(header.total_profit)
        .bind(header.created_at)
        .bind(header.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&header.code))?;

        insert_items(&mut tx, items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Writes header fields of a draft and, when `items` is given, replaces
    /// the whole item set. Both happen in one database transaction.
    ///
    /// ## Errors
    /// `NotFound` when the transaction does not exist or is no longer a
    /// draft; nothing changes in that case.
    pub async fn update_draft(
        &self,
        header: &Transaction,
        items: Option<&[LineItem]>,
    ) -> DbResult<()> {
        debug!(
            id = %header.id,
            replace_items = items.map(<[LineItem]>::len),
            "Updating draft transaction"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET period_id = ?2, kitchen_id = ?3, transaction_date = ?4,
                total_sale = ?5, total_cost = ?6, total_profit = ?7, updated_at = ?8
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(&header.id)
        .bind(&header.period_id)
        .bind(&header.kitchen_id)
        .bind(header.transaction_date)
        .bind(header.total_sale)
        .bind(header.total_cost)
        .bind(header.total_profit)
        .bind(header.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping `tx` rolls back.
            return Err(DbError::not_found("Draft transaction", &header.id));
        }

        if let Some(items) = items {
            sqlx::query("DELETE FROM line_items WHERE transaction_id = ?1")
                .bind(&header.id)
                .execute(&mut *tx)
                .await?;

            insert_items(&mut tx, items).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Moves a draft to `completed` with the given totals.
    ///
    /// `NotFound` when the row is missing or not a draft.
    pub async fn complete(&self, id: &str, totals: &Totals, at: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, total_sale = %totals.total_sale, "Completing transaction");

        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'completed', total_sale = ?2, total_cost = ?3, total_profit = ?4,
                updated_at = ?5
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(id)
        .bind(totals.total_sale)
        .bind(totals.total_cost)
        .bind(totals.total_profit)
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Draft transaction", id));
        }

        Ok(())
    }

    /// Moves a non-cancelled transaction to `cancelled`. Items and totals are
    /// left alone.
    pub async fn cancel(&self, id: &str, at: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Cancelling transaction");

        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'cancelled', updated_at = ?2
            WHERE id = ?1 AND status != 'cancelled'
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Active transaction", id));
        }

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let header = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(header)
    }

    /// Line items of a transaction in insertion order.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<LineItem>> {
        let items = sqlx::query_as::<_, LineItem>(
            "SELECT * FROM line_items WHERE transaction_id = ?1 ORDER BY position ASC",
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn latest_code(&self, prefix: &str) -> DbResult<Option<String>> {
        latest_code(&self.pool, "transactions", prefix).await
    }

    /// Lists headers, newest transaction date first.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> DbResult<(Vec<Transaction>, i64)> {
        let mut count =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM transactions WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM transactions WHERE 1 = 1");
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY transaction_date DESC, code DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let headers = query
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = headers.len(), total, "Listed transactions");
        Ok((headers, total))
    }

    /// Count and sums of completed transactions, optionally for one period.
    pub async fn completed_totals(&self, period_id: Option<&str>) -> DbResult<CompletedTotals> {
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(total_sale), 0),
                   COALESCE(SUM(total_cost), 0),
                   COALESCE(SUM(total_profit), 0)
            FROM transactions
            WHERE status = 'completed'
            "#,
        );
        if let Some(period_id) = period_id {
            query.push(" AND period_id = ").push_bind(period_id.to_string());
        }

        let (count, sale, cost, profit): (i64, i64, i64, i64) =
            query
                .build_query_as::<(i64, i64, i64, i64)>()
                .fetch_one(&self.pool)
                .await?;

        Ok(CompletedTotals {
            count,
            total_sale: Money::from_amount(sale),
            total_cost: Money::from_amount(cost),
            total_profit: Money::from_amount(profit),
        })
    }

    /// Per trading unit sums of line items on completed transactions, highest
    /// sale total first.
    pub async fn sales_by_trading_unit(
        &self,
        period_id: Option<&str>,
    ) -> DbResult<Vec<TradingUnitSales>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT li.trading_unit_id        AS trading_unit_id,
                   COALESCE(tu.code, '')     AS code,
                   COALESCE(tu.name, '')     AS name,
                   SUM(li.quantity)          AS total_quantity,
                   SUM(li.subtotal_sale)     AS total_sale,
                   SUM(li.subtotal_cost)     AS total_cost,
                   SUM(li.profit)            AS total_profit
            FROM line_items li
            INNER JOIN transactions t ON t.id = li.transaction_id
            LEFT JOIN trading_units tu ON tu.id = li.trading_unit_id
            WHERE t.status = 'completed'
            "#,
        );
        if let Some(period_id) = period_id {
            query.push(" AND t.period_id = ").push_bind(period_id.to_string());
        }
        query.push(" GROUP BY li.trading_unit_id ORDER BY total_sale DESC, code ASC");

        let rows = query
            .build_query_as::<TradingUnitSales>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

/// Inserts items on an open connection (always inside a database transaction).
async fn insert_items(conn: &mut SqliteConnection, items: &[LineItem]) -> DbResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO line_items (
                id, transaction_id, goods_id, trading_unit_id, position, quantity,
                sale_price, cost_price, subtotal_sale, subtotal_cost, profit, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&item.id)
        .bind(&item.transaction_id)
        .bind(&item.goods_id)
        .bind(&item.trading_unit_id)
        .bind(item.position)
        .bind(item.quantity)
        .bind(item.sale_price)
        .bind(item.cost_price)
        .bind(item.subtotal_sale)
        .bind(item.subtotal_cost)
        .bind(item.profit)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &TransactionFilter) {
    if let Some(period_id) = &filter.period_id {
        query.push(" AND period_id = ").push_bind(period_id.clone());
    }
    if let Some(kitchen_id) = &filter.kitchen_id {
        query.push(" AND kitchen_id = ").push_bind(kitchen_id.clone());
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(from) = filter.date_from {
        query.push(" AND transaction_date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        query.push(" AND transaction_date <= ").push_bind(to);
    }
}
