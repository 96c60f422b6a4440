//! # Store Errors
//!
//! `sqlx::Error` is folded into [`DbError`] at the repository boundary. The
//! engine only looks at three shapes:
//!
//! ```text
//! UniqueViolation on *.code   → re-allocate the code and retry
//! NotFound                    → guarded write touched no row, re-read status
//! anything else               → STORAGE
//! ```

use thiserror::Error;

/// Failure of a store call.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - An UPDATE/DELETE by id touched zero rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two writers allocated the same transaction, UD or kitchen code
    /// - Any other UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Goods pointing at a missing trading unit
    /// - Transaction pointing at a missing period or kitchen
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin/commit of a database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (acquire timed out).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value of a unique violation raised by SQLite,
    /// which only reports `table.column`.
    ///
    /// Other errors pass through untouched.
    pub fn with_duplicate_value(self, value: impl Into<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.into(),
            },
            other => other,
        }
    }

    /// True when this is a unique violation on a column named `column`
    /// (`transactions.code` matches `"code"`).
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        match self {
            DbError::UniqueViolation { field, .. } => {
                field == column || field.rsplit('.').next() == Some(column)
            }
            _ => false,
        }
    }
}

/// SQLite reports constraint failures only as message text, so the
/// message prefix decides the variant.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.trim().to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_column_match() {
        let err = DbError::duplicate("transactions.code", "unknown");
        assert!(err.is_unique_violation_on("code"));
        assert!(!err.is_unique_violation_on("id"));

        let err = DbError::duplicate("code", "TRX-20250101-001");
        assert!(err.is_unique_violation_on("code"));

        assert!(!DbError::PoolExhausted.is_unique_violation_on("code"));
    }

    #[test]
    fn test_with_duplicate_value() {
        let err =
            DbError::duplicate("kitchens.code", "unknown").with_duplicate_value("DAPUR-DPP-001");
        assert_eq!(
            err.to_string(),
            "Duplicate kitchens.code: 'DAPUR-DPP-001' already exists"
        );

        let err = DbError::PoolExhausted.with_duplicate_value("x");
        assert!(matches!(err, DbError::PoolExhausted));
    }
}
