//! # Error Types
//!
//! Domain-specific error types for ud-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ud-core errors (this file)                                            │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Stable, machine-readable error codes           │
//! │                                                                         │
//! │  ud-db errors (separate crate)                                         │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  ud-engine errors                                                      │
//! │  └── EngineError      - What the API layer sees (kind + message)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → ErrorBody           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, codes, statuses)
//! 3. Every variant maps to exactly one [`ErrorKind`]

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::lifecycle::Transition;
use crate::types::TransactionStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// A rejected operation never leaves partial state behind: callers check
/// these before anything is written.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The owning period is closed and accepts no further mutation.
    ///
    /// ## When This Occurs
    /// - Creating a transaction in a closed period
    /// - Updating a transaction (header or items) whose period is closed
    /// - Updating, deleting or re-closing the period itself
    #[error("Period {period_id} is closed")]
    PeriodClosed { period_id: String },

    /// The requested lifecycle move is not legal from the current status.
    ///
    /// ## When This Occurs
    /// ```text
    /// update   on completed/cancelled  → InvalidTransition
    /// complete on completed/cancelled  → InvalidTransition
    /// ```
    #[error("Transaction {transaction_id} is {status}, cannot {transition}")]
    InvalidTransition {
        transaction_id: String,
        status: TransactionStatus,
        transition: Transition,
    },

    /// Cancel was requested on a transaction that is already cancelled.
    #[error("Transaction {transaction_id} is already cancelled")]
    AlreadyCancelled { transaction_id: String },

    /// A generated code collided with an existing one and retries ran out.
    #[error("Code '{code}' already exists")]
    DuplicateCode { code: String },

    /// A line item quantity is zero or negative.
    #[error("Invalid quantity {quantity} for goods {goods_id}: must be positive")]
    InvalidQuantity { goods_id: String, quantity: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns the stable kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::PeriodClosed { .. } => ErrorKind::PeriodClosed,
            CoreError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            CoreError::AlreadyCancelled { .. } => ErrorKind::AlreadyCancelled,
            CoreError::DuplicateCode { .. } => ErrorKind::DuplicateCode,
            CoreError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            CoreError::Validation(_) => ErrorKind::ValidationFailed,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business rule runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// End date is not strictly after start date.
    #[error("end date {end} must be after start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Entity cannot be removed while other records still reference it.
    #[error("{entity} {id} is still referenced by {count} record(s)")]
    StillReferenced {
        entity: String,
        id: String,
        count: i64,
    },
}

// =============================================================================
// Error Kind
// =============================================================================

/// Stable error categories exposed to callers.
///
/// `Forbidden` and `Storage` are never produced by ud-core itself; they are
/// raised by the engine boundary and the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    PeriodClosed,
    InvalidTransition,
    AlreadyCancelled,
    DuplicateCode,
    ValidationFailed,
    InvalidQuantity,
    Forbidden,
    Storage,
}

impl ErrorKind {
    /// Machine-readable code, identical to the serialized form.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::PeriodClosed => "PERIOD_CLOSED",
            ErrorKind::InvalidTransition => "INVALID_TRANSITION",
            ErrorKind::AlreadyCancelled => "ALREADY_CANCELLED",
            ErrorKind::DuplicateCode => "DUPLICATE_CODE",
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::InvalidQuantity => "INVALID_QUANTITY",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::Storage => "STORAGE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidTransition {
            transaction_id: "trx-1".to_string(),
            status: TransactionStatus::Completed,
            transition: Transition::Update,
        };
        assert_eq!(err.to_string(), "Transaction trx-1 is completed, cannot update");

        let err = CoreError::not_found("Period", "p-9");
        assert_eq!(err.to_string(), "Period not found: p-9");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "end date 2024-12-31 must be after start date 2025-01-01"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "kitchen_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn test_kind_codes_are_stable() {
        assert_eq!(ErrorKind::PeriodClosed.code(), "PERIOD_CLOSED");
        assert_eq!(
            serde_json::to_string(&ErrorKind::AlreadyCancelled).unwrap(),
            "\"ALREADY_CANCELLED\""
        );
        let err = CoreError::AlreadyCancelled {
            transaction_id: "t".into(),
        };
        assert_eq!(err.kind().to_string(), "ALREADY_CANCELLED");
    }
}
