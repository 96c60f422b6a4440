//! # Engine Error Types
//!
//! What callers of the engine see.
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Engine Error Mapping                                 │
//! │                                                                         │
//! │  CoreError::*              → its own ErrorKind                         │
//! │  DbError::NotFound         → NOT_FOUND                                 │
//! │  DbError::UniqueViolation  → DUPLICATE_CODE                            │
//! │  DbError::ForeignKey...    → NOT_FOUND (a referenced row is missing)   │
//! │  DbError::* (other)        → STORAGE                                   │
//! │  Forbidden                 → FORBIDDEN                                 │
//! │  Config                    → VALIDATION_FAILED                         │
//! │                                                                         │
//! │  EngineError ──► ErrorBody { code: "PERIOD_CLOSED", message: "..." }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use ud_core::{CoreError, ErrorKind, ValidationError};
use ud_db::DbError;

use crate::actor::{Capability, Role};

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A business rule was violated.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed.
    #[error(transparent)]
    Db(#[from] DbError),

    /// The actor's role lacks the capability the operation needs.
    #[error("Role {role} is not allowed to {capability}")]
    Forbidden { role: Role, capability: Capability },

    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::Config(format!("TOML serialize error: {}", err))
    }
}

impl EngineError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::Core(CoreError::not_found(entity, id))
    }

    /// Stable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Core(err) => err.kind(),
            EngineError::Db(DbError::NotFound { .. }) => ErrorKind::NotFound,
            EngineError::Db(DbError::ForeignKeyViolation { .. }) => ErrorKind::NotFound,
            EngineError::Db(DbError::UniqueViolation { .. }) => ErrorKind::DuplicateCode,
            EngineError::Db(_) => ErrorKind::Storage,
            EngineError::Forbidden { .. } => ErrorKind::Forbidden,
            EngineError::Config(_) => ErrorKind::ValidationFailed,
        }
    }

    /// Machine code plus message, ready to serialize.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.kind().code(),
            message: self.to_string(),
        }
    }
}

/// Serialized error payload for the API layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl From<&EngineError> for ErrorBody {
    fn from(err: &EngineError) -> Self {
        err.to_body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let closed = EngineError::from(CoreError::PeriodClosed {
            period_id: "p-1".into(),
        });
        assert_eq!(closed.kind(), ErrorKind::PeriodClosed);

        let missing = EngineError::from(DbError::not_found("Goods", "g-1"));
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let dup = EngineError::from(DbError::duplicate("transactions.code", "TRX-20250115-001"));
        assert_eq!(dup.kind(), ErrorKind::DuplicateCode);

        let storage = EngineError::from(DbError::PoolExhausted);
        assert_eq!(storage.kind(), ErrorKind::Storage);

        let forbidden = EngineError::Forbidden {
            role: Role::UdOperator,
            capability: Capability::ManagePeriods,
        };
        assert_eq!(forbidden.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_error_body_json() {
        let err = EngineError::from(CoreError::AlreadyCancelled {
            transaction_id: "t-1".into(),
        });
        let json = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(json["code"], "ALREADY_CANCELLED");
        assert_eq!(json["message"], "Transaction t-1 is already cancelled");
    }

    #[test]
    fn test_validation_is_wrapped_as_core() {
        let err = EngineError::from(ValidationError::Required {
            field: "name".into(),
        });
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.to_string(), "Validation error: name is required");
    }
}
