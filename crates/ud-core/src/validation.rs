//! # Validation Module
//!
//! Input validation utilities for UD Ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Engine boundary (ud-engine services)                         │
//! │  ├── Capability checks                                                 │
//! │  └── THIS MODULE: field rules (required, length, ranges)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain rules (pricing, lifecycle, period guard)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints on codes                                       │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ud_core::validation::{validate_name, validate_required};
//!
//! validate_name("name", "Usaha Dagang Maju").unwrap();
//! assert!(validate_required("period_id", "  ").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_required(field, name)?;

    if name.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Fails when a required string is empty or whitespace.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Trims a free-text search term; `None` when nothing is left.
pub fn normalize_search(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Prices may be zero but never negative.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Dapur Pusat").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(matches!(
            validate_name("name", &"x".repeat(MAX_NAME_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("sale_price", Money::zero()).is_ok());
        assert!(validate_price("sale_price", Money::from_amount(10_000)).is_ok());
        assert!(validate_price("cost_price", Money::from_amount(-1)).is_err());
    }

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search(Some("  beras ")), Some("beras".to_string()));
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(None), None);
    }
}
