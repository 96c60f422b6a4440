//! # Transaction Lifecycle
//!
//! Decides whether a requested transition is legal from the current status.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────┬───────────────┬───────────────────┬───────────────────┐
//! │ from \ op   │ update        │ complete          │ cancel            │
//! ├─────────────┼───────────────┼───────────────────┼───────────────────┤
//! │ draft       │ draft         │ completed         │ cancelled         │
//! │ completed   │ INVALID       │ INVALID           │ cancelled         │
//! │ cancelled   │ INVALID       │ INVALID           │ ALREADY_CANCELLED │
//! └─────────────┴───────────────┴───────────────────┴───────────────────┘
//! ```
//!
//! A rejected transition is a no-op: callers check before writing.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::TransactionStatus;

/// A requested lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Update,
    Complete,
    Cancel,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::Update => "update",
            Transition::Complete => "complete",
            Transition::Cancel => "cancel",
        })
    }
}

/// Validates `transition` from `current` and returns the resulting status.
///
/// ## Example
/// ```rust
/// use ud_core::lifecycle::{check, Transition};
/// use ud_core::TransactionStatus;
///
/// let next = check("trx-1", TransactionStatus::Draft, Transition::Complete).unwrap();
/// assert_eq!(next, TransactionStatus::Completed);
/// ```
pub fn check(
    transaction_id: &str,
    current: TransactionStatus,
    transition: Transition,
) -> CoreResult<TransactionStatus> {
    use TransactionStatus::*;

    match (transition, current) {
        (Transition::Update, Draft) => Ok(Draft),
        (Transition::Complete, Draft) => Ok(Completed),
        (Transition::Cancel, Cancelled) => Err(CoreError::AlreadyCancelled {
            transaction_id: transaction_id.to_string(),
        }),
        (Transition::Cancel, _) => Ok(Cancelled),
        (Transition::Update | Transition::Complete, status) => Err(CoreError::InvalidTransition {
            transaction_id: transaction_id.to_string(),
            status,
            transition,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use TransactionStatus::*;

    #[test]
    fn test_draft_accepts_everything() {
        assert_eq!(check("t", Draft, Transition::Update).unwrap(), Draft);
        assert_eq!(check("t", Draft, Transition::Complete).unwrap(), Completed);
        assert_eq!(check("t", Draft, Transition::Cancel).unwrap(), Cancelled);
    }

    #[test]
    fn test_completed_can_only_be_cancelled() {
        assert_eq!(check("t", Completed, Transition::Cancel).unwrap(), Cancelled);
        for op in [Transition::Update, Transition::Complete] {
            let err = check("t", Completed, op).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        }
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let err = check("t", Cancelled, Transition::Cancel).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyCancelled);

        for op in [Transition::Update, Transition::Complete] {
            let err = check("t", Cancelled, op).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        }
    }
}
