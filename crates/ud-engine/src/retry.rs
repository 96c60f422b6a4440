//! # Code Allocation with Retry
//!
//! Codes are allocated read-then-write: read the greatest code in scope,
//! increment, insert. Two writers can compute the same code; the UNIQUE
//! index rejects the loser, which re-reads and tries again.
//!
//! ```text
//! attempt 1: latest = TRX-20250115-004 → insert TRX-20250115-005 → UNIQUE ✗
//! attempt 2: latest = TRX-20250115-005 → insert TRX-20250115-006 → ok
//! ```

use std::future::Future;
use tracing::warn;

use ud_core::{CodeScope, CoreError};
use ud_db::{DbError, DbResult};

use crate::error::{EngineError, EngineResult};

/// Allocates a code in `scope` and hands it to `insert`, retrying up to
/// `max_attempts` times when the insert loses a race on the `code` column.
///
/// `latest` returns the greatest existing code with the scope's prefix.
/// Any other error from either closure is returned as is.
pub async fn with_code<T, L, LF, I, IF>(
    scope: &CodeScope,
    max_attempts: u32,
    mut latest: L,
    mut insert: I,
) -> EngineResult<T>
where
    L: FnMut(String) -> LF,
    LF: Future<Output = DbResult<Option<String>>>,
    I: FnMut(String) -> IF,
    IF: Future<Output = EngineResult<T>>,
{
    let prefix = scope.prefix();
    let mut last_code = String::new();

    for attempt in 1..=max_attempts.max(1) {
        let current = latest(prefix.clone()).await?;
        let code = scope.next_code(current.as_deref());

        match insert(code.clone()).await {
            Err(EngineError::Db(err)) if is_code_conflict(&err) => {
                warn!(code = %code, attempt, max_attempts, "Code already taken, re-allocating");
                last_code = code;
            }
            other => return other,
        }
    }

    Err(CoreError::DuplicateCode { code: last_code }.into())
}

fn is_code_conflict(err: &DbError) -> bool {
    err.is_unique_violation_on("code")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use ud_core::ErrorKind;

    fn scope() -> CodeScope {
        CodeScope::trading_unit("Usaha Dagang Maju")
    }

    #[tokio::test]
    async fn test_first_attempt_wins() {
        let code = with_code(
            &scope(),
            3,
            |_| async { DbResult::Ok(Some("UD-UDM-004".to_string())) },
            |code| async move { EngineResult::Ok(code) },
        )
        .await
        .unwrap();
        assert_eq!(code, "UD-UDM-005");
    }

    #[tokio::test]
    async fn test_retries_after_conflict() {
        let calls = Arc::new(AtomicU32::new(0));
        let latest_calls = calls.clone();

        let code = with_code(
            &scope(),
            3,
            move |_| {
                // Another writer commits 001 between our first read and insert.
                let n = latest_calls.fetch_add(1, Ordering::SeqCst);
                async move { DbResult::Ok((n > 0).then(|| "UD-UDM-001".to_string())) }
            },
            |code| async move {
                if code == "UD-UDM-001" {
                    Err(EngineError::from(DbError::duplicate("trading_units.code", code)))
                } else {
                    Ok(code)
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(code, "UD-UDM-002");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_with_duplicate_code() {
        let err = with_code(
            &scope(),
            2,
            |_| async { DbResult::Ok(None) },
            |code| async move {
                Err::<String, _>(EngineError::from(DbError::duplicate("trading_units.code", code)))
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DuplicateCode);
        assert!(err.to_string().contains("UD-UDM-001"));
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let err = with_code(
            &scope(),
            3,
            |_| async { DbResult::Ok(None) },
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<String, _>(EngineError::from(DbError::PoolExhausted)) }
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
