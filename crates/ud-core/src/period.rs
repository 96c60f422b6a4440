//! # Period Guard
//!
//! Gatekeeper for anything that writes into a period.
//!
//! Invoked before transaction creation, transaction update, period update,
//! period deletion and period close. Reads never consult it.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Period;

/// Fails with [`CoreError::PeriodClosed`] when the period is closed.
pub fn assert_open(period: &Period) -> CoreResult<()> {
    if period.is_closed {
        return Err(CoreError::PeriodClosed {
            period_id: period.id.clone(),
        });
    }
    Ok(())
}

/// End must be strictly after start.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end <= start {
        return Err(ValidationError::InvalidDateRange { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(is_closed: bool) -> Period {
        let now = Utc::now();
        Period {
            id: "p-1".into(),
            name: "Q1".into(),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 3, 31),
            is_active: true,
            is_closed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_open_period_passes() {
        assert!(assert_open(&period(false)).is_ok());
    }

    #[test]
    fn test_closed_period_fails() {
        let err = assert_open(&period(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PeriodClosed);
        assert_eq!(err.to_string(), "Period p-1 is closed");
    }

    #[test]
    fn test_date_range() {
        assert!(validate_date_range(date(2025, 1, 1), date(2025, 1, 2)).is_ok());
        assert!(validate_date_range(date(2025, 1, 1), date(2025, 1, 1)).is_err());
        assert!(validate_date_range(date(2025, 1, 1), date(2024, 12, 31)).is_err());
    }
}
