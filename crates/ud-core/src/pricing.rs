//! # Line Pricing
//!
//! Computes the money figures of a single line item.
//!
//! ```text
//! subtotal_sale = sale_price × quantity
//! subtotal_cost = cost_price × quantity
//! profit        = subtotal_sale − subtotal_cost
//! ```
//!
//! No rounding happens here. Quantity must be positive.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// The computed money figures of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LinePricing {
    pub subtotal_sale: Money,
    pub subtotal_cost: Money,
    pub profit: Money,
}

/// Prices one line.
///
/// ## Errors
/// - [`CoreError::InvalidQuantity`] when `quantity <= 0`
/// - [`CoreError::Validation`] when a subtotal does not fit in an i64
///
/// ## Example
/// ```rust
/// use ud_core::money::Money;
/// use ud_core::pricing::compute;
///
/// let line = compute("goods-a", Money::from_amount(10_000), Money::from_amount(6_000), 3).unwrap();
/// assert_eq!(line.subtotal_sale.amount(), 30_000);
/// assert_eq!(line.subtotal_cost.amount(), 18_000);
/// assert_eq!(line.profit.amount(), 12_000);
/// ```
pub fn compute(
    goods_id: &str,
    sale_price: Money,
    cost_price: Money,
    quantity: i64,
) -> CoreResult<LinePricing> {
    if quantity <= 0 {
        return Err(CoreError::InvalidQuantity {
            goods_id: goods_id.to_string(),
            quantity,
        });
    }

    let subtotal_sale = sale_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| overflow("subtotal_sale"))?;
    let subtotal_cost = cost_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| overflow("subtotal_cost"))?;

    let profit = subtotal_sale
        .checked_sub(subtotal_cost)
        .ok_or_else(|| overflow("profit"))?;

    Ok(LinePricing {
        subtotal_sale,
        subtotal_cost,
        profit,
    })
}

pub(crate) fn overflow(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: i64::MIN,
        max: i64::MAX,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_basic_line() {
        let line = compute("a", Money::from_amount(10_000), Money::from_amount(6_000), 3).unwrap();
        assert_eq!(line.subtotal_sale, Money::from_amount(30_000));
        assert_eq!(line.subtotal_cost, Money::from_amount(18_000));
        assert_eq!(line.profit, Money::from_amount(12_000));
    }

    #[test]
    fn test_selling_below_cost_gives_negative_profit() {
        let line = compute("a", Money::from_amount(500), Money::from_amount(700), 2).unwrap();
        assert_eq!(line.profit, Money::from_amount(-400));
    }

    #[test]
    fn test_zero_cost_defaults() {
        let line = compute("a", Money::from_amount(2_500), Money::zero(), 4).unwrap();
        assert_eq!(line.subtotal_cost, Money::zero());
        assert_eq!(line.profit, line.subtotal_sale);
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        for qty in [0, -1, -100] {
            let err = compute("g-1", Money::from_amount(1), Money::zero(), qty).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidQuantity);
        }
    }

    #[test]
    fn test_overflow_is_validation_failure() {
        let err = compute("g", Money::from_amount(i64::MAX), Money::zero(), 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }
}
