//! # Transaction Aggregation
//!
//! Sums line subtotals into header totals. Always fed the items as they are
//! persisted, never a cached copy.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::pricing::overflow;
use crate::types::{LineItem, Transaction};

/// Header totals of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub total_sale: Money,
    pub total_cost: Money,
    pub total_profit: Money,
}

impl Totals {
    /// Writes these totals onto a transaction header.
    pub fn apply_to(&self, transaction: &mut Transaction) {
        transaction.total_sale = self.total_sale;
        transaction.total_cost = self.total_cost;
        transaction.total_profit = self.total_profit;
    }
}

/// Recomputes totals from a set of line items.
///
/// `total_profit` is derived from the two sums rather than summed per line,
/// so it equals `total_sale - total_cost` by construction. An empty set
/// yields all zeros.
///
/// ## Errors
/// [`crate::CoreError::Validation`] when a sum does not fit in an i64. Each
/// line may fit on its own while their total does not.
pub fn recompute<'a, I>(items: I) -> CoreResult<Totals>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let mut total_sale = Money::zero();
    let mut total_cost = Money::zero();
    for item in items {
        total_sale = total_sale
            .checked_add(item.subtotal_sale)
            .ok_or_else(|| overflow("total_sale"))?;
        total_cost = total_cost
            .checked_add(item.subtotal_cost)
            .ok_or_else(|| overflow("total_cost"))?;
    }

    let total_profit = total_sale
        .checked_sub(total_cost)
        .ok_or_else(|| overflow("total_profit"))?;

    Ok(Totals {
        total_sale,
        total_cost,
        total_profit,
    })
}
