//! Checked Amount Arithmetic
//!
//! Costs and payouts are products of caller-supplied counts and configured
//! unit prices. All of it is integer math with explicit overflow errors;
//! nothing wraps and nothing rounds.

use crate::error::EconomyError;
use super::id::Amount;

/// `count * unit`, failing on overflow.
#[inline]
pub fn checked_cost(count: u64, unit: Amount) -> Result<Amount, EconomyError> {
    (count as Amount)
        .checked_mul(unit)
        .ok_or(EconomyError::ArithmeticOverflow)
}

/// Sum of amounts, failing on overflow.
pub fn checked_sum<I>(values: I) -> Result<Amount, EconomyError>
where
    I: IntoIterator<Item = Amount>,
{
    values.into_iter().try_fold(0 as Amount, |acc, v| {
        acc.checked_add(v).ok_or(EconomyError::ArithmeticOverflow)
    })
}

/// `ceil(numerator / denominator)`. Zero denominator yields zero.
#[inline]
pub fn ceil_div(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    numerator / denominator + u64::from(numerator % denominator != 0)
}
