//! Concentrated liquidity deltas
//!
//! A position over `[price_min, price_max]` holding real reserves `(a, b)` at
//! `price` (units of `b` per `a`) behaves like a constant product pool over
//! virtual reserves `(a + delta_a, b + delta_b)` with
//!
//! - `delta_a = a / (sqrt(price_max / price) − 1)`
//! - `delta_b = b / (sqrt(price / price_min) − 1)`
//!
//! Deltas are computed once when the program is authored and passed as
//! instruction arguments.

use crate::math::{ratio_wad, sqrt_wad, to_u64};
use crate::{MathError, WAD};

/// Virtual reserve growth for a price band; all prices are WAD-scaled
pub fn price_range_deltas(
    balance_a: u64,
    balance_b: u64,
    price: u128,
    price_min: u128,
    price_max: u128,
) -> Result<(u64, u64), MathError> {
    if price == 0 || price_min == 0 || !(price_min < price && price < price_max) {
        return Err(MathError::InvalidRange);
    }

    let upper = sqrt_wad(ratio_wad(price_max, price)?);
    let lower = sqrt_wad(ratio_wad(price, price_min)?);

    Ok((scale_by_excess(balance_a, upper)?, scale_by_excess(balance_b, lower)?))
}

/// `balance · WAD / (root − WAD)`
fn scale_by_excess(balance: u64, root: u128) -> Result<u64, MathError> {
    let wad = WAD as u128;
    if root <= wad {
        // Band narrower than the WAD resolution
        return Err(MathError::InvalidRange);
    }
    to_u64((balance as u128) * wad / (root - wad))
}
