//! Valuation rebalancing
//!
//! Given the fair value `v` of the input asset (a WAD fraction, the output
//! asset is worth `1 − v`), move the reserves to the point where
//! `balance_out / balance_in = v / (1 − v)` while keeping the weighted
//! capitalization `v·balance_in + (1 − v)·balance_out` unchanged. Each side
//! then carries exactly half of the capitalization.

use crate::math::{mul_div_ceil, mul_div_floor, to_u64};
use crate::{MathError, BPS, WAD};

/// Rebalanced `(balance_in, balance_out)` for valuation `v_in` in `(0, WAD)`
pub fn rebalance(balance_in: u64, balance_out: u64, v_in: u64) -> Result<(u64, u64), MathError> {
    if v_in == 0 || v_in >= WAD {
        return Err(MathError::InvalidRange);
    }
    let v = v_in as u128;
    let w = (WAD - v_in) as u128;

    let capital = v * balance_in as u128 + w * balance_out as u128;

    let new_in = to_u64(capital / (2 * v))?;
    let new_out = to_u64(capital / (2 * w))?;
    Ok((new_in, new_out))
}

/// Clamp `target` into `[current·(BPS−d)/BPS, current·(BPS+d)/BPS]`
pub fn clamp_delta_bps(current: u64, target: u64, max_delta_bps: u64) -> Result<u64, MathError> {
    let low = mul_div_ceil(current, BPS.saturating_sub(max_delta_bps), BPS)?;
    let high = mul_div_floor(current, BPS + max_delta_bps, BPS).unwrap_or(u64::MAX);
    Ok(target.clamp(low, high.max(low)))
}
