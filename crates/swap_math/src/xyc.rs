//! Constant product math (x·y=k)
//!
//! Exact-in:  `amount_out = floor(amount_in · balance_out / (balance_in + amount_in))`
//! Exact-out: `amount_in  = ceil(amount_out · balance_in / (balance_out − amount_out))`
//!
//! Floor on what the pool pays and ceiling on what the pool receives keep
//! `balance_in · balance_out` from ever decreasing.

use crate::math::to_u64;
use crate::MathError;

/// Output amount for an exact input amount
pub fn quote_exact_in(balance_in: u64, balance_out: u64, amount_in: u64) -> Result<u64, MathError> {
    if balance_in == 0 || balance_out == 0 {
        return Err(MathError::InsufficientLiquidity);
    }

    let numerator = (amount_in as u128) * (balance_out as u128);
    let denominator = balance_in as u128 + amount_in as u128;

    // amount_out < balance_out always holds here since amount_in / (balance_in + amount_in) < 1
    to_u64(numerator / denominator)
}

/// Input amount required for an exact output amount
pub fn quote_exact_out(balance_in: u64, balance_out: u64, amount_out: u64) -> Result<u64, MathError> {
    if balance_in == 0 || balance_out == 0 {
        return Err(MathError::InsufficientLiquidity);
    }
    if amount_out >= balance_out {
        return Err(MathError::InsufficientLiquidity);
    }

    let numerator = (amount_out as u128) * (balance_in as u128);
    let denominator = (balance_out - amount_out) as u128;

    to_u64(numerator.div_ceil(denominator))
}
