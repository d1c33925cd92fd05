//! Fee scaling in basis points

use crate::math::{mul_div_ceil, mul_div_floor};
use crate::{MathError, BPS};

/// Amount left after taking a `rate_bps` cut: `floor(amount · (BPS − rate) / BPS)`
pub fn deduct_bps(amount: u64, rate_bps: u64) -> Result<u64, MathError> {
    let keep = BPS.checked_sub(rate_bps).ok_or(MathError::Overflow)?;
    mul_div_floor(amount, keep, BPS)
}

/// Gross amount whose `rate_bps` cut leaves `amount`: `ceil(amount · BPS / (BPS − rate))`
pub fn gross_up_bps(amount: u64, rate_bps: u64) -> Result<u64, MathError> {
    let keep = BPS.checked_sub(rate_bps).ok_or(MathError::Overflow)?;
    mul_div_ceil(amount, BPS, keep)
}

/// Size-dependent fee rate: `min(max, base + slope · amount / balance)`
///
/// An empty leg (`balance == 0`) pays the maximum rate.
pub fn progressive_rate_bps(base: u64, slope: u64, max: u64, amount: u64, balance: u64) -> u64 {
    if balance == 0 {
        return max;
    }
    let growth = (slope as u128) * (amount as u128) / (balance as u128);
    let rate = (base as u128).saturating_add(growth);
    rate.min(max as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_fee_rounding() {
        // 0.3% of 1000 = 3
        assert_eq!(deduct_bps(1000, 30).unwrap(), 997);
        // 0.3% of 999 = 2.997, taker keeps floor
        assert_eq!(deduct_bps(999, 30).unwrap(), 996);
        assert_eq!(gross_up_bps(997, 30).unwrap(), 1000);
        // Gross-up rounds against the taker
        assert_eq!(gross_up_bps(996, 30).unwrap(), 999);
        assert_eq!(deduct_bps(1000, 0).unwrap(), 1000);
    }

    #[test]
    fn test_full_fee_rejected() {
        assert_eq!(deduct_bps(1000, BPS).unwrap(), 0);
        assert_eq!(gross_up_bps(1000, BPS), Err(MathError::DivisionByZero));
        assert_eq!(deduct_bps(1000, BPS + 1), Err(MathError::Overflow));
    }

    #[test]
    fn test_progressive_rate_grows_with_size() {
        let small = progressive_rate_bps(10, 1000, 500, 1_000, 1_000_000);
        let large = progressive_rate_bps(10, 1000, 500, 100_000, 1_000_000);
        assert_eq!(small, 11);
        assert_eq!(large, 110);
        assert_eq!(progressive_rate_bps(10, 1000, 500, 10_000_000, 1_000_000), 500);
        assert_eq!(progressive_rate_bps(10, 1000, 500, 1, 0), 500);
    }

    #[test]
    fn test_gross_then_deduct_covers_net() {
        for amount in [1u64, 7, 99, 1_000, 123_456_789] {
            for rate in [1u64, 30, 250, 9_999] {
                let gross = gross_up_bps(amount, rate).unwrap();
                assert!(deduct_bps(gross, rate).unwrap() >= amount);
            }
        }
    }
}
