//! Fixed-point helpers: mul-div with explicit rounding, WAD power and square root

use crate::{MathError, WAD};

/// Narrow a `u128` intermediate back to `u64`
#[inline]
pub fn to_u64(value: u128) -> Result<u64, MathError> {
    u64::try_from(value).map_err(|_| MathError::Overflow)
}

/// `floor(a * b / d)`
#[inline]
pub fn mul_div_floor(a: u64, b: u64, d: u64) -> Result<u64, MathError> {
    if d == 0 {
        return Err(MathError::DivisionByZero);
    }
    to_u64((a as u128) * (b as u128) / (d as u128))
}

/// `ceil(a * b / d)`
#[inline]
pub fn mul_div_ceil(a: u64, b: u64, d: u64) -> Result<u64, MathError> {
    if d == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = (a as u128) * (b as u128);
    to_u64(product.div_ceil(d as u128))
}

/// `base^exp` where `base` is a WAD fraction, floored at every step
///
/// Bases above `WAD` are allowed (price bumps) as long as the result fits.
pub fn pow_wad(base: u64, mut exp: u64) -> Result<u64, MathError> {
    let wad = WAD as u128;
    let mut result = wad;
    let mut b = base as u128;

    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(b).ok_or(MathError::Overflow)? / wad;
        }
        exp >>= 1;
        if exp > 0 {
            b = b.checked_mul(b).ok_or(MathError::Overflow)? / wad;
        }
        if result == 0 {
            return Ok(0);
        }
    }

    to_u64(result)
}

/// Integer square root (floor)
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // Initial guess is a power of two not below sqrt(n)
    let bits = 128 - n.leading_zeros();
    let mut x: u128 = 1 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Square root of a WAD value, as a WAD value
///
/// Falls back to `isqrt(x) * 1e9` when `x * WAD` does not fit `u128`.
pub fn sqrt_wad(x: u128) -> u128 {
    match x.checked_mul(WAD as u128) {
        Some(scaled) => isqrt(scaled),
        None => isqrt(x) * 1_000_000_000,
    }
}

/// `num / den` as a WAD value without 256-bit intermediates
///
/// Large operands are shifted down together, which only drops precision far
/// below one WAD unit.
pub fn ratio_wad(num: u128, den: u128) -> Result<u128, MathError> {
    if den == 0 {
        return Err(MathError::DivisionByZero);
    }
    let shift = (128 - den.leading_zeros()).saturating_sub(68);
    let (num, den) = (num >> shift, den >> shift);
    let whole = num / den;
    let rem = num % den;
    whole
        .checked_mul(WAD as u128)
        .and_then(|w| w.checked_add(rem * WAD as u128 / den))
        .ok_or(MathError::Overflow)
}
