//! Swap Math - pure integer pricing primitives for the swap VM
//!
//! Every pricing instruction of the VM reduces to one of the functions in
//! this crate. Nothing here allocates, logs or panics: all functions are
//! total and report failure through [`MathError`], so the same code can be
//! checked with Kani (`crates/proofs/kani`) and property tests.
//!
//! Rounding convention: amounts owed *to* the taker round down, amounts
//! owed *by* the taker round up.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(kani)]
extern crate kani;

pub mod concentration;
pub mod fees;
pub mod math;
pub mod valuation;
pub mod xyc;

pub use concentration::price_range_deltas;
pub use fees::{deduct_bps, gross_up_bps, progressive_rate_bps};
pub use math::{mul_div_ceil, mul_div_floor, pow_wad, sqrt_wad};
pub use valuation::{clamp_delta_bps, rebalance};
pub use xyc::{quote_exact_in, quote_exact_out};

/// Basis points scale (10,000 bps = 100%)
pub const BPS: u64 = 10_000;

/// Fixed-point unit for fractions (1e18 = 1.0)
pub const WAD: u64 = 1_000_000_000_000_000_000;

/// Error types for swap math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Result does not fit the target integer width
    Overflow,
    /// Division by a zero denominator
    DivisionByZero,
    /// Reserves cannot satisfy the requested trade
    InsufficientLiquidity,
    /// Price range does not bracket the current price
    InvalidRange,
}

impl core::fmt::Display for MathError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            MathError::Overflow => "arithmetic overflow",
            MathError::DivisionByZero => "division by zero",
            MathError::InsufficientLiquidity => "insufficient liquidity",
            MathError::InvalidRange => "price range does not bracket the current price",
        };
        f.write_str(msg)
    }
}
