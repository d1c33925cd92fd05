//! Kani harnesses for the swap math
//!
//! Run with: cargo kani -p proofs-kani
//!
//! - X1-X4: constant product rounding (xyc.rs)
//! - F1-F3: fee scaling (fees.rs)

#![no_std]

#[cfg(kani)]
mod fees;
#[cfg(kani)]
mod xyc;
