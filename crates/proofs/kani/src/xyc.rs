//! Kani proofs for the constant product engine
//!
//! - **X1: Product non-decreasing (exact-in)** - floor on output keeps k
//! - **X2: Product non-decreasing (exact-out)** - ceiling on input keeps k
//! - **X3: Reserves stay positive** - output never drains the pool
//! - **X4: No round-trip profit** - exact-out for a quoted output never asks more than the input that produced it

use swap_math::{quote_exact_in, quote_exact_out};

/// X1: k never decreases for exact-in swaps
#[kani::proof]
#[kani::unwind(4)]
fn x1_product_non_decreasing_exact_in() {
    let bin: u64 = kani::any();
    let bout: u64 = kani::any();
    let ain: u64 = kani::any();

    kani::assume(bin > 0 && bin < 1 << 32);
    kani::assume(bout > 0 && bout < 1 << 32);
    kani::assume(ain > 0 && ain < 1 << 32);

    if let Ok(aout) = quote_exact_in(bin, bout, ain) {
        let k0 = (bin as u128) * (bout as u128);
        let k1 = ((bin + ain) as u128) * ((bout - aout) as u128);
        assert!(k1 >= k0, "X1: product must not decrease");
    }
}

/// X2: k never decreases for exact-out swaps
#[kani::proof]
#[kani::unwind(4)]
fn x2_product_non_decreasing_exact_out() {
    let bin: u64 = kani::any();
    let bout: u64 = kani::any();
    let aout: u64 = kani::any();

    kani::assume(bin > 0 && bin < 1 << 32);
    kani::assume(bout > 0 && bout < 1 << 32);
    kani::assume(aout > 0 && aout < bout);

    if let Ok(ain) = quote_exact_out(bin, bout, aout) {
        let k0 = (bin as u128) * (bout as u128);
        let k1 = ((bin as u128) + (ain as u128)) * ((bout - aout) as u128);
        assert!(k1 >= k0, "X2: product must not decrease");
    }
}

/// X3: a successful exact-in quote leaves output reserves positive
#[kani::proof]
#[kani::unwind(4)]
fn x3_reserves_positive() {
    let bin: u64 = kani::any();
    let bout: u64 = kani::any();
    let ain: u64 = kani::any();

    kani::assume(bin > 0);
    kani::assume(bout > 0);

    if let Ok(aout) = quote_exact_in(bin, bout, ain) {
        assert!(aout < bout, "X3: output must stay below the reserve");
    }
}

/// X4: buying the quoted output again costs at most the original input
#[kani::proof]
#[kani::unwind(4)]
fn x4_no_round_trip_profit() {
    let bin: u64 = kani::any();
    let bout: u64 = kani::any();
    let ain: u64 = kani::any();

    kani::assume(bin > 0 && bin < 1 << 24);
    kani::assume(bout > 0 && bout < 1 << 24);
    kani::assume(ain > 0 && ain < 1 << 24);

    if let Ok(aout) = quote_exact_in(bin, bout, ain) {
        if aout > 0 {
            if let Ok(back) = quote_exact_out(bin, bout, aout) {
                assert!(back <= ain, "X4: exact-out quote exceeds the input that produced it");
            }
        }
    }
}
