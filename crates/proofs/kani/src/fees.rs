//! Kani proofs for fee scaling
//!
//! - **F1: Deduction bounded** - the taker never keeps more than it sent
//! - **F2: Gross-up covers net** - deducting from the gross leaves at least the net
//! - **F3: Progressive cap** - the size curve never exceeds its maximum

use swap_math::{deduct_bps, gross_up_bps, progressive_rate_bps, BPS};

/// F1: deduct_bps never increases the amount
#[kani::proof]
fn f1_deduction_bounded() {
    let amount: u64 = kani::any();
    let rate: u64 = kani::any();
    kani::assume(rate <= BPS);

    if let Ok(net) = deduct_bps(amount, rate) {
        assert!(net <= amount, "F1: deduction must not add value");
    }
}

/// F2: gross-up then deduct returns at least the net amount
#[kani::proof]
fn f2_gross_up_covers_net() {
    let amount: u64 = kani::any();
    let rate: u64 = kani::any();
    kani::assume(amount < 1 << 48);
    kani::assume(rate < BPS);

    if let Ok(gross) = gross_up_bps(amount, rate) {
        if let Ok(net) = deduct_bps(gross, rate) {
            assert!(net >= amount, "F2: gross-up must cover the fee");
        }
    }
}

/// F3: progressive rate stays within [min(base, max), max]
#[kani::proof]
fn f3_progressive_cap() {
    let base: u64 = kani::any();
    let slope: u64 = kani::any();
    let max: u64 = kani::any();
    let amount: u64 = kani::any();
    let balance: u64 = kani::any();
    kani::assume(max < BPS);

    let rate = progressive_rate_bps(base, slope, max, amount, balance);
    assert!(rate <= max, "F3: rate above maximum");
}
