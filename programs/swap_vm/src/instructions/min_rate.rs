//! Rate bound: `amount_out / amount_in` never exceeds `rate_b / rate_a`

use swap_math::{mul_div_ceil, mul_div_floor};

use crate::context::{Context, Flow};
use crate::error::{GuardFailure, MathContext, VmError};
use crate::instruction::RateBound;
use crate::opcode::Opcode;

/// `(rate_a, rate_b)` oriented to the query direction
fn oriented(ctx: &Context<'_>, bound: &RateBound) -> (u64, u64) {
    if ctx.query.in_is_lower() {
        (bound.rate_lt, bound.rate_gt)
    } else {
        (bound.rate_gt, bound.rate_lt)
    }
}

fn exceeds(amount_in: u64, amount_out: u64, rate_a: u64, rate_b: u64) -> bool {
    (amount_out as u128) * (rate_a as u128) > (amount_in as u128) * (rate_b as u128)
}

/// Clamp the solved amount onto the bound
pub(crate) fn adjust(ctx: &mut Context<'_>, bound: &RateBound) -> Result<Flow, VmError> {
    let op = Opcode::MinRateAdjust;
    ctx.require_solved(op)?;
    let (rate_a, rate_b) = oriented(ctx, bound);
    let r = &mut ctx.regs;
    if ctx.query.exact_in {
        let cap = mul_div_floor(r.amount_in, rate_b, rate_a).in_op(op)?;
        r.amount_out = r.amount_out.min(cap);
    } else {
        let floor = mul_div_ceil(r.amount_out, rate_a, rate_b).in_op(op)?;
        r.amount_in = r.amount_in.max(floor);
    }
    Ok(Flow::Next)
}

/// Fail instead of clamping
pub(crate) fn require(ctx: &mut Context<'_>, bound: &RateBound) -> Result<Flow, VmError> {
    let op = Opcode::MinRateRequire;
    ctx.require_solved(op)?;
    let (rate_a, rate_b) = oriented(ctx, bound);
    let (amount_in, amount_out) = (ctx.regs.amount_in, ctx.regs.amount_out);
    if exceeds(amount_in, amount_out, rate_a, rate_b) {
        return Err(VmError::guard(
            op,
            GuardFailure::RateExceeded {
                amount_in,
                amount_out,
                rate_a,
                rate_b,
            },
        ));
    }
    Ok(Flow::Next)
}
