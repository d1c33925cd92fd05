//! Virtual liquidity for concentrated positions

use swap_math::MathError;

use crate::context::{Context, Flow};
use crate::error::{MathContext, VmError};
use crate::ids::AssetId;
use crate::opcode::Opcode;
use crate::query::Leg;

fn grow(ctx: &mut Context<'_>, op: Opcode, delta_in: u64, delta_out: u64) -> Result<Flow, VmError> {
    ctx.require_unsolved(op)?;
    let r = &mut ctx.regs;
    r.balance_in = r.balance_in.checked_add(delta_in).ok_or(MathError::Overflow).in_op(op)?;
    r.balance_out = r.balance_out.checked_add(delta_out).ok_or(MathError::Overflow).in_op(op)?;
    Ok(Flow::Next)
}

/// Add per-asset deltas; assets not listed grow by zero
pub(crate) fn grow_liquidity(ctx: &mut Context<'_>, deltas: &[(AssetId, u64)]) -> Result<Flow, VmError> {
    let delta_of = |asset: AssetId| {
        deltas
            .iter()
            .find(|(a, _)| *a == asset)
            .map(|(_, d)| *d)
            .unwrap_or(0)
    };
    let delta_in = delta_of(ctx.asset(Leg::In));
    let delta_out = delta_of(ctx.asset(Leg::Out));
    grow(ctx, Opcode::ConcentrateGrowLiquidity, delta_in, delta_out)
}

/// `delta_lt` grows the lower-ordered asset, `delta_gt` the other
pub(crate) fn grow_price_range(ctx: &mut Context<'_>, delta_lt: u64, delta_gt: u64) -> Result<Flow, VmError> {
    let (delta_in, delta_out) = if ctx.query.in_is_lower() {
        (delta_lt, delta_gt)
    } else {
        (delta_gt, delta_lt)
    };
    grow(ctx, Opcode::ConcentrateGrowPriceRange, delta_in, delta_out)
}
