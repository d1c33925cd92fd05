//! Reserve rebalancing towards a fair valuation

use swap_math::{clamp_delta_bps, rebalance, WAD};

use crate::context::{Context, Flow};
use crate::error::{GuardFailure, MathContext, VmError};
use crate::ids::Address;
use crate::opcode::Opcode;

/// Rebalance with `v` valuing the lower-ordered asset
fn apply(ctx: &mut Context<'_>, op: Opcode, v: u64, max_delta_bps: Option<u16>) -> Result<Flow, VmError> {
    if v == 0 || v >= WAD {
        return Err(VmError::guard(op, GuardFailure::InvalidValuation(v)));
    }
    let v_in = if ctx.query.in_is_lower() { v } else { WAD - v };
    let r = &mut ctx.regs;
    let (mut balance_in, mut balance_out) = rebalance(r.balance_in, r.balance_out, v_in).in_op(op)?;
    if let Some(delta) = max_delta_bps {
        balance_in = clamp_delta_bps(r.balance_in, balance_in, delta as u64).in_op(op)?;
        balance_out = clamp_delta_bps(r.balance_out, balance_out, delta as u64).in_op(op)?;
    }
    r.balance_in = balance_in;
    r.balance_out = balance_out;
    Ok(Flow::Next)
}

pub(crate) fn fixed(ctx: &mut Context<'_>, valuation: u64) -> Result<Flow, VmError> {
    let op = Opcode::ValuationStatic;
    ctx.require_unsolved(op)?;
    apply(ctx, op, valuation, None)
}

/// Oracle valuation, optionally bounded in age and in how far balances may move
pub(crate) fn oracle(
    ctx: &mut Context<'_>,
    op: Opcode,
    oracle: &Address,
    max_age: Option<u32>,
    max_delta_bps: Option<u16>,
) -> Result<Flow, VmError> {
    ctx.require_unsolved(op)?;
    let reading = ctx
        .env
        .oracle(oracle)
        .ok_or_else(|| VmError::guard(op, GuardFailure::OracleUnavailable(*oracle)))?;
    if let Some(max_age) = max_age {
        let age = ctx.env.now().saturating_sub(reading.updated_at);
        if age > max_age as u64 {
            return Err(VmError::guard(
                op,
                GuardFailure::StaleOracle {
                    age,
                    max_age: max_age as u64,
                },
            ));
        }
    }
    apply(ctx, op, reading.value, max_delta_bps)
}
