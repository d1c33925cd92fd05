//! Decaying offsets that make a just-filled trade expensive to reverse
//!
//! After a fill the maker holds `amount_in` more of the input asset and
//! `amount_out` less of the output asset. Both changes are remembered as
//! offsets that fade out linearly over `period`: the received asset stays
//! locked, the sold asset is priced as if it were still there.

use swap_math::MathError;

use crate::context::{Context, Epilogue, Flow};
use crate::error::{MathContext, VmError};
use crate::ids::AssetId;
use crate::opcode::Opcode;
use crate::query::Leg;
use crate::state::DecayOffset;

pub(crate) fn apply(ctx: &mut Context<'_>, period: u32) -> Result<Flow, VmError> {
    let op = Opcode::Decay;
    ctx.require_unsolved(op)?;
    let program = ctx.program_id();
    let now = ctx.env.now();
    let (asset_in, asset_out) = (ctx.asset(Leg::In), ctx.asset(Leg::Out));

    let restore = ctx
        .state()
        .decay_offset(&program, &asset_in, Leg::In)
        .map_or(0, |o| o.current(now, period));
    let locked = ctx
        .state()
        .decay_offset(&program, &asset_out, Leg::Out)
        .map_or(0, |o| o.current(now, period));

    let r = &mut ctx.regs;
    r.balance_in = r.balance_in.checked_add(restore).ok_or(MathError::Overflow).in_op(op)?;
    r.balance_out = r
        .balance_out
        .checked_sub(locked)
        .ok_or(MathError::InsufficientLiquidity)
        .in_op(op)?;
    Ok(Flow::Defer(Epilogue::Decay { period }))
}

/// Epilogue: `offset(asset_in, Out) += amount_in`, `offset(asset_out, In) += amount_out`
pub(crate) fn record(ctx: &mut Context<'_>, period: u32) -> Result<(), VmError> {
    let op = Opcode::Decay;
    let program = ctx.program_id();
    let now = ctx.env.now();
    let (asset_in, asset_out) = (ctx.asset(Leg::In), ctx.asset(Leg::Out));
    let (amount_in, amount_out) = (ctx.regs.amount_in, ctx.regs.amount_out);

    let bumped = |leg: Leg, asset: AssetId, amount: u64| -> Result<DecayOffset, VmError> {
        let current = ctx
            .state()
            .decay_offset(&program, &asset, leg)
            .map_or(0, |o| o.current(now, period));
        let amount = current.checked_add(amount).ok_or(MathError::Overflow).in_op(op)?;
        Ok(DecayOffset { amount, updated_at: now })
    };
    let locked = bumped(Leg::Out, asset_in, amount_in)?;
    let restored = bumped(Leg::In, asset_out, amount_out)?;

    if let Some(journal) = ctx.journal() {
        journal.set_decay_offset(program, asset_in, Leg::Out, locked);
        journal.set_decay_offset(program, asset_out, Leg::In, restored);
    }
    Ok(())
}
