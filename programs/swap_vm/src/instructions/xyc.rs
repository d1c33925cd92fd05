//! Constant-product swap engine

use swap_math::{quote_exact_in, quote_exact_out};

use crate::context::{Context, Flow};
use crate::error::{MathContext, VmError};
use crate::opcode::Opcode;

/// Solve the unknown amount against the current balances
pub(crate) fn swap(ctx: &mut Context<'_>) -> Result<Flow, VmError> {
    let op = Opcode::XycSwap;
    ctx.require_unsolved(op)?;
    let r = &mut ctx.regs;
    if ctx.query.exact_in {
        r.amount_out = quote_exact_in(r.balance_in, r.balance_out, r.amount_in).in_op(op)?;
    } else {
        r.amount_in = quote_exact_out(r.balance_in, r.balance_out, r.amount_out).in_op(op)?;
    }
    ctx.solved = true;
    Ok(Flow::Next)
}
