//! Escape hatch into host-provided external logic

use log::debug;

use crate::context::{Context, Flow};
use crate::env::ExternalCall;
use crate::error::VmError;
use crate::ids::Address;

pub(crate) fn call(ctx: &mut Context<'_>, target: &Address, payload: &[u8]) -> Result<Flow, VmError> {
    let call = ExternalCall {
        target: *target,
        program: ctx.program_id(),
        query: ctx.query,
        registers: ctx.regs,
        payload,
    };
    let unknown = ctx.unknown_leg();
    let before = ctx.regs.amount(unknown);

    // Commit goes through the executor, Simulate only ever quotes
    let outcome = match ctx.executor.as_deref_mut() {
        Some(executor) => executor.execute_external(&call)?,
        None => ctx.env.quote_external(&call)?,
    };
    debug!("external {} returned {:?}", target, outcome);

    ctx.regs = outcome.registers;
    if before == 0 && ctx.regs.amount(unknown) != 0 {
        ctx.solved = true;
    }
    match outcome.jump {
        Some(offset) => Ok(Flow::Jump(ctx.program.index_of(offset as usize)?)),
        None => Ok(Flow::Next),
    }
}
