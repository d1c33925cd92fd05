//! Maker and protocol fees on either leg
//!
//! A fee rate `r` (bps) widens the trade in the maker's favour:
//!
//! | leg | exact-in | exact-out |
//! |-----|----------|-----------|
//! | in  | prologue takes `r` off `amount_in`, epilogue adds it back | epilogue grosses `amount_in` up |
//! | out | epilogue takes `r` off `amount_out` | prologue grosses `amount_out` up, epilogue restores the request |
//!
//! Protocol fees do the same and also report the fee amount in the outcome.
//! They are charged on what is left after the maker's fee on the same leg.
//! On the output leg that follows from epilogue order when the protocol fee
//! is placed first. On the input leg the protocol fee waits in
//! `Context::pending_fees` until the next instruction that is not an input
//! fee, so maker input fees always run before it.

use swap_math::{deduct_bps, gross_up_bps, progressive_rate_bps, MathError};

use crate::context::{Context, Epilogue, Flow, PendingFee};
use crate::error::{MathContext, VmError};
use crate::ids::Address;
use crate::instruction::ProgressiveFee;
use crate::opcode::Opcode;
use crate::query::Leg;
use crate::vm::ProtocolFee;

pub(crate) fn flat(ctx: &mut Context<'_>, op: Opcode, leg: Leg, fee_bps: u16) -> Result<Flow, VmError> {
    prologue(ctx, op, leg, fee_bps as u64, None)
}

/// Rate grows with the size of the requested amount relative to its leg's balance
pub(crate) fn progressive(ctx: &mut Context<'_>, op: Opcode, leg: Leg, fee: &ProgressiveFee) -> Result<Flow, VmError> {
    let known = if ctx.query.exact_in { Leg::In } else { Leg::Out };
    let rate = progressive_rate_bps(
        fee.base_bps as u64,
        fee.slope_bps as u64,
        fee.max_bps as u64,
        ctx.regs.amount(known),
        ctx.regs.balance(known),
    );
    prologue(ctx, op, leg, rate, None)
}

pub(crate) fn protocol(
    ctx: &mut Context<'_>,
    op: Opcode,
    leg: Leg,
    fee_bps: u16,
    recipient: Address,
) -> Result<Flow, VmError> {
    match leg {
        Leg::In => {
            ctx.require_unsolved(op)?;
            ctx.pending_fees.push(PendingFee {
                opcode: op,
                rate_bps: fee_bps as u64,
                recipient,
            });
            Ok(Flow::Next)
        }
        Leg::Out => prologue(ctx, op, leg, fee_bps as u64, Some(recipient)),
    }
}

/// Instructions that run while input protocol fees are still pending
pub(crate) fn keeps_pending(op: Opcode) -> bool {
    matches!(op, Opcode::FlatFeeIn | Opcode::ProgressiveFeeIn | Opcode::ProtocolFeeIn)
}

/// Run the prologues of pending input protocol fees in program order
pub(crate) fn release_pending(ctx: &mut Context<'_>) -> Result<Vec<Epilogue>, VmError> {
    let pending = std::mem::take(&mut ctx.pending_fees);
    let mut epilogues = Vec::with_capacity(pending.len());
    for fee in pending {
        if let Flow::Defer(epilogue) = prologue(ctx, fee.opcode, Leg::In, fee.rate_bps, Some(fee.recipient))? {
            epilogues.push(epilogue);
        }
    }
    Ok(epilogues)
}

fn prologue(
    ctx: &mut Context<'_>,
    op: Opcode,
    leg: Leg,
    rate_bps: u64,
    recipient: Option<Address>,
) -> Result<Flow, VmError> {
    ctx.require_unsolved(op)?;
    let r = &mut ctx.regs;
    let carried = match (leg, ctx.query.exact_in) {
        (Leg::In, true) => {
            let net = deduct_bps(r.amount_in, rate_bps).in_op(op)?;
            let fee = r.amount_in - net;
            r.amount_in = net;
            Some(fee)
        }
        (Leg::Out, false) => {
            let requested = r.amount_out;
            r.amount_out = gross_up_bps(requested, rate_bps).in_op(op)?;
            Some(requested)
        }
        (Leg::In, false) | (Leg::Out, true) => None,
    };
    Ok(Flow::Defer(Epilogue::Fee {
        opcode: op,
        leg,
        rate_bps,
        carried,
        recipient,
    }))
}

/// Epilogue half of every fee instruction
pub(crate) fn settle(
    ctx: &mut Context<'_>,
    op: Opcode,
    leg: Leg,
    rate_bps: u64,
    carried: Option<u64>,
    recipient: Option<Address>,
) -> Result<(), VmError> {
    let r = &mut ctx.regs;
    let fee = match (leg, carried) {
        (Leg::In, Some(fee)) => {
            r.amount_in = r.amount_in.checked_add(fee).ok_or(MathError::Overflow).in_op(op)?;
            fee
        }
        (Leg::In, None) => {
            let gross = gross_up_bps(r.amount_in, rate_bps).in_op(op)?;
            let fee = gross - r.amount_in;
            r.amount_in = gross;
            fee
        }
        (Leg::Out, None) => {
            let net = deduct_bps(r.amount_out, rate_bps).in_op(op)?;
            let fee = r.amount_out - net;
            r.amount_out = net;
            fee
        }
        (Leg::Out, Some(requested)) => {
            let fee = r.amount_out.saturating_sub(requested);
            r.amount_out = requested;
            fee
        }
    };

    if let Some(recipient) = recipient {
        if fee > 0 {
            let asset = ctx.asset(leg);
            ctx.protocol_fees.push(ProtocolFee { recipient, asset, amount: fee });
        }
    }
    Ok(())
}
