//! Time-weighted sale: output unlocks linearly, price decays between fills

use swap_math::{mul_div_ceil, pow_wad, MathError, WAD};

use crate::context::{Context, Epilogue, Flow};
use crate::error::{GuardFailure, MathContext, VmError};
use crate::instruction::TwapSchedule;
use crate::opcode::Opcode;
use crate::state::TwapState;

pub(crate) fn apply(ctx: &mut Context<'_>, schedule: &TwapSchedule) -> Result<Flow, VmError> {
    let op = Opcode::Twap;
    ctx.require_unsolved(op)?;
    let now = ctx.env.now();
    if now < schedule.start {
        return Err(VmError::guard(
            op,
            GuardFailure::TwapNotStarted {
                start: schedule.start,
                now,
            },
        ));
    }

    let offset = ctx.offset;
    let prior = ctx.state().twap(&ctx.program_id(), offset).unwrap_or_default();
    let duration = schedule.duration as u64;
    let elapsed = (now - schedule.start).min(duration);
    let unlocked = ((schedule.balance_out as u128) * (elapsed as u128) / (duration as u128)) as u64;
    let available = unlocked.saturating_sub(prior.sold);
    if available == 0 {
        return Err(VmError::guard(op, GuardFailure::NothingUnlocked));
    }

    let mut balance_in = mul_div_ceil(schedule.balance_in, available, schedule.balance_out).in_op(op)?;
    if prior.bumped {
        balance_in = mul_div_ceil(balance_in, schedule.price_bump, WAD).in_op(op)?;
    }
    let window_start = prior.last_fill_at.unwrap_or(schedule.start);
    let decay = pow_wad(schedule.decay, now.saturating_sub(window_start)).in_op(op)?;
    balance_in = mul_div_ceil(balance_in, decay, WAD).in_op(op)?;
    if balance_in == 0 {
        return Err(VmError::Arithmetic {
            opcode: op,
            error: MathError::InsufficientLiquidity,
        });
    }

    ctx.regs.balance_in = balance_in;
    ctx.regs.balance_out = available;
    Ok(Flow::Defer(Epilogue::Twap {
        offset,
        schedule: *schedule,
        prior,
    }))
}

/// Epilogue: enforce the minimum fill and record progress
pub(crate) fn record(
    ctx: &mut Context<'_>,
    offset: usize,
    schedule: &TwapSchedule,
    prior: TwapState,
) -> Result<(), VmError> {
    let op = Opcode::Twap;
    let amount_out = ctx.regs.amount_out;
    if amount_out < schedule.min_trade_out {
        return Err(VmError::guard(
            op,
            GuardFailure::MinTradeOutput {
                amount_out,
                min: schedule.min_trade_out,
            },
        ));
    }

    let now = ctx.env.now();
    let gap = now.saturating_sub(prior.last_fill_at.unwrap_or(schedule.start));
    let next = TwapState {
        sold: prior.sold.checked_add(amount_out).ok_or(MathError::Overflow).in_op(op)?,
        last_fill_at: Some(now),
        bumped: gap >= schedule.illiquidity_period as u64,
    };
    let program = ctx.program_id();
    if let Some(journal) = ctx.journal() {
        journal.set_twap(program, offset, next);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedEnvironment;
    use crate::instructions::testing::{asset, ctx, empty_program};
    use crate::query::Query;
    use crate::state::OrderStore;

    fn schedule() -> TwapSchedule {
        TwapSchedule {
            start: 1_000,
            duration: 100,
            balance_in: 2_000,
            balance_out: 1_000,
            decay: WAD,
            illiquidity_period: 30,
            price_bump: 2 * WAD,
            min_trade_out: 5,
        }
    }

    #[test]
    fn test_unlocks_linearly() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(1_025);
        let mut c = ctx(&program, &query, &env, &store);
        apply(&mut c, &schedule()).unwrap();
        assert_eq!((c.regs.balance_in, c.regs.balance_out), (500, 250));
    }

    #[test]
    fn test_not_started_and_nothing_unlocked() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();

        let env = FixedEnvironment::at(999);
        let mut c = ctx(&program, &query, &env, &store);
        assert!(matches!(
            apply(&mut c, &schedule()).unwrap_err().guard_failure(),
            Some(GuardFailure::TwapNotStarted { .. })
        ));

        let env = FixedEnvironment::at(1_000);
        let mut c = ctx(&program, &query, &env, &store);
        assert_eq!(
            apply(&mut c, &schedule()).unwrap_err().guard_failure(),
            Some(&GuardFailure::NothingUnlocked)
        );
    }

    #[test]
    fn test_min_trade_out_checked_in_simulate() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(1_050);
        let mut c = ctx(&program, &query, &env, &store);
        c.regs.amount_out = 4;
        assert!(record(&mut c, 0, &schedule(), TwapState::default()).is_err());
        c.regs.amount_out = 5;
        assert!(record(&mut c, 0, &schedule(), TwapState::default()).is_ok());
    }
}
