//! Replay protection and cumulative fill caps

use crate::context::{Context, Epilogue, Flow};
use crate::error::{GuardFailure, VmError};
use crate::opcode::Opcode;
use crate::query::Leg;

/// One-shot order: fails once `bit` is set, Commit sets it
pub(crate) fn bit(ctx: &mut Context<'_>, bit: u32) -> Result<Flow, VmError> {
    let program = ctx.program_id();
    if ctx.state().is_bit_set(&program, bit) {
        return Err(VmError::guard(
            Opcode::InvalidateBit,
            GuardFailure::OrderInvalidated { bit },
        ));
    }
    if let Some(journal) = ctx.journal() {
        journal.set_bit(program, bit);
    }
    Ok(Flow::Next)
}

/// Cap checks need the final amounts, so they run as epilogues
pub(crate) fn fill_cap(opcode: Opcode, leg: Leg, max: u64) -> Result<Flow, VmError> {
    Ok(Flow::Defer(Epilogue::FillCap { opcode, leg, max }))
}

pub(crate) fn check_fill_cap(ctx: &mut Context<'_>, opcode: Opcode, leg: Leg, max: u64) -> Result<(), VmError> {
    let program = ctx.program_id();
    let asset = ctx.asset(leg);
    let consumed = ctx.state().consumed(&program, &asset, leg);
    let amount = ctx.regs.amount(leg);
    let total = consumed.checked_add(amount).filter(|total| *total <= max);
    let Some(total) = total else {
        return Err(VmError::guard(
            opcode,
            GuardFailure::FillCapExceeded { consumed, amount, max },
        ));
    };
    if let Some(journal) = ctx.journal() {
        journal.set_consumed(program, asset, leg, total);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StateAccess;
    use crate::env::FixedEnvironment;
    use crate::instructions::testing::{asset, ctx, empty_program};
    use crate::query::Query;
    use crate::state::{Journal, OrderStore, StateView};

    #[test]
    fn test_bit_set_by_maker_blocks() {
        let program = empty_program();
        let mut store = OrderStore::new();
        store.invalidate_bit(program.id(), 3);
        let env = FixedEnvironment::at(0);
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let mut c = ctx(&program, &query, &env, &store);
        assert!(bit(&mut c, 2).is_ok());
        assert_eq!(
            bit(&mut c, 3).unwrap_err().guard_failure(),
            Some(&GuardFailure::OrderInvalidated { bit: 3 })
        );
    }

    #[test]
    fn test_commit_sets_bit() {
        let program = empty_program();
        let store = OrderStore::new();
        let env = FixedEnvironment::at(0);
        let query = Query::exact_in(asset("A"), asset("B"), 1).committing();
        let mut c = Context::new(&program, &query, &env, StateAccess::Journal(Journal::new(&store)), None);
        bit(&mut c, 7).unwrap();
        // Reused within the same program run
        assert!(bit(&mut c, 7).is_err());
    }

    #[test]
    fn test_fill_cap() {
        let program = empty_program();
        let store = OrderStore::new();
        let env = FixedEnvironment::at(0);
        let query = Query::exact_in(asset("A"), asset("B"), 60).committing();
        let mut c = Context::new(&program, &query, &env, StateAccess::Journal(Journal::new(&store)), None);
        check_fill_cap(&mut c, Opcode::InvalidateAssetIn, Leg::In, 100).unwrap();
        assert_eq!(c.state().consumed(&program.id(), &asset("A"), Leg::In), 60);
        assert_eq!(
            check_fill_cap(&mut c, Opcode::InvalidateAssetIn, Leg::In, 100)
                .unwrap_err()
                .guard_failure(),
            Some(&GuardFailure::FillCapExceeded {
                consumed: 60,
                amount: 60,
                max: 100
            })
        );
    }
}
