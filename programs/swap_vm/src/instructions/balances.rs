//! Balance sources: static arguments, per-order stored balances, host reserves

use swap_math::MathError;

use crate::context::{Context, Epilogue, Flow};
use crate::error::{GuardFailure, MathContext, VmError};
use crate::ids::AssetId;
use crate::opcode::Opcode;
use crate::query::Leg;

fn lookup(entries: &[(AssetId, u64)], asset: &AssetId, opcode: Opcode) -> Result<u64, VmError> {
    entries
        .iter()
        .find(|(a, _)| a == asset)
        .map(|(_, balance)| *balance)
        .ok_or_else(|| VmError::guard(opcode, GuardFailure::AssetNotPriced))
}

pub(crate) fn static_balances(ctx: &mut Context<'_>, entries: &[(AssetId, u64)]) -> Result<Flow, VmError> {
    ctx.require_unsolved(Opcode::StaticBalances)?;
    ctx.regs.balance_in = lookup(entries, &ctx.asset(Leg::In), Opcode::StaticBalances)?;
    ctx.regs.balance_out = lookup(entries, &ctx.asset(Leg::Out), Opcode::StaticBalances)?;
    Ok(Flow::Next)
}

pub(crate) fn dynamic_balances(ctx: &mut Context<'_>, entries: &[(AssetId, u64)]) -> Result<Flow, VmError> {
    let op = Opcode::DynamicBalances;
    ctx.require_unsolved(op)?;
    let program = ctx.program_id();
    let mut current = [0u64; 2];
    for (slot, leg) in [Leg::In, Leg::Out].into_iter().enumerate() {
        let asset = ctx.asset(leg);
        current[slot] = match ctx.state().dynamic_balance(&program, &asset) {
            Some(stored) => stored,
            None => lookup(entries, &asset, op)?,
        };
    }
    ctx.regs.balance_in = current[0];
    ctx.regs.balance_out = current[1];
    Ok(Flow::Defer(Epilogue::DynamicBalances {
        balance_in: current[0],
        balance_out: current[1],
    }))
}

/// Epilogue: persist `balance_in + amount_in` and `balance_out − amount_out`
pub(crate) fn store_dynamic(ctx: &mut Context<'_>, balance_in: u64, balance_out: u64) -> Result<(), VmError> {
    let op = Opcode::DynamicBalances;
    let new_in = balance_in
        .checked_add(ctx.regs.amount_in)
        .ok_or(MathError::Overflow)
        .in_op(op)?;
    let new_out = balance_out
        .checked_sub(ctx.regs.amount_out)
        .ok_or(MathError::InsufficientLiquidity)
        .in_op(op)?;
    let program = ctx.program_id();
    let (asset_in, asset_out) = (ctx.asset(Leg::In), ctx.asset(Leg::Out));
    if let Some(journal) = ctx.journal() {
        journal.set_dynamic_balance(program, asset_in, new_in);
        journal.set_dynamic_balance(program, asset_out, new_out);
    }
    Ok(())
}

pub(crate) fn external_balances(ctx: &mut Context<'_>) -> Result<Flow, VmError> {
    let op = Opcode::ExternalBalances;
    ctx.require_unsolved(op)?;
    let program = ctx.program_id();
    let reserve = |asset: AssetId| {
        ctx.env
            .reserve(&program, &asset)
            .ok_or_else(|| VmError::guard(op, GuardFailure::AssetNotPriced))
    };
    let balance_in = reserve(ctx.asset(Leg::In))?;
    let balance_out = reserve(ctx.asset(Leg::Out))?;
    ctx.regs.balance_in = balance_in;
    ctx.regs.balance_out = balance_out;
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedEnvironment;
    use crate::instructions::testing::{asset, ctx, empty_program};
    use crate::query::Query;
    use crate::state::OrderStore;

    #[test]
    fn test_static_balances_match_query_assets() {
        let program = empty_program();
        let query = Query::exact_in(asset("B"), asset("A"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(0);
        let mut c = ctx(&program, &query, &env, &store);
        static_balances(&mut c, &[(asset("A"), 100), (asset("B"), 200)]).unwrap();
        assert_eq!((c.regs.balance_in, c.regs.balance_out), (200, 100));

        let err = static_balances(&mut c, &[(asset("A"), 100)]).unwrap_err();
        assert_eq!(err.guard_failure(), Some(&GuardFailure::AssetNotPriced));
    }

    #[test]
    fn test_dynamic_balances_initialise_then_defer() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(0);
        let mut c = ctx(&program, &query, &env, &store);
        let flow = dynamic_balances(&mut c, &[(asset("A"), 10), (asset("B"), 20)]).unwrap();
        assert_eq!(
            flow,
            Flow::Defer(Epilogue::DynamicBalances {
                balance_in: 10,
                balance_out: 20
            })
        );
        // Simulate: epilogue computes but writes nothing
        c.regs.amount_out = 21;
        assert!(store_dynamic(&mut c, 10, 20).is_err());
    }

    #[test]
    fn test_external_balances() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(0).with_reserve(asset("A"), 5).with_reserve(asset("B"), 6);
        let mut c = ctx(&program, &query, &env, &store);
        external_balances(&mut c).unwrap();
        assert_eq!((c.regs.balance_in, c.regs.balance_out), (5, 6));

        let env = FixedEnvironment::at(0).with_reserve(asset("A"), 5);
        let mut c = ctx(&program, &query, &env, &store);
        assert!(external_balances(&mut c).is_err());
    }
}
