//! Control flow and taker guards

use swap_math::WAD;

use crate::context::{Context, Flow};
use crate::error::{GuardFailure, VmError};
use crate::ids::AssetId;
use crate::opcode::Opcode;
use crate::query::Leg;

pub(crate) fn jump(ctx: &mut Context<'_>, target: u16) -> Result<Flow, VmError> {
    let index = ctx.program.index_of(target as usize)?;
    Ok(Flow::Jump(index))
}

pub(crate) fn jump_if_asset(ctx: &mut Context<'_>, leg: Leg, asset: &AssetId, target: u16) -> Result<Flow, VmError> {
    if ctx.asset(leg) == *asset {
        jump(ctx, target)
    } else {
        Ok(Flow::Next)
    }
}

pub(crate) fn deadline(ctx: &mut Context<'_>, deadline: u64) -> Result<Flow, VmError> {
    let now = ctx.env.now();
    if now > deadline {
        return Err(VmError::guard(
            Opcode::Deadline,
            GuardFailure::DeadlinePassed { deadline, now },
        ));
    }
    Ok(Flow::Next)
}

pub(crate) fn only_taker_balance_gte(ctx: &mut Context<'_>, asset: &AssetId, min: u64) -> Result<Flow, VmError> {
    let balance = ctx.env.balance_of(asset, &ctx.query.taker);
    if balance < min {
        return Err(VmError::guard(
            Opcode::OnlyTakerBalanceGte,
            GuardFailure::TakerBalanceTooLow { balance, min },
        ));
    }
    Ok(Flow::Next)
}

pub(crate) fn only_taker_supply_share_gte(
    ctx: &mut Context<'_>,
    asset: &AssetId,
    min_share: u64,
) -> Result<Flow, VmError> {
    let balance = ctx.env.balance_of(asset, &ctx.query.taker);
    let supply = ctx.env.total_supply(asset);
    // Empty supply means nobody holds a share
    let share = if supply == 0 {
        0
    } else {
        ((balance as u128) * (WAD as u128) / (supply as u128)).min(u64::MAX as u128) as u64
    };
    if supply == 0 || share < min_share {
        return Err(VmError::guard(
            Opcode::OnlyTakerSupplyShareGte,
            GuardFailure::TakerShareTooLow { share, min: min_share },
        ));
    }
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedEnvironment;
    use crate::ids::Address;
    use crate::instructions::testing::{asset, ctx, empty_program};
    use crate::query::Query;
    use crate::state::OrderStore;

    #[test]
    fn test_deadline_inclusive() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(100);
        let mut c = ctx(&program, &query, &env, &store);
        assert_eq!(deadline(&mut c, 100), Ok(Flow::Next));
        assert_eq!(
            deadline(&mut c, 99).unwrap_err().guard_failure(),
            Some(&GuardFailure::DeadlinePassed { deadline: 99, now: 100 })
        );
    }

    #[test]
    fn test_taker_guards() {
        let program = empty_program();
        let taker: Address = "taker".parse().unwrap();
        let lp = asset("LP");
        let query = Query::exact_in(asset("A"), asset("B"), 1).with_taker(taker);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(0)
            .with_balance(lp, taker, 25)
            .with_supply(lp, 100);
        let mut c = ctx(&program, &query, &env, &store);

        assert!(only_taker_balance_gte(&mut c, &lp, 25).is_ok());
        assert!(only_taker_balance_gte(&mut c, &lp, 26).is_err());
        // 25% of supply
        assert!(only_taker_supply_share_gte(&mut c, &lp, WAD / 4).is_ok());
        assert!(only_taker_supply_share_gte(&mut c, &lp, WAD / 4 + 1).is_err());
        // Zero supply always fails
        assert!(only_taker_supply_share_gte(&mut c, &asset("NONE"), 0).is_err());
    }

    #[test]
    fn test_conditional_jump_only_on_match() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(0);
        let mut c = ctx(&program, &query, &env, &store);
        assert_eq!(jump_if_asset(&mut c, Leg::In, &asset("B"), 0), Ok(Flow::Next));
        // Offset 0 is the end of the empty program
        assert_eq!(jump_if_asset(&mut c, Leg::Out, &asset("B"), 0), Ok(Flow::Jump(0)));
    }
}
