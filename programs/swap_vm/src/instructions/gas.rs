//! Gas cost compensation: when the base fee is above the maker's reference,
//! the price improves by the extra gas cost, up to a bounded share of the trade

use swap_math::{mul_div_floor, BPS, WAD};

use crate::context::{Context, Flow};
use crate::error::{MathContext, VmError};
use crate::instruction::GasAdjust;
use crate::opcode::Opcode;

/// Extra gas cost expressed in the output asset (saturating)
fn cost_out(gas_price: u64, adjust: &GasAdjust) -> u64 {
    let excess = gas_price.saturating_sub(adjust.base_fee) as u128;
    let cost = excess
        .saturating_mul(adjust.gas_amount as u128)
        .saturating_mul(adjust.gas_price as u128)
        / WAD as u128;
    cost.min(u64::MAX as u128) as u64
}

pub(crate) fn base_fee_adjust(ctx: &mut Context<'_>, adjust: &GasAdjust) -> Result<Flow, VmError> {
    let op = Opcode::BaseFeeAdjust;
    ctx.require_solved(op)?;
    let gas_price = ctx.env.base_fee();
    if gas_price <= adjust.base_fee {
        return Ok(Flow::Next);
    }
    let cost = cost_out(gas_price, adjust);
    let max = adjust.max_bps as u64;
    let r = &mut ctx.regs;

    if ctx.query.exact_in {
        let cap = mul_div_floor(r.amount_out, max, BPS).in_op(op)?;
        r.amount_out = r.amount_out.saturating_add(cost.min(cap));
    } else if r.amount_out > 0 {
        let cost_in = ((cost as u128) * (r.amount_in as u128) / (r.amount_out as u128)).min(u64::MAX as u128) as u64;
        let cap = mul_div_floor(r.amount_in, max, BPS).in_op(op)?;
        r.amount_in -= cost_in.min(cap);
    }
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedEnvironment;
    use crate::instructions::testing::{asset, ctx, empty_program};
    use crate::query::Query;
    use crate::state::OrderStore;

    fn adjust() -> GasAdjust {
        GasAdjust {
            base_fee: 10,
            gas_amount: 100,
            // 0.5 output per unit of gas cost
            gas_price: WAD / 2,
            max_bps: 1_000,
        }
    }

    #[test]
    fn test_no_effect_below_base() {
        let program = empty_program();
        let store = OrderStore::new();
        let env = FixedEnvironment::at(0).with_base_fee(10);
        let query = Query::exact_in(asset("A"), asset("B"), 1_000);
        let mut c = ctx(&program, &query, &env, &store);
        c.solved = true;
        c.regs.amount_out = 1_000;
        base_fee_adjust(&mut c, &adjust()).unwrap();
        assert_eq!(c.regs.amount_out, 1_000);
    }

    #[test]
    fn test_exact_in_adds_capped_cost() {
        let program = empty_program();
        let store = OrderStore::new();
        let query = Query::exact_in(asset("A"), asset("B"), 1_000);

        // (12 - 10) · 100 · 0.5 = 100 ≤ 10% of 2000
        let env = FixedEnvironment::at(0).with_base_fee(12);
        let mut c = ctx(&program, &query, &env, &store);
        c.solved = true;
        c.regs.amount_out = 2_000;
        base_fee_adjust(&mut c, &adjust()).unwrap();
        assert_eq!(c.regs.amount_out, 2_100);

        // Capped at 10% of 500
        let mut c = ctx(&program, &query, &env, &store);
        c.solved = true;
        c.regs.amount_out = 500;
        base_fee_adjust(&mut c, &adjust()).unwrap();
        assert_eq!(c.regs.amount_out, 550);
    }

    #[test]
    fn test_exact_out_discounts_input() {
        let program = empty_program();
        let store = OrderStore::new();
        let env = FixedEnvironment::at(0).with_base_fee(12);
        let query = Query::exact_out(asset("A"), asset("B"), 2_000);
        let mut c = ctx(&program, &query, &env, &store);
        c.solved = true;
        c.regs.amount_in = 4_000;
        // cost_in = 100 · 4000 / 2000 = 200
        base_fee_adjust(&mut c, &adjust()).unwrap();
        assert_eq!(c.regs.amount_in, 3_800);
    }
}
