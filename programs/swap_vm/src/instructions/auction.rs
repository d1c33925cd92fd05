//! Dutch auctions: the price moves in the taker's favour as time passes

use swap_math::{mul_div_ceil, mul_div_floor, pow_wad, MathError, WAD};

use crate::context::{Context, Flow};
use crate::error::{GuardFailure, MathContext, VmError};
use crate::instruction::Auction;
use crate::opcode::Opcode;

/// `f^elapsed`, failing once the auction is over
fn decay_factor(ctx: &Context<'_>, op: Opcode, auction: &Auction) -> Result<u64, VmError> {
    let now = ctx.env.now();
    let expired_at = auction.start.saturating_add(auction.duration as u64);
    if now > expired_at {
        return Err(VmError::guard(op, GuardFailure::AuctionExpired { expired_at, now }));
    }
    let elapsed = now.saturating_sub(auction.start);
    pow_wad(auction.decay, elapsed).in_op(op)
}

/// `balance_in = ceil(balance_in · f^elapsed)`
pub(crate) fn balance_in(ctx: &mut Context<'_>, auction: &Auction) -> Result<Flow, VmError> {
    let op = Opcode::DutchAuctionBalanceIn;
    ctx.require_unsolved(op)?;
    let factor = decay_factor(ctx, op, auction)?;
    ctx.regs.balance_in = mul_div_ceil(ctx.regs.balance_in, factor, WAD).in_op(op)?;
    Ok(Flow::Next)
}

/// `balance_out = floor(balance_out / f^elapsed)`
pub(crate) fn balance_out(ctx: &mut Context<'_>, auction: &Auction) -> Result<Flow, VmError> {
    let op = Opcode::DutchAuctionBalanceOut;
    ctx.require_unsolved(op)?;
    let factor = decay_factor(ctx, op, auction)?;
    if factor == 0 {
        return Err(VmError::Arithmetic {
            opcode: op,
            error: MathError::DivisionByZero,
        });
    }
    ctx.regs.balance_out = mul_div_floor(ctx.regs.balance_out, WAD, factor).in_op(op)?;
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedEnvironment;
    use crate::instructions::testing::{asset, ctx, empty_program};
    use crate::query::Query;
    use crate::state::OrderStore;

    const HALF: u64 = WAD / 2;

    fn auction() -> Auction {
        Auction {
            start: 100,
            duration: 10,
            decay: HALF,
        }
    }

    #[test]
    fn test_balance_in_decays() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();

        // Before start: untouched
        let env = FixedEnvironment::at(50);
        let mut c = ctx(&program, &query, &env, &store);
        c.regs.balance_in = 1_001;
        balance_in(&mut c, &auction()).unwrap();
        assert_eq!(c.regs.balance_in, 1_001);

        // Two seconds in: a quarter, rounded up
        let env = FixedEnvironment::at(102);
        let mut c = ctx(&program, &query, &env, &store);
        c.regs.balance_in = 1_001;
        balance_in(&mut c, &auction()).unwrap();
        assert_eq!(c.regs.balance_in, 251);
    }

    #[test]
    fn test_balance_out_grows() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(101);
        let mut c = ctx(&program, &query, &env, &store);
        c.regs.balance_out = 300;
        balance_out(&mut c, &auction()).unwrap();
        assert_eq!(c.regs.balance_out, 600);
    }

    #[test]
    fn test_expiry_is_exclusive_of_last_second() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(110);
        let mut c = ctx(&program, &query, &env, &store);
        c.regs.balance_out = 1;
        assert!(balance_out(&mut c, &auction()).is_ok());

        let env = FixedEnvironment::at(111);
        let mut c = ctx(&program, &query, &env, &store);
        assert_eq!(
            balance_in(&mut c, &auction()).unwrap_err().guard_failure(),
            Some(&GuardFailure::AuctionExpired {
                expired_at: 110,
                now: 111
            })
        );
    }

    #[test]
    fn test_full_decay_divides_by_zero() {
        let program = empty_program();
        let query = Query::exact_in(asset("A"), asset("B"), 1);
        let store = OrderStore::new();
        let env = FixedEnvironment::at(101);
        let mut c = ctx(&program, &query, &env, &store);
        c.regs.balance_out = 1;
        let dead = Auction { decay: 0, ..auction() };
        assert!(matches!(
            balance_out(&mut c, &dead),
            Err(VmError::Arithmetic {
                error: MathError::DivisionByZero,
                ..
            })
        ));
    }
}
