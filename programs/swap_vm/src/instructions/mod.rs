//! Instruction handlers
//!
//! Each handler reads and updates the registers of a [`Context`] and tells
//! the dispatcher how to continue. Handlers that must act again after the
//! rest of the program ran return [`Flow::Defer`]; their epilogue half
//! lives next to them and is reached through [`finish`].

mod auction;
mod balances;
mod concentrate;
mod controls;
mod decay;
mod extruction;
mod fees;
mod gas;
mod invalidators;
mod min_rate;
mod twap;
mod valuation;
mod xyc;

use crate::context::{Context, Epilogue, Flow};
use crate::error::VmError;
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::query::Leg;

pub(crate) fn execute(ctx: &mut Context<'_>, instruction: &Instruction) -> Result<Flow, VmError> {
    match instruction {
        Instruction::Jump { target } => controls::jump(ctx, *target),
        Instruction::JumpIfAssetIn { asset, target } => controls::jump_if_asset(ctx, Leg::In, asset, *target),
        Instruction::JumpIfAssetOut { asset, target } => controls::jump_if_asset(ctx, Leg::Out, asset, *target),
        Instruction::Deadline { deadline } => controls::deadline(ctx, *deadline),
        Instruction::OnlyTakerBalanceGte { asset, min } => controls::only_taker_balance_gte(ctx, asset, *min),
        Instruction::OnlyTakerSupplyShareGte { asset, min_share } => {
            controls::only_taker_supply_share_gte(ctx, asset, *min_share)
        }
        Instruction::Salt(_) => Ok(Flow::Next),
        Instruction::StaticBalances(entries) => balances::static_balances(ctx, entries),
        Instruction::DynamicBalances(entries) => balances::dynamic_balances(ctx, entries),
        Instruction::ExternalBalances => balances::external_balances(ctx),
        Instruction::XycSwap => xyc::swap(ctx),
        Instruction::ConcentrateGrowLiquidity(deltas) => concentrate::grow_liquidity(ctx, deltas),
        Instruction::ConcentrateGrowPriceRange { delta_lt, delta_gt } => {
            concentrate::grow_price_range(ctx, *delta_lt, *delta_gt)
        }
        Instruction::Decay { period } => decay::apply(ctx, *period),
        Instruction::DutchAuctionBalanceIn(auction) => auction::balance_in(ctx, auction),
        Instruction::DutchAuctionBalanceOut(auction) => auction::balance_out(ctx, auction),
        Instruction::Twap(schedule) => twap::apply(ctx, schedule),
        Instruction::FlatFeeIn { fee_bps } => fees::flat(ctx, Opcode::FlatFeeIn, Leg::In, *fee_bps),
        Instruction::FlatFeeOut { fee_bps } => fees::flat(ctx, Opcode::FlatFeeOut, Leg::Out, *fee_bps),
        Instruction::ProgressiveFeeIn(fee) => fees::progressive(ctx, Opcode::ProgressiveFeeIn, Leg::In, fee),
        Instruction::ProgressiveFeeOut(fee) => fees::progressive(ctx, Opcode::ProgressiveFeeOut, Leg::Out, fee),
        Instruction::ProtocolFeeIn { fee_bps, recipient } => {
            fees::protocol(ctx, Opcode::ProtocolFeeIn, Leg::In, *fee_bps, *recipient)
        }
        Instruction::ProtocolFeeOut { fee_bps, recipient } => {
            fees::protocol(ctx, Opcode::ProtocolFeeOut, Leg::Out, *fee_bps, *recipient)
        }
        Instruction::MinRateAdjust(bound) => min_rate::adjust(ctx, bound),
        Instruction::MinRateRequire(bound) => min_rate::require(ctx, bound),
        Instruction::BaseFeeAdjust(adjust) => gas::base_fee_adjust(ctx, adjust),
        Instruction::ValuationStatic { valuation } => valuation::fixed(ctx, *valuation),
        Instruction::ValuationOracle { oracle } => valuation::oracle(ctx, Opcode::ValuationOracle, oracle, None, None),
        Instruction::ValuationOracleFresh { oracle, max_age } => {
            valuation::oracle(ctx, Opcode::ValuationOracleFresh, oracle, Some(*max_age), None)
        }
        Instruction::ValuationBounded {
            oracle,
            max_age,
            max_delta_bps,
        } => valuation::oracle(
            ctx,
            Opcode::ValuationBounded,
            oracle,
            Some(*max_age),
            Some(*max_delta_bps),
        ),
        Instruction::InvalidateBit { bit } => invalidators::bit(ctx, *bit),
        Instruction::InvalidateAssetIn { max } => invalidators::fill_cap(Opcode::InvalidateAssetIn, Leg::In, *max),
        Instruction::InvalidateAssetOut { max } => invalidators::fill_cap(Opcode::InvalidateAssetOut, Leg::Out, *max),
        Instruction::Extruction { target, payload } => extruction::call(ctx, target, payload),
    }
}

/// Apply input protocol fees held back for the maker's input fees, unless `next` is one of those
pub(crate) fn release_pending_fees(ctx: &mut Context<'_>, next: Option<Opcode>) -> Result<Vec<Epilogue>, VmError> {
    if ctx.pending_fees.is_empty() || next.is_some_and(fees::keeps_pending) {
        return Ok(Vec::new());
    }
    fees::release_pending(ctx)
}

pub(crate) fn finish(ctx: &mut Context<'_>, epilogue: Epilogue) -> Result<(), VmError> {
    match epilogue {
        Epilogue::DynamicBalances {
            balance_in,
            balance_out,
        } => balances::store_dynamic(ctx, balance_in, balance_out),
        Epilogue::Decay { period } => decay::record(ctx, period),
        Epilogue::Twap {
            offset,
            schedule,
            prior,
        } => twap::record(ctx, offset, &schedule, prior),
        Epilogue::Fee {
            opcode,
            leg,
            rate_bps,
            carried,
            recipient,
        } => fees::settle(ctx, opcode, leg, rate_bps, carried, recipient),
        Epilogue::FillCap { opcode, leg, max } => invalidators::check_fill_cap(ctx, opcode, leg, max),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for running single handlers against a hand-built context

    use crate::context::{Context, StateAccess};
    use crate::env::FixedEnvironment;
    use crate::ids::{AssetId, ProgramId};
    use crate::opcode::InstructionSet;
    use crate::program::Program;
    use crate::query::Query;
    use crate::state::OrderStore;

    pub fn asset(name: &str) -> AssetId {
        name.parse().unwrap()
    }

    pub fn empty_program() -> Program {
        Program::decode(ProgramId::default(), &[], &InstructionSet::v1()).unwrap()
    }

    pub fn ctx<'a>(
        program: &'a Program,
        query: &'a Query,
        env: &'a FixedEnvironment,
        store: &'a OrderStore,
    ) -> Context<'a> {
        Context::new(program, query, env, StateAccess::View(store), None)
    }
}
