//! Dispatcher and entry points

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::context::{Context, Flow, StateAccess};
use crate::env::{Environment, ExternalExecutor};
use crate::error::{OrderingFault, VmError};
use crate::ids::{Address, AssetId};
use crate::instructions;
use crate::program::Program;
use crate::query::{ExecutionMode, Query, SwapRegisters};
use crate::state::{Journal, OrderStore, StateView};

/// Default bound on executed records per invocation
pub const DEFAULT_MAX_STEPS: u32 = 1024;

/// VM limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    pub max_steps: u32,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Fee owed to a third party, settled by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolFee {
    pub recipient: Address,
    pub asset: AssetId,
    pub amount: u64,
}

/// Result of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub amount_in: u64,
    pub amount_out: u64,
    /// Final register file, balances included
    pub registers: SwapRegisters,
    pub protocol_fees: Vec<ProtocolFee>,
    /// Records executed
    pub steps: u32,
}

/// The swap program interpreter
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapVm {
    config: VmConfig,
}

impl SwapVm {
    pub fn new(config: VmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Price a swap without writing anything
    pub fn quote(
        &self,
        program: &Program,
        query: &Query,
        state: &dyn StateView,
        env: &dyn Environment,
    ) -> Result<SwapOutcome, VmError> {
        check_mode(query, ExecutionMode::Simulate)?;
        query.validate()?;

        let mut ctx = Context::new(program, query, env, StateAccess::View(state), None);
        let steps = self.run(&mut ctx)?;
        Ok(outcome(ctx, steps))
    }

    /// Execute a swap; per-order state is written only if every instruction succeeds
    pub fn swap(
        &self,
        program: &Program,
        query: &Query,
        store: &mut OrderStore,
        env: &dyn Environment,
        executor: &mut dyn ExternalExecutor,
    ) -> Result<SwapOutcome, VmError> {
        check_mode(query, ExecutionMode::Commit)?;
        query.validate()?;

        let (result, delta) = {
            let journal = Journal::new(&*store);
            let mut ctx = Context::new(
                program,
                query,
                env,
                StateAccess::Journal(journal),
                Some(executor),
            );
            match self.run(&mut ctx) {
                Ok(steps) => {
                    let fees = std::mem::take(&mut ctx.protocol_fees);
                    let regs = ctx.regs;
                    let delta = match ctx.state {
                        StateAccess::Journal(journal) => Some(journal.into_delta()),
                        StateAccess::View(_) => None,
                    };
                    (Ok((regs, fees, steps)), delta)
                }
                Err(e) => (Err(e), None),
            }
        };

        let (registers, protocol_fees, steps) = result?;
        if let Some(delta) = delta {
            info!(
                "program {}: committing {} state entries",
                program.id(),
                delta.len()
            );
            store.apply(delta);
        }
        Ok(SwapOutcome {
            amount_in: registers.amount_in,
            amount_out: registers.amount_out,
            registers,
            protocol_fees,
            steps,
        })
    }

    fn run(&self, ctx: &mut Context<'_>) -> Result<u32, VmError> {
        let result = self.dispatch(ctx);
        if let Err(e) = &result {
            if e.guard_failure().is_some() {
                warn!("program {}: {}", ctx.program_id(), e);
            }
        }
        result
    }

    fn dispatch(&self, ctx: &mut Context<'_>) -> Result<u32, VmError> {
        let program = ctx.program;
        let records = program.records();
        let mut epilogues = Vec::new();
        let mut pc = 0usize;
        let mut steps = 0u32;

        while let Some(record) = records.get(pc) {
            steps += 1;
            if steps > self.config.max_steps {
                return Err(VmError::StepLimitExceeded(self.config.max_steps));
            }
            pc += 1;
            epilogues.extend(instructions::release_pending_fees(ctx, Some(record.opcode()))?);
            debug!(
                "0x{:04x} {} regs={:?} solved={}",
                record.offset,
                record.opcode(),
                ctx.regs,
                ctx.solved
            );
            ctx.offset = record.offset;
            match instructions::execute(ctx, &record.instruction)? {
                Flow::Next => {}
                Flow::Jump(index) => pc = index,
                Flow::Defer(epilogue) => epilogues.push(epilogue),
            }
        }

        epilogues.extend(instructions::release_pending_fees(ctx, None)?);
        if !ctx.solved {
            return Err(OrderingFault::AmountNotSolved.into());
        }

        while let Some(epilogue) = epilogues.pop() {
            trace!("epilogue {:?} regs={:?}", epilogue, ctx.regs);
            instructions::finish(ctx, epilogue)?;
        }

        Ok(steps)
    }
}

fn check_mode(query: &Query, entry: ExecutionMode) -> Result<(), VmError> {
    if query.mode != entry {
        return Err(VmError::ModeMismatch {
            requested: query.mode,
            entry,
        });
    }
    Ok(())
}

fn outcome(ctx: Context<'_>, steps: u32) -> SwapOutcome {
    SwapOutcome {
        amount_in: ctx.regs.amount_in,
        amount_out: ctx.regs.amount_out,
        registers: ctx.regs,
        protocol_fees: ctx.protocol_fees,
        steps,
    }
}
