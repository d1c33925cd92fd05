//! Execution context shared by all instructions of one invocation

use crate::env::{Environment, ExternalExecutor};
use crate::error::{OrderingFault, VmError};
use crate::ids::{Address, AssetId, ProgramId};
use crate::instruction::TwapSchedule;
use crate::opcode::Opcode;
use crate::program::Program;
use crate::query::{ExecutionMode, Leg, Query, SwapRegisters};
use crate::state::{Journal, StateView, TwapState};
use crate::vm::ProtocolFee;

/// What the dispatcher does after an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Next,
    /// Continue at record index
    Jump(usize),
    /// Run `Epilogue` once the instruction stream is exhausted
    Defer(Epilogue),
}

/// Work an instruction must do after the rest of the program ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Epilogue {
    /// Store the post-trade dynamic balances
    DynamicBalances { balance_in: u64, balance_out: u64 },
    /// Record new decay offsets for both legs
    Decay { period: u32 },
    /// Check the fill size and record TWAP progress
    Twap {
        offset: usize,
        schedule: TwapSchedule,
        prior: TwapState,
    },
    /// Settle a fee on `leg`
    ///
    /// `carried` is the fee taken up front (input, exact-in) or the requested
    /// net output (output, exact-out); `None` when everything happens here.
    Fee {
        opcode: Opcode,
        leg: Leg,
        rate_bps: u64,
        carried: Option<u64>,
        recipient: Option<Address>,
    },
    /// Enforce and record a cumulative fill cap
    FillCap { opcode: Opcode, leg: Leg, max: u64 },
}

/// Input-leg protocol fee waiting for the maker's input fees to run first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingFee {
    pub opcode: Opcode,
    pub rate_bps: u64,
    pub recipient: Address,
}

/// Where reads and writes of per-order state go
pub(crate) enum StateAccess<'a> {
    /// Simulate: reads only
    View(&'a dyn StateView),
    /// Commit: reads through, writes journaled
    Journal(Journal<'a>),
}

pub struct Context<'a> {
    pub(crate) program: &'a Program,
    pub(crate) query: &'a Query,
    pub(crate) env: &'a dyn Environment,
    pub(crate) regs: SwapRegisters,
    /// Byte offset of the record being executed
    pub(crate) offset: usize,
    pub(crate) solved: bool,
    pub(crate) state: StateAccess<'a>,
    pub(crate) executor: Option<&'a mut dyn ExternalExecutor>,
    pub(crate) protocol_fees: Vec<ProtocolFee>,
    pub(crate) pending_fees: Vec<PendingFee>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        program: &'a Program,
        query: &'a Query,
        env: &'a dyn Environment,
        state: StateAccess<'a>,
        executor: Option<&'a mut dyn ExternalExecutor>,
    ) -> Self {
        Self {
            program,
            query,
            env,
            regs: SwapRegisters::seeded(query),
            offset: 0,
            solved: false,
            state,
            executor,
            protocol_fees: Vec::new(),
            pending_fees: Vec::new(),
        }
    }

    pub fn registers(&self) -> &SwapRegisters {
        &self.regs
    }

    pub fn query(&self) -> &Query {
        self.query
    }

    pub fn program_id(&self) -> ProgramId {
        self.program.id()
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn mode(&self) -> ExecutionMode {
        match self.state {
            StateAccess::View(_) => ExecutionMode::Simulate,
            StateAccess::Journal(_) => ExecutionMode::Commit,
        }
    }

    pub fn asset(&self, leg: Leg) -> AssetId {
        self.query.asset(leg)
    }

    pub(crate) fn state(&self) -> &dyn StateView {
        match &self.state {
            StateAccess::View(view) => *view,
            StateAccess::Journal(journal) => journal,
        }
    }

    /// Write access in Commit mode
    pub(crate) fn journal(&mut self) -> Option<&mut Journal<'a>> {
        match &mut self.state {
            StateAccess::View(_) => None,
            StateAccess::Journal(journal) => Some(journal),
        }
    }

    /// The leg whose amount the program has to compute
    pub(crate) fn unknown_leg(&self) -> Leg {
        if self.query.exact_in {
            Leg::Out
        } else {
            Leg::In
        }
    }

    pub(crate) fn require_unsolved(&self, opcode: Opcode) -> Result<(), VmError> {
        if self.solved {
            return Err(OrderingFault::AlreadySolved(opcode).into());
        }
        Ok(())
    }

    pub(crate) fn require_solved(&self, opcode: Opcode) -> Result<(), VmError> {
        if !self.solved {
            return Err(OrderingFault::NotSolved(opcode).into());
        }
        Ok(())
    }
}
