//! Error types for program decoding, assembly and execution
//!
//! Every failure aborts the whole invocation; nothing is retried and no
//! persistent state is written (Commit writes are journaled until success).

use swap_math::MathError;

use crate::ids::Address;
use crate::opcode::Opcode;

/// Program bytes that cannot be decoded against the instruction set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown opcode {code} at offset {offset}")]
    UnknownOpcode { code: u8, offset: usize },
    #[error("truncated record at offset {offset}")]
    Truncated { offset: usize },
    #[error("{opcode} at offset {offset}: expected {expected} argument bytes, got {actual}")]
    ArgumentLength {
        opcode: Opcode,
        offset: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{opcode} at offset {offset}: {reason}")]
    InvalidArgument {
        opcode: Opcode,
        offset: usize,
        reason: &'static str,
    },
    #[error("jump target {target} is not a record boundary")]
    InvalidJumpTarget { target: usize },
    #[error("conditional jump at offset {offset} must target a later record")]
    BackwardConditionalJump { offset: usize },
}

/// Predicates that guard instructions enforce
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardFailure {
    #[error("deadline {deadline} passed (now {now})")]
    DeadlinePassed { deadline: u64, now: u64 },
    #[error("taker balance {balance} below required {min}")]
    TakerBalanceTooLow { balance: u64, min: u64 },
    #[error("taker supply share {share} below required {min} (WAD)")]
    TakerShareTooLow { share: u64, min: u64 },
    #[error("asset is not priced by this program")]
    AssetNotPriced,
    #[error("auction expired at {expired_at} (now {now})")]
    AuctionExpired { expired_at: u64, now: u64 },
    #[error("twap starts at {start} (now {now})")]
    TwapNotStarted { start: u64, now: u64 },
    #[error("no unlocked twap liquidity")]
    NothingUnlocked,
    #[error("trade output {amount_out} below minimum {min}")]
    MinTradeOutput { amount_out: u64, min: u64 },
    #[error("rate {amount_out}/{amount_in} exceeds cap {rate_b}/{rate_a}")]
    RateExceeded {
        amount_in: u64,
        amount_out: u64,
        rate_a: u64,
        rate_b: u64,
    },
    #[error("oracle {0} unavailable")]
    OracleUnavailable(Address),
    #[error("oracle reading is {age}s old, max {max_age}s")]
    StaleOracle { age: u64, max_age: u64 },
    #[error("valuation {0} outside (0, 1e18)")]
    InvalidValuation(u64),
    #[error("order invalidated (bit {bit})")]
    OrderInvalidated { bit: u32 },
    #[error("fill cap exceeded: {consumed} + {amount} > {max}")]
    FillCapExceeded { consumed: u64, amount: u64, max: u64 },
}

/// An instruction ran before (or after) the predecessor it depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OrderingFault {
    #[error("{0} must run before the swap amount is solved")]
    AlreadySolved(Opcode),
    #[error("{0} requires a solved swap amount")]
    NotSolved(Opcode),
    #[error("program finished without solving the swap amount")]
    AmountNotSolved,
}

/// Failure reported by external logic
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("external logic {target} failed: {reason}")]
pub struct ExternalError {
    pub target: Address,
    pub reason: String,
}

/// Invocation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("malformed program: {0}")]
    Malformed(#[from] DecodeError),
    #[error("arithmetic fault in {opcode}: {error}")]
    Arithmetic { opcode: Opcode, error: MathError },
    #[error("guard failed in {opcode}: {failure}")]
    Guard { opcode: Opcode, failure: GuardFailure },
    #[error("ordering fault: {0}")]
    Ordering(#[from] OrderingFault),
    #[error("invalid query: {0}")]
    InvalidQuery(&'static str),
    #[error("query mode {requested:?} does not match entry point {entry:?}")]
    ModeMismatch {
        requested: crate::query::ExecutionMode,
        entry: crate::query::ExecutionMode,
    },
    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(u32),
    #[error(transparent)]
    External(#[from] ExternalError),
}

impl VmError {
    /// Guard failure raised by `opcode`
    pub fn guard(opcode: Opcode, failure: GuardFailure) -> Self {
        VmError::Guard { opcode, failure }
    }

    /// The failed guard predicate, if this is a guard failure
    pub fn guard_failure(&self) -> Option<&GuardFailure> {
        match self {
            VmError::Guard { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

/// Attach the failing opcode to a math error
pub(crate) trait MathContext<T> {
    fn in_op(self, opcode: Opcode) -> Result<T, VmError>;
}

impl<T> MathContext<T> for Result<T, MathError> {
    fn in_op(self, opcode: Opcode) -> Result<T, VmError> {
        self.map_err(|error| VmError::Arithmetic { opcode, error })
    }
}

/// Assembler failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("label {0} was never placed")]
    UnresolvedLabel(u32),
    #[error("label {0} placed twice")]
    DuplicateLabel(u32),
    #[error("{0} is not wired into this instruction set")]
    OpcodeNotInSet(Opcode),
    #[error("{opcode} arguments are {len} bytes, max 255")]
    ArgumentsTooLong { opcode: Opcode, len: usize },
    #[error("program offset {0} does not fit a u16 jump target")]
    ProgramTooLong(usize),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
