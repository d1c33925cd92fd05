//! Swap VM - a bytecode interpreter for composable swap pricing programs
//!
//! A maker publishes a [`Program`]: a sequence of records drawn from a fixed
//! [`InstructionSet`]. A taker's [`Query`] (assets, amount, exact-in or
//! exact-out) runs the program over four registers (`balance_in`,
//! `balance_out`, `amount_in`, `amount_out`). Balance instructions load
//! reserves, modifiers reshape them, `xyc_swap` solves the unknown amount and
//! guards, fees and bounds finish the result.
//!
//! Two entry points:
//! - [`SwapVm::quote`] prices a swap against a read-only [`StateView`]
//! - [`SwapVm::swap`] executes it, journaling every per-order state write and
//!   applying the journal to the [`OrderStore`] only on success
//!
//! Arithmetic lives in the dependency-free `swap_math` crate.

pub mod asm;
pub mod context;
pub mod env;
pub mod error;
pub mod ids;
pub mod instruction;
mod instructions;
pub mod opcode;
pub mod program;
pub mod query;
pub mod reader;
pub mod state;
pub mod vm;

pub use asm::{Label, ProgramBuilder};
pub use context::{Context, Epilogue, Flow};
pub use env::{Environment, ExternalCall, ExternalExecutor, ExternalOutcome, FixedEnvironment, NoExternal, OracleReading};
pub use error::{BuildError, DecodeError, ExternalError, GuardFailure, OrderingFault, VmError};
pub use ids::{Address, AssetId, ParseIdError, ProgramId};
pub use instruction::{Auction, GasAdjust, Instruction, ProgressiveFee, RateBound, TwapSchedule};
pub use opcode::{InstructionSet, Opcode};
pub use program::{Program, Record};
pub use query::{ExecutionMode, Leg, Query, SwapRegisters};
pub use state::{DecayOffset, Journal, OrderStore, StateDelta, StateView, TwapState};
pub use vm::{ProtocolFee, SwapOutcome, SwapVm, VmConfig, DEFAULT_MAX_STEPS};

pub use swap_math::{BPS, WAD};
