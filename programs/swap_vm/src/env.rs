//! Host environment: time, gas price, oracles, token views and external logic
//!
//! Read-only queries go through [`Environment`]. State-committing calls into
//! external logic go through [`ExternalExecutor`], which only the Commit
//! entry point receives.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ExternalError;
use crate::ids::{Address, AssetId, ProgramId};
use crate::query::{Query, SwapRegisters};

/// Oracle answer: the valuation of the lower-ordered asset (WAD) and when it was set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleReading {
    pub value: u64,
    pub updated_at: u64,
}

/// Request handed to external logic by `Extruction`
#[derive(Debug, Clone, Copy)]
pub struct ExternalCall<'a> {
    pub target: Address,
    pub program: ProgramId,
    pub query: &'a Query,
    pub registers: SwapRegisters,
    pub payload: &'a [u8],
}

/// External logic's answer: replacement registers and an optional jump (byte offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalOutcome {
    pub registers: SwapRegisters,
    pub jump: Option<u16>,
}

/// Read-only host queries
pub trait Environment {
    /// Unix seconds
    fn now(&self) -> u64;

    /// Current base gas price
    fn base_fee(&self) -> u64;

    fn oracle(&self, oracle: &Address) -> Option<OracleReading>;

    fn balance_of(&self, asset: &AssetId, holder: &Address) -> u64;

    fn total_supply(&self, asset: &AssetId) -> u64;

    /// Maker reserve backing `program` in `asset`, if the host tracks one
    fn reserve(&self, program: &ProgramId, asset: &AssetId) -> Option<u64>;

    /// Read-only invocation of external logic
    fn quote_external(&self, call: &ExternalCall<'_>) -> Result<ExternalOutcome, ExternalError>;
}

/// State-committing invocation of external logic
pub trait ExternalExecutor {
    fn execute_external(&mut self, call: &ExternalCall<'_>) -> Result<ExternalOutcome, ExternalError>;
}

/// Executor for hosts without external logic; every call fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternal;

impl ExternalExecutor for NoExternal {
    fn execute_external(&mut self, call: &ExternalCall<'_>) -> Result<ExternalOutcome, ExternalError> {
        Err(ExternalError {
            target: call.target,
            reason: "no external logic available".to_string(),
        })
    }
}

/// Environment backed by fixed values
///
/// Reserves are reported per asset, the same for every program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedEnvironment {
    pub now: u64,
    pub base_fee: u64,
    pub oracles: BTreeMap<Address, OracleReading>,
    pub balances: BTreeMap<(AssetId, Address), u64>,
    pub supply: BTreeMap<AssetId, u64>,
    pub reserves: BTreeMap<AssetId, u64>,
}

impl FixedEnvironment {
    pub fn at(now: u64) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn with_base_fee(mut self, base_fee: u64) -> Self {
        self.base_fee = base_fee;
        self
    }

    pub fn with_oracle(mut self, oracle: Address, value: u64, updated_at: u64) -> Self {
        self.oracles.insert(oracle, OracleReading { value, updated_at });
        self
    }

    pub fn with_balance(mut self, asset: AssetId, holder: Address, amount: u64) -> Self {
        self.balances.insert((asset, holder), amount);
        self
    }

    pub fn with_supply(mut self, asset: AssetId, supply: u64) -> Self {
        self.supply.insert(asset, supply);
        self
    }

    pub fn with_reserve(mut self, asset: AssetId, reserve: u64) -> Self {
        self.reserves.insert(asset, reserve);
        self
    }
}

impl Environment for FixedEnvironment {
    fn now(&self) -> u64 {
        self.now
    }

    fn base_fee(&self) -> u64 {
        self.base_fee
    }

    fn oracle(&self, oracle: &Address) -> Option<OracleReading> {
        self.oracles.get(oracle).copied()
    }

    fn balance_of(&self, asset: &AssetId, holder: &Address) -> u64 {
        self.balances.get(&(*asset, *holder)).copied().unwrap_or(0)
    }

    fn total_supply(&self, asset: &AssetId) -> u64 {
        self.supply.get(asset).copied().unwrap_or(0)
    }

    fn reserve(&self, _program: &ProgramId, asset: &AssetId) -> Option<u64> {
        self.reserves.get(asset).copied()
    }

    fn quote_external(&self, call: &ExternalCall<'_>) -> Result<ExternalOutcome, ExternalError> {
        Err(ExternalError {
            target: call.target,
            reason: "no external logic available".to_string(),
        })
    }
}
