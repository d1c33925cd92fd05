//! Invocation inputs and the swap registers

use serde::{Deserialize, Serialize};

use crate::error::VmError;
use crate::ids::{Address, AssetId};

/// Read-only quotation or state-committing execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Simulate,
    Commit,
}

/// Side of a trade, from the taker's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    In,
    Out,
}

/// What the taker asks for; immutable for the whole invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub taker: Address,
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    /// Input amount when `exact_in`, output amount otherwise
    pub amount: u64,
    pub exact_in: bool,
    pub mode: ExecutionMode,
}

impl Query {
    /// Simulated exact-in query
    pub fn exact_in(asset_in: AssetId, asset_out: AssetId, amount_in: u64) -> Self {
        Self {
            taker: Address::default(),
            asset_in,
            asset_out,
            amount: amount_in,
            exact_in: true,
            mode: ExecutionMode::Simulate,
        }
    }

    /// Simulated exact-out query
    pub fn exact_out(asset_in: AssetId, asset_out: AssetId, amount_out: u64) -> Self {
        Self {
            exact_in: false,
            ..Self::exact_in(asset_in, asset_out, amount_out)
        }
    }

    pub fn with_taker(mut self, taker: Address) -> Self {
        self.taker = taker;
        self
    }

    pub fn committing(mut self) -> Self {
        self.mode = ExecutionMode::Commit;
        self
    }

    /// Asset traded on `leg`
    pub fn asset(&self, leg: Leg) -> AssetId {
        match leg {
            Leg::In => self.asset_in,
            Leg::Out => self.asset_out,
        }
    }

    /// Whether the input asset sorts before the output asset
    pub fn in_is_lower(&self) -> bool {
        self.asset_in < self.asset_out
    }

    pub(crate) fn validate(&self) -> Result<(), VmError> {
        if self.asset_in == self.asset_out {
            return Err(VmError::InvalidQuery("asset_in equals asset_out"));
        }
        if self.amount == 0 {
            return Err(VmError::InvalidQuery("amount is zero"));
        }
        Ok(())
    }
}

/// The four quantities threaded through every instruction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRegisters {
    pub balance_in: u64,
    pub balance_out: u64,
    pub amount_in: u64,
    pub amount_out: u64,
}

impl SwapRegisters {
    /// Registers seeded from the query: the requested side is known, the other is zero
    pub fn seeded(query: &Query) -> Self {
        if query.exact_in {
            Self {
                amount_in: query.amount,
                ..Self::default()
            }
        } else {
            Self {
                amount_out: query.amount,
                ..Self::default()
            }
        }
    }

    pub fn balance(&self, leg: Leg) -> u64 {
        match leg {
            Leg::In => self.balance_in,
            Leg::Out => self.balance_out,
        }
    }

    pub fn amount(&self, leg: Leg) -> u64 {
        match leg {
            Leg::In => self.amount_in,
            Leg::Out => self.amount_out,
        }
    }

    pub fn amount_mut(&mut self, leg: Leg) -> &mut u64 {
        match leg {
            Leg::In => &mut self.amount_in,
            Leg::Out => &mut self.amount_out,
        }
    }
}
