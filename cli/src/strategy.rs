//! Strategy files: TOML programs assembled into swap VM bytecode
//!
//! ```toml
//! id = "usdc-weth"          # optional, defaults to the blake3 hash of the bytes
//!
//! [[step]]
//! op = "static_balances"
//! balances = { USDC = 1000, WETH = 2000 }
//!
//! [[step]]
//! op = "flat_fee_in"
//! fee_bps = 30
//!
//! [[step]]
//! op = "xyc_swap"
//! ```
//!
//! Jump targets name a `label` step placed anywhere in the program.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use swap_vm::{
    Address, AssetId, Auction, GasAdjust, InstructionSet, Label, Program, ProgramBuilder, ProgramId, ProgressiveFee,
    TwapSchedule,
};

#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("label `{0}` is never placed")]
    UnknownLabel(String),
    #[error("label `{0}` placed twice")]
    DuplicateLabel(String),
    #[error("invalid hex in step {step}: {source}")]
    Hex {
        step: usize,
        #[source]
        source: hex::FromHexError,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Strategy {
    pub id: Option<ProgramId>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Label { name: String },

    Jump { to: String },
    JumpIfAssetIn { asset: AssetId, to: String },
    JumpIfAssetOut { asset: AssetId, to: String },
    Deadline { deadline: u64 },
    OnlyTakerBalanceGte { asset: AssetId, min: u64 },
    OnlyTakerSupplyShareGte { asset: AssetId, min_share: u64 },
    Salt { hex: String },

    StaticBalances { balances: BTreeMap<AssetId, u64> },
    DynamicBalances { balances: BTreeMap<AssetId, u64> },
    ExternalBalances,
    XycSwap,
    ConcentrateGrowLiquidity { deltas: BTreeMap<AssetId, u64> },
    ConcentrateGrowPriceRange { delta_lt: u64, delta_gt: u64 },

    Decay { period: u32 },
    DutchAuctionBalanceIn(Auction),
    DutchAuctionBalanceOut(Auction),
    Twap(TwapSchedule),

    FlatFeeIn { fee_bps: u16 },
    FlatFeeOut { fee_bps: u16 },
    ProgressiveFeeIn(ProgressiveFee),
    ProgressiveFeeOut(ProgressiveFee),
    ProtocolFeeIn { fee_bps: u16, recipient: Address },
    ProtocolFeeOut { fee_bps: u16, recipient: Address },

    MinRateAdjust { rate_lt: u64, rate_gt: u64 },
    MinRateRequire { rate_lt: u64, rate_gt: u64 },
    BaseFeeAdjust(GasAdjust),

    ValuationStatic { valuation: u64 },
    ValuationOracle { oracle: Address },
    ValuationOracleFresh { oracle: Address, max_age: u32 },
    ValuationBounded { oracle: Address, max_age: u32, max_delta_bps: u16 },

    InvalidateBit { bit: u32 },
    InvalidateAssetIn { max: u64 },
    InvalidateAssetOut { max: u64 },
    Extruction {
        target: Address,
        #[serde(default)]
        payload: String,
    },
}

fn entries(map: &BTreeMap<AssetId, u64>) -> Vec<(AssetId, u64)> {
    map.iter().map(|(asset, amount)| (*asset, *amount)).collect()
}

impl Strategy {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read strategy file: {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("Failed to parse strategy file: {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    /// Lower the steps into a builder, resolving label names
    fn builder(&self, set: InstructionSet) -> Result<ProgramBuilder, StrategyError> {
        let mut builder = ProgramBuilder::new(set);

        let mut labels: BTreeMap<&str, Label> = BTreeMap::new();
        for step in &self.steps {
            let names = match step {
                Step::Label { name } => vec![name],
                Step::Jump { to } | Step::JumpIfAssetIn { to, .. } | Step::JumpIfAssetOut { to, .. } => vec![to],
                _ => Vec::new(),
            };
            for name in names {
                if !labels.contains_key(name.as_str()) {
                    labels.insert(name.as_str(), builder.label());
                }
            }
        }
        let label = |name: &String| labels[name.as_str()];

        let mut placed = BTreeSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::Label { name } => {
                    if !placed.insert(name.as_str()) {
                        return Err(StrategyError::DuplicateLabel(name.clone()));
                    }
                    builder.place(label(name));
                }
                Step::Jump { to } => {
                    builder.jump(label(to));
                }
                Step::JumpIfAssetIn { asset, to } => {
                    builder.jump_if_asset_in(*asset, label(to));
                }
                Step::JumpIfAssetOut { asset, to } => {
                    builder.jump_if_asset_out(*asset, label(to));
                }
                Step::Deadline { deadline } => {
                    builder.deadline(*deadline);
                }
                Step::OnlyTakerBalanceGte { asset, min } => {
                    builder.only_taker_balance_gte(*asset, *min);
                }
                Step::OnlyTakerSupplyShareGte { asset, min_share } => {
                    builder.only_taker_supply_share_gte(*asset, *min_share);
                }
                Step::Salt { hex: text } => {
                    let salt = hex::decode(text).map_err(|source| StrategyError::Hex { step: index, source })?;
                    builder.salt(&salt);
                }
                Step::StaticBalances { balances } => {
                    builder.static_balances(&entries(balances));
                }
                Step::DynamicBalances { balances } => {
                    builder.dynamic_balances(&entries(balances));
                }
                Step::ExternalBalances => {
                    builder.external_balances();
                }
                Step::XycSwap => {
                    builder.xyc_swap();
                }
                Step::ConcentrateGrowLiquidity { deltas } => {
                    builder.grow_liquidity(&entries(deltas));
                }
                Step::ConcentrateGrowPriceRange { delta_lt, delta_gt } => {
                    builder.grow_price_range(*delta_lt, *delta_gt);
                }
                Step::Decay { period } => {
                    builder.decay(*period);
                }
                Step::DutchAuctionBalanceIn(auction) => {
                    builder.dutch_auction_balance_in(*auction);
                }
                Step::DutchAuctionBalanceOut(auction) => {
                    builder.dutch_auction_balance_out(*auction);
                }
                Step::Twap(schedule) => {
                    builder.twap(*schedule);
                }
                Step::FlatFeeIn { fee_bps } => {
                    builder.flat_fee_in(*fee_bps);
                }
                Step::FlatFeeOut { fee_bps } => {
                    builder.flat_fee_out(*fee_bps);
                }
                Step::ProgressiveFeeIn(fee) => {
                    builder.progressive_fee_in(*fee);
                }
                Step::ProgressiveFeeOut(fee) => {
                    builder.progressive_fee_out(*fee);
                }
                Step::ProtocolFeeIn { fee_bps, recipient } => {
                    builder.protocol_fee_in(*fee_bps, *recipient);
                }
                Step::ProtocolFeeOut { fee_bps, recipient } => {
                    builder.protocol_fee_out(*fee_bps, *recipient);
                }
                Step::MinRateAdjust { rate_lt, rate_gt } => {
                    builder.min_rate_adjust(*rate_lt, *rate_gt);
                }
                Step::MinRateRequire { rate_lt, rate_gt } => {
                    builder.min_rate_require(*rate_lt, *rate_gt);
                }
                Step::BaseFeeAdjust(adjust) => {
                    builder.base_fee_adjust(*adjust);
                }
                Step::ValuationStatic { valuation } => {
                    builder.valuation_static(*valuation);
                }
                Step::ValuationOracle { oracle } => {
                    builder.valuation_oracle(*oracle);
                }
                Step::ValuationOracleFresh { oracle, max_age } => {
                    builder.valuation_oracle_fresh(*oracle, *max_age);
                }
                Step::ValuationBounded {
                    oracle,
                    max_age,
                    max_delta_bps,
                } => {
                    builder.valuation_bounded(*oracle, *max_age, *max_delta_bps);
                }
                Step::InvalidateBit { bit } => {
                    builder.invalidate_bit(*bit);
                }
                Step::InvalidateAssetIn { max } => {
                    builder.invalidate_asset_in(*max);
                }
                Step::InvalidateAssetOut { max } => {
                    builder.invalidate_asset_out(*max);
                }
                Step::Extruction { target, payload } => {
                    let payload = hex::decode(payload).map_err(|source| StrategyError::Hex { step: index, source })?;
                    builder.extruction(*target, &payload);
                }
            }
        }

        if let Some(missing) = labels.keys().find(|name| !placed.contains(*name)) {
            return Err(StrategyError::UnknownLabel(missing.to_string()));
        }
        Ok(builder)
    }

    /// Assemble against `set`; the id is pinned or derived from the bytes
    pub fn compile(&self, set: &InstructionSet) -> Result<Program> {
        let builder = self.builder(set.clone())?;
        let bytes = builder.encode().context("Failed to assemble strategy")?;
        let id = self.id.unwrap_or_else(|| content_id(&bytes));
        Ok(Program::decode(id, &bytes, set)?)
    }
}

/// blake3 digest of the program bytes
pub fn content_id(bytes: &[u8]) -> ProgramId {
    ProgramId::new(*blake3::hash(bytes).as_bytes())
}
