//! Program builder ("assembler")
//!
//! Builds programs without computing byte offsets by hand. Jumps refer to
//! [`Label`]s that are resolved to record offsets in [`ProgramBuilder::build`].

use crate::error::BuildError;
use crate::ids::{Address, AssetId, ProgramId};
use crate::instruction::{Auction, GasAdjust, Instruction, ProgressiveFee, RateBound, TwapSchedule};
use crate::opcode::InstructionSet;
use crate::program::{Program, HEADER_LEN};

/// A jump target
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(u32);

#[derive(Debug, Clone)]
enum JumpKind {
    Always,
    AssetIn(AssetId),
    AssetOut(AssetId),
}

#[derive(Debug, Clone)]
enum Item {
    Op(Instruction),
    Jump { kind: JumpKind, label: Label },
}

impl Item {
    fn instruction(&self, target: u16) -> Instruction {
        match self {
            Item::Op(ins) => ins.clone(),
            Item::Jump { kind, .. } => match kind {
                JumpKind::Always => Instruction::Jump { target },
                JumpKind::AssetIn(asset) => Instruction::JumpIfAssetIn { asset: *asset, target },
                JumpKind::AssetOut(asset) => Instruction::JumpIfAssetOut { asset: *asset, target },
            },
        }
    }
}

/// Assembles a program record by record
#[derive(Debug, Clone)]
pub struct ProgramBuilder {
    set: InstructionSet,
    items: Vec<Item>,
    // Item index each label was placed before
    labels: Vec<Option<usize>>,
    error: Option<BuildError>,
}

impl ProgramBuilder {
    pub fn new(set: InstructionSet) -> Self {
        Self {
            set,
            items: Vec::new(),
            labels: Vec::new(),
            error: None,
        }
    }

    pub fn set(&self) -> &InstructionSet {
        &self.set
    }

    /// Create an unplaced label
    pub fn label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() as u32 - 1)
    }

    /// Bind `label` to the next record (or the end of the program)
    pub fn place(&mut self, label: Label) -> &mut Self {
        let at = self.items.len();
        let error = match self.labels.get_mut(label.0 as usize) {
            Some(slot) if slot.is_none() => {
                *slot = Some(at);
                None
            }
            Some(_) => Some(BuildError::DuplicateLabel(label.0)),
            None => Some(BuildError::UnresolvedLabel(label.0)),
        };
        if let Some(error) = error {
            self.fail(error);
        }
        self
    }

    fn fail(&mut self, error: BuildError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Append an already-typed instruction; jump targets are taken as byte offsets
    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.items.push(Item::Op(instruction));
        self
    }

    fn push_jump(&mut self, kind: JumpKind, label: Label) -> &mut Self {
        self.items.push(Item::Jump { kind, label });
        self
    }

    pub fn jump(&mut self, label: Label) -> &mut Self {
        self.push_jump(JumpKind::Always, label)
    }

    pub fn jump_if_asset_in(&mut self, asset: AssetId, label: Label) -> &mut Self {
        self.push_jump(JumpKind::AssetIn(asset), label)
    }

    pub fn jump_if_asset_out(&mut self, asset: AssetId, label: Label) -> &mut Self {
        self.push_jump(JumpKind::AssetOut(asset), label)
    }

    pub fn deadline(&mut self, deadline: u64) -> &mut Self {
        self.push(Instruction::Deadline { deadline })
    }

    pub fn only_taker_balance_gte(&mut self, asset: AssetId, min: u64) -> &mut Self {
        self.push(Instruction::OnlyTakerBalanceGte { asset, min })
    }

    pub fn only_taker_supply_share_gte(&mut self, asset: AssetId, min_share: u64) -> &mut Self {
        self.push(Instruction::OnlyTakerSupplyShareGte { asset, min_share })
    }

    pub fn salt(&mut self, salt: &[u8]) -> &mut Self {
        self.push(Instruction::Salt(salt.to_vec()))
    }

    pub fn static_balances(&mut self, entries: &[(AssetId, u64)]) -> &mut Self {
        self.push(Instruction::StaticBalances(entries.to_vec()))
    }

    pub fn dynamic_balances(&mut self, entries: &[(AssetId, u64)]) -> &mut Self {
        self.push(Instruction::DynamicBalances(entries.to_vec()))
    }

    pub fn external_balances(&mut self) -> &mut Self {
        self.push(Instruction::ExternalBalances)
    }

    pub fn xyc_swap(&mut self) -> &mut Self {
        self.push(Instruction::XycSwap)
    }

    pub fn grow_liquidity(&mut self, deltas: &[(AssetId, u64)]) -> &mut Self {
        self.push(Instruction::ConcentrateGrowLiquidity(deltas.to_vec()))
    }

    pub fn grow_price_range(&mut self, delta_lt: u64, delta_gt: u64) -> &mut Self {
        self.push(Instruction::ConcentrateGrowPriceRange { delta_lt, delta_gt })
    }

    pub fn decay(&mut self, period: u32) -> &mut Self {
        self.push(Instruction::Decay { period })
    }

    pub fn dutch_auction_balance_in(&mut self, auction: Auction) -> &mut Self {
        self.push(Instruction::DutchAuctionBalanceIn(auction))
    }

    pub fn dutch_auction_balance_out(&mut self, auction: Auction) -> &mut Self {
        self.push(Instruction::DutchAuctionBalanceOut(auction))
    }

    pub fn twap(&mut self, schedule: TwapSchedule) -> &mut Self {
        self.push(Instruction::Twap(schedule))
    }

    pub fn flat_fee_in(&mut self, fee_bps: u16) -> &mut Self {
        self.push(Instruction::FlatFeeIn { fee_bps })
    }

    pub fn flat_fee_out(&mut self, fee_bps: u16) -> &mut Self {
        self.push(Instruction::FlatFeeOut { fee_bps })
    }

    pub fn progressive_fee_in(&mut self, fee: ProgressiveFee) -> &mut Self {
        self.push(Instruction::ProgressiveFeeIn(fee))
    }

    pub fn progressive_fee_out(&mut self, fee: ProgressiveFee) -> &mut Self {
        self.push(Instruction::ProgressiveFeeOut(fee))
    }

    pub fn protocol_fee_in(&mut self, fee_bps: u16, recipient: Address) -> &mut Self {
        self.push(Instruction::ProtocolFeeIn { fee_bps, recipient })
    }

    pub fn protocol_fee_out(&mut self, fee_bps: u16, recipient: Address) -> &mut Self {
        self.push(Instruction::ProtocolFeeOut { fee_bps, recipient })
    }

    pub fn min_rate_adjust(&mut self, rate_lt: u64, rate_gt: u64) -> &mut Self {
        self.push(Instruction::MinRateAdjust(RateBound { rate_lt, rate_gt }))
    }

    pub fn min_rate_require(&mut self, rate_lt: u64, rate_gt: u64) -> &mut Self {
        self.push(Instruction::MinRateRequire(RateBound { rate_lt, rate_gt }))
    }

    pub fn base_fee_adjust(&mut self, adjust: GasAdjust) -> &mut Self {
        self.push(Instruction::BaseFeeAdjust(adjust))
    }

    pub fn valuation_static(&mut self, valuation: u64) -> &mut Self {
        self.push(Instruction::ValuationStatic { valuation })
    }

    pub fn valuation_oracle(&mut self, oracle: Address) -> &mut Self {
        self.push(Instruction::ValuationOracle { oracle })
    }

    pub fn valuation_oracle_fresh(&mut self, oracle: Address, max_age: u32) -> &mut Self {
        self.push(Instruction::ValuationOracleFresh { oracle, max_age })
    }

    pub fn valuation_bounded(&mut self, oracle: Address, max_age: u32, max_delta_bps: u16) -> &mut Self {
        self.push(Instruction::ValuationBounded {
            oracle,
            max_age,
            max_delta_bps,
        })
    }

    pub fn invalidate_bit(&mut self, bit: u32) -> &mut Self {
        self.push(Instruction::InvalidateBit { bit })
    }

    pub fn invalidate_asset_in(&mut self, max: u64) -> &mut Self {
        self.push(Instruction::InvalidateAssetIn { max })
    }

    pub fn invalidate_asset_out(&mut self, max: u64) -> &mut Self {
        self.push(Instruction::InvalidateAssetOut { max })
    }

    pub fn extruction(&mut self, target: Address, payload: &[u8]) -> &mut Self {
        self.push(Instruction::Extruction {
            target,
            payload: payload.to_vec(),
        })
    }

    /// Resolve labels and encode against the instruction set
    pub fn encode(&self) -> Result<Vec<u8>, BuildError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        // Jump records have a fixed size, so offsets do not depend on targets
        let mut offsets = Vec::with_capacity(self.items.len());
        let mut end = 0usize;
        for item in &self.items {
            offsets.push(end);
            end += HEADER_LEN + item.instruction(0).encode_args().len();
        }
        let offset_of = |label: Label| -> Result<u16, BuildError> {
            let index = self
                .labels
                .get(label.0 as usize)
                .copied()
                .flatten()
                .ok_or(BuildError::UnresolvedLabel(label.0))?;
            let offset = offsets.get(index).copied().unwrap_or(end);
            u16::try_from(offset).map_err(|_| BuildError::ProgramTooLong(offset))
        };

        let mut bytes = Vec::with_capacity(end);
        for item in &self.items {
            let target = match item {
                Item::Jump { label, .. } => offset_of(*label)?,
                Item::Op(_) => 0,
            };
            let ins = item.instruction(target);
            let opcode = ins.opcode();
            let code = self
                .set
                .encode(opcode)
                .ok_or(BuildError::OpcodeNotInSet(opcode))?;
            let args = ins.encode_args();
            let len = u8::try_from(args.len()).map_err(|_| BuildError::ArgumentsTooLong {
                opcode,
                len: args.len(),
            })?;
            bytes.push(code);
            bytes.push(len);
            bytes.extend_from_slice(&args);
        }
        Ok(bytes)
    }

    /// Encode and decode into a validated program
    pub fn build(&self, id: ProgramId) -> Result<Program, BuildError> {
        let bytes = self.encode()?;
        Ok(Program::decode(id, &bytes, &self.set)?)
    }
}
