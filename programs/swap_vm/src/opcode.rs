//! Opcodes and instruction sets
//!
//! An [`InstructionSet`] is the per-deployment opcode table: a dense array
//! indexed by the code byte. Codes are positions in the list the set was
//! built from, so two deployments wiring different lists assign different
//! codes to the same opcode.

use core::fmt;

/// Every instruction the VM knows how to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    // Control flow
    Jump,
    JumpIfAssetIn,
    JumpIfAssetOut,
    Deadline,
    OnlyTakerBalanceGte,
    OnlyTakerSupplyShareGte,
    Salt,
    // Balances
    StaticBalances,
    DynamicBalances,
    ExternalBalances,
    // Swap engine
    XycSwap,
    // Concentration
    ConcentrateGrowLiquidity,
    ConcentrateGrowPriceRange,
    // Temporal modifiers
    Decay,
    DutchAuctionBalanceIn,
    DutchAuctionBalanceOut,
    Twap,
    // Fees
    FlatFeeIn,
    FlatFeeOut,
    ProgressiveFeeIn,
    ProgressiveFeeOut,
    ProtocolFeeIn,
    ProtocolFeeOut,
    // Rate bound
    MinRateAdjust,
    MinRateRequire,
    // Gas adjustment
    BaseFeeAdjust,
    // Valuation rebalancing
    ValuationStatic,
    ValuationOracle,
    ValuationOracleFresh,
    ValuationBounded,
    // Invalidation
    InvalidateBit,
    InvalidateAssetIn,
    InvalidateAssetOut,
    // Escape hatch
    Extruction,
}

impl Opcode {
    /// All opcodes, in v1 code order
    pub const ALL: [Opcode; 34] = [
        Opcode::Jump,
        Opcode::JumpIfAssetIn,
        Opcode::JumpIfAssetOut,
        Opcode::Deadline,
        Opcode::OnlyTakerBalanceGte,
        Opcode::OnlyTakerSupplyShareGte,
        Opcode::Salt,
        Opcode::StaticBalances,
        Opcode::DynamicBalances,
        Opcode::ExternalBalances,
        Opcode::XycSwap,
        Opcode::ConcentrateGrowLiquidity,
        Opcode::ConcentrateGrowPriceRange,
        Opcode::Decay,
        Opcode::DutchAuctionBalanceIn,
        Opcode::DutchAuctionBalanceOut,
        Opcode::Twap,
        Opcode::FlatFeeIn,
        Opcode::FlatFeeOut,
        Opcode::ProgressiveFeeIn,
        Opcode::ProgressiveFeeOut,
        Opcode::ProtocolFeeIn,
        Opcode::ProtocolFeeOut,
        Opcode::MinRateAdjust,
        Opcode::MinRateRequire,
        Opcode::BaseFeeAdjust,
        Opcode::ValuationStatic,
        Opcode::ValuationOracle,
        Opcode::ValuationOracleFresh,
        Opcode::ValuationBounded,
        Opcode::InvalidateBit,
        Opcode::InvalidateAssetIn,
        Opcode::InvalidateAssetOut,
        Opcode::Extruction,
    ];

    /// Assembly mnemonic
    pub const fn name(self) -> &'static str {
        match self {
            Opcode::Jump => "jump",
            Opcode::JumpIfAssetIn => "jump_if_asset_in",
            Opcode::JumpIfAssetOut => "jump_if_asset_out",
            Opcode::Deadline => "deadline",
            Opcode::OnlyTakerBalanceGte => "only_taker_balance_gte",
            Opcode::OnlyTakerSupplyShareGte => "only_taker_supply_share_gte",
            Opcode::Salt => "salt",
            Opcode::StaticBalances => "static_balances",
            Opcode::DynamicBalances => "dynamic_balances",
            Opcode::ExternalBalances => "external_balances",
            Opcode::XycSwap => "xyc_swap",
            Opcode::ConcentrateGrowLiquidity => "concentrate_grow_liquidity",
            Opcode::ConcentrateGrowPriceRange => "concentrate_grow_price_range",
            Opcode::Decay => "decay",
            Opcode::DutchAuctionBalanceIn => "dutch_auction_balance_in",
            Opcode::DutchAuctionBalanceOut => "dutch_auction_balance_out",
            Opcode::Twap => "twap",
            Opcode::FlatFeeIn => "flat_fee_in",
            Opcode::FlatFeeOut => "flat_fee_out",
            Opcode::ProgressiveFeeIn => "progressive_fee_in",
            Opcode::ProgressiveFeeOut => "progressive_fee_out",
            Opcode::ProtocolFeeIn => "protocol_fee_in",
            Opcode::ProtocolFeeOut => "protocol_fee_out",
            Opcode::MinRateAdjust => "min_rate_adjust",
            Opcode::MinRateRequire => "min_rate_require",
            Opcode::BaseFeeAdjust => "base_fee_adjust",
            Opcode::ValuationStatic => "valuation_static",
            Opcode::ValuationOracle => "valuation_oracle",
            Opcode::ValuationOracleFresh => "valuation_oracle_fresh",
            Opcode::ValuationBounded => "valuation_bounded",
            Opcode::InvalidateBit => "invalidate_bit",
            Opcode::InvalidateAssetIn => "invalidate_asset_in",
            Opcode::InvalidateAssetOut => "invalidate_asset_out",
            Opcode::Extruction => "extruction",
        }
    }

    /// Reads or writes per-order persistent state, or calls external logic
    pub const fn is_stateful(self) -> bool {
        matches!(
            self,
            Opcode::DynamicBalances
                | Opcode::Decay
                | Opcode::Twap
                | Opcode::InvalidateBit
                | Opcode::InvalidateAssetIn
                | Opcode::InvalidateAssetOut
                | Opcode::Extruction
        )
    }

    /// Transfers control to another record
    pub const fn is_jump(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpIfAssetIn | Opcode::JumpIfAssetOut)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dense code → opcode table, fixed per deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSet {
    name: &'static str,
    table: Vec<Opcode>,
}

impl InstructionSet {
    /// Build a table; the code of each opcode is its position in `opcodes`
    ///
    /// Duplicates keep their first position. At most 256 opcodes are wired.
    pub fn new(name: &'static str, opcodes: &[Opcode]) -> Self {
        let mut table: Vec<Opcode> = Vec::with_capacity(opcodes.len());
        for &op in opcodes.iter() {
            if !table.contains(&op) && table.len() < 256 {
                table.push(op);
            }
        }
        Self { name, table }
    }

    /// Full instruction set
    pub fn v1() -> Self {
        Self::new("v1", &Opcode::ALL)
    }

    /// Only instructions that never touch persistent state or external logic
    pub fn stateless() -> Self {
        let opcodes: Vec<Opcode> = Opcode::ALL
            .iter()
            .copied()
            .filter(|op| !op.is_stateful())
            .collect();
        Self::new("stateless", &opcodes)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Opcode wired at `code`
    pub fn decode(&self, code: u8) -> Option<Opcode> {
        self.table.get(code as usize).copied()
    }

    /// Code assigned to `opcode`
    pub fn encode(&self, opcode: Opcode) -> Option<u8> {
        self.table
            .iter()
            .position(|&op| op == opcode)
            .and_then(|pos| u8::try_from(pos).ok())
    }

    pub fn contains(&self, opcode: Opcode) -> bool {
        self.table.contains(&opcode)
    }
}

impl Default for InstructionSet {
    fn default() -> Self {
        Self::v1()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_codes_are_stable() {
        let set = InstructionSet::v1();
        assert_eq!(set.encode(Opcode::Jump), Some(0));
        assert_eq!(set.encode(Opcode::StaticBalances), Some(7));
        assert_eq!(set.encode(Opcode::XycSwap), Some(10));
        assert_eq!(set.encode(Opcode::FlatFeeIn), Some(17));
        assert_eq!(set.encode(Opcode::InvalidateBit), Some(30));
        assert_eq!(set.encode(Opcode::Extruction), Some(33));
        assert_eq!(set.decode(34), None);
    }

    #[test]
    fn test_round_trip_all_codes() {
        let set = InstructionSet::v1();
        for op in Opcode::ALL {
            let code = set.encode(op).unwrap();
            assert_eq!(set.decode(code), Some(op));
        }
    }

    #[test]
    fn test_stateless_set_excludes_state() {
        let set = InstructionSet::stateless();
        assert!(!set.contains(Opcode::Decay));
        assert!(!set.contains(Opcode::InvalidateBit));
        assert!(!set.contains(Opcode::Extruction));
        assert!(set.contains(Opcode::XycSwap));
        // Codes are dense in the restricted table
        assert_eq!(set.len(), Opcode::ALL.len() - 7);
        assert_eq!(set.decode(set.len() as u8 - 1), Some(Opcode::ValuationBounded));
    }

    #[test]
    fn test_duplicates_ignored() {
        let set = InstructionSet::new("custom", &[Opcode::XycSwap, Opcode::XycSwap, Opcode::Salt]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.encode(Opcode::Salt), Some(1));
    }
}
