//! Typed instructions
//!
//! Arguments are decoded once, when the program is loaded, and validated
//! there; execution only ever sees well-formed values.

use core::fmt;

use serde::{Deserialize, Serialize};
use swap_math::{BPS, WAD};

use crate::error::DecodeError;
use crate::ids::{Address, AssetId};
use crate::opcode::Opcode;
use crate::reader::{write_entries, write_u16, write_u32, write_u64, ArgReader};

/// Dutch auction schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    pub start: u64,
    pub duration: u32,
    /// Per-second decay factor (WAD, at most 1)
    pub decay: u64,
}

/// TWAP sale schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapSchedule {
    pub start: u64,
    pub duration: u32,
    /// Total input asked for the whole sale
    pub balance_in: u64,
    /// Total output sold over `duration`
    pub balance_out: u64,
    /// Per-second price decay since the last fill (WAD)
    pub decay: u64,
    pub illiquidity_period: u32,
    /// Price bump applied after an illiquid gap (WAD, at least 1)
    pub price_bump: u64,
    pub min_trade_out: u64,
}

/// `min(max, base + slope · amount / balance)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveFee {
    pub base_bps: u16,
    pub slope_bps: u16,
    pub max_bps: u16,
}

/// Rate cap, in terms of the lower and higher ordered asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBound {
    pub rate_lt: u64,
    pub rate_gt: u64,
}

/// Gas cost compensation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasAdjust {
    pub base_fee: u64,
    pub gas_amount: u64,
    /// Output asset per unit of gas cost (WAD)
    pub gas_price: u64,
    pub max_bps: u16,
}

/// One decoded program record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Jump { target: u16 },
    JumpIfAssetIn { asset: AssetId, target: u16 },
    JumpIfAssetOut { asset: AssetId, target: u16 },
    Deadline { deadline: u64 },
    OnlyTakerBalanceGte { asset: AssetId, min: u64 },
    OnlyTakerSupplyShareGte { asset: AssetId, min_share: u64 },
    Salt(Vec<u8>),
    StaticBalances(Vec<(AssetId, u64)>),
    DynamicBalances(Vec<(AssetId, u64)>),
    ExternalBalances,
    XycSwap,
    ConcentrateGrowLiquidity(Vec<(AssetId, u64)>),
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
    MinRateAdjust(RateBound),
    MinRateRequire(RateBound),
    BaseFeeAdjust(GasAdjust),
    ValuationStatic { valuation: u64 },
    ValuationOracle { oracle: Address },
    ValuationOracleFresh { oracle: Address, max_age: u32 },
    ValuationBounded { oracle: Address, max_age: u32, max_delta_bps: u16 },
    InvalidateBit { bit: u32 },
    InvalidateAssetIn { max: u64 },
    InvalidateAssetOut { max: u64 },
    Extruction { target: Address, payload: Vec<u8> },
}

fn check_bps(r: &ArgReader<'_>, value: u16) -> Result<u16, DecodeError> {
    if (value as u64) < BPS {
        Ok(value)
    } else {
        Err(r.invalid("basis points must be below 10000"))
    }
}

fn read_auction(r: &mut ArgReader<'_>) -> Result<Auction, DecodeError> {
    let auction = Auction {
        start: r.read_u64()?,
        duration: r.read_u32()?,
        decay: r.read_u64()?,
    };
    if auction.duration == 0 {
        return Err(r.invalid("duration is zero"));
    }
    if auction.decay > WAD {
        return Err(r.invalid("decay factor above 1"));
    }
    Ok(auction)
}

fn read_twap(r: &mut ArgReader<'_>) -> Result<TwapSchedule, DecodeError> {
    let twap = TwapSchedule {
        start: r.read_u64()?,
        duration: r.read_u32()?,
        balance_in: r.read_u64()?,
        balance_out: r.read_u64()?,
        decay: r.read_u64()?,
        illiquidity_period: r.read_u32()?,
        price_bump: r.read_u64()?,
        min_trade_out: r.read_u64()?,
    };
    if twap.duration == 0 {
        return Err(r.invalid("duration is zero"));
    }
    if twap.balance_out == 0 {
        return Err(r.invalid("nothing to sell"));
    }
    if twap.decay > WAD {
        return Err(r.invalid("decay factor above 1"));
    }
    if twap.price_bump < WAD {
        return Err(r.invalid("price bump below 1"));
    }
    Ok(twap)
}

fn read_progressive(r: &mut ArgReader<'_>) -> Result<ProgressiveFee, DecodeError> {
    let base = r.read_u16()?;
    let slope = r.read_u16()?;
    let max = r.read_u16()?;
    Ok(ProgressiveFee {
        base_bps: check_bps(r, base)?,
        slope_bps: slope,
        max_bps: check_bps(r, max)?,
    })
}

fn read_rate(r: &mut ArgReader<'_>) -> Result<RateBound, DecodeError> {
    let bound = RateBound {
        rate_lt: r.read_u64()?,
        rate_gt: r.read_u64()?,
    };
    if bound.rate_lt == 0 || bound.rate_gt == 0 {
        return Err(r.invalid("rate component is zero"));
    }
    Ok(bound)
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Jump { .. } => Opcode::Jump,
            Instruction::JumpIfAssetIn { .. } => Opcode::JumpIfAssetIn,
            Instruction::JumpIfAssetOut { .. } => Opcode::JumpIfAssetOut,
            Instruction::Deadline { .. } => Opcode::Deadline,
            Instruction::OnlyTakerBalanceGte { .. } => Opcode::OnlyTakerBalanceGte,
            Instruction::OnlyTakerSupplyShareGte { .. } => Opcode::OnlyTakerSupplyShareGte,
            Instruction::Salt(_) => Opcode::Salt,
            Instruction::StaticBalances(_) => Opcode::StaticBalances,
            Instruction::DynamicBalances(_) => Opcode::DynamicBalances,
            Instruction::ExternalBalances => Opcode::ExternalBalances,
            Instruction::XycSwap => Opcode::XycSwap,
            Instruction::ConcentrateGrowLiquidity(_) => Opcode::ConcentrateGrowLiquidity,
            Instruction::ConcentrateGrowPriceRange { .. } => Opcode::ConcentrateGrowPriceRange,
            Instruction::Decay { .. } => Opcode::Decay,
            Instruction::DutchAuctionBalanceIn(_) => Opcode::DutchAuctionBalanceIn,
            Instruction::DutchAuctionBalanceOut(_) => Opcode::DutchAuctionBalanceOut,
            Instruction::Twap(_) => Opcode::Twap,
            Instruction::FlatFeeIn { .. } => Opcode::FlatFeeIn,
            Instruction::FlatFeeOut { .. } => Opcode::FlatFeeOut,
            Instruction::ProgressiveFeeIn(_) => Opcode::ProgressiveFeeIn,
            Instruction::ProgressiveFeeOut(_) => Opcode::ProgressiveFeeOut,
            Instruction::ProtocolFeeIn { .. } => Opcode::ProtocolFeeIn,
            Instruction::ProtocolFeeOut { .. } => Opcode::ProtocolFeeOut,
            Instruction::MinRateAdjust(_) => Opcode::MinRateAdjust,
            Instruction::MinRateRequire(_) => Opcode::MinRateRequire,
            Instruction::BaseFeeAdjust(_) => Opcode::BaseFeeAdjust,
            Instruction::ValuationStatic { .. } => Opcode::ValuationStatic,
            Instruction::ValuationOracle { .. } => Opcode::ValuationOracle,
            Instruction::ValuationOracleFresh { .. } => Opcode::ValuationOracleFresh,
            Instruction::ValuationBounded { .. } => Opcode::ValuationBounded,
            Instruction::InvalidateBit { .. } => Opcode::InvalidateBit,
            Instruction::InvalidateAssetIn { .. } => Opcode::InvalidateAssetIn,
            Instruction::InvalidateAssetOut { .. } => Opcode::InvalidateAssetOut,
            Instruction::Extruction { .. } => Opcode::Extruction,
        }
    }

    /// Jump target and whether the jump is conditional
    pub fn jump_target(&self) -> Option<(u16, bool)> {
        match self {
            Instruction::Jump { target } => Some((*target, false)),
            Instruction::JumpIfAssetIn { target, .. } | Instruction::JumpIfAssetOut { target, .. } => {
                Some((*target, true))
            }
            _ => None,
        }
    }

    /// Decode and validate the arguments of the record at `offset`
    pub fn decode(opcode: Opcode, args: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let mut r = ArgReader::new(args, opcode, offset);
        let ins = match opcode {
            Opcode::Jump => Instruction::Jump { target: r.read_u16()? },
            Opcode::JumpIfAssetIn => Instruction::JumpIfAssetIn {
                asset: r.read_asset()?,
                target: r.read_u16()?,
            },
            Opcode::JumpIfAssetOut => Instruction::JumpIfAssetOut {
                asset: r.read_asset()?,
                target: r.read_u16()?,
            },
            Opcode::Deadline => Instruction::Deadline { deadline: r.read_u64()? },
            Opcode::OnlyTakerBalanceGte => Instruction::OnlyTakerBalanceGte {
                asset: r.read_asset()?,
                min: r.read_u64()?,
            },
            Opcode::OnlyTakerSupplyShareGte => {
                let asset = r.read_asset()?;
                let min_share = r.read_u64()?;
                if min_share > WAD {
                    return Err(r.invalid("share above 1"));
                }
                Instruction::OnlyTakerSupplyShareGte { asset, min_share }
            }
            Opcode::Salt => Instruction::Salt(r.read_rest()),
            Opcode::StaticBalances => Instruction::StaticBalances(r.read_entries()?),
            Opcode::DynamicBalances => Instruction::DynamicBalances(r.read_entries()?),
            Opcode::ExternalBalances => Instruction::ExternalBalances,
            Opcode::XycSwap => Instruction::XycSwap,
            Opcode::ConcentrateGrowLiquidity => Instruction::ConcentrateGrowLiquidity(r.read_entries()?),
            Opcode::ConcentrateGrowPriceRange => Instruction::ConcentrateGrowPriceRange {
                delta_lt: r.read_u64()?,
                delta_gt: r.read_u64()?,
            },
            Opcode::Decay => {
                let period = r.read_u32()?;
                if period == 0 {
                    return Err(r.invalid("period is zero"));
                }
                Instruction::Decay { period }
            }
            Opcode::DutchAuctionBalanceIn => Instruction::DutchAuctionBalanceIn(read_auction(&mut r)?),
            Opcode::DutchAuctionBalanceOut => Instruction::DutchAuctionBalanceOut(read_auction(&mut r)?),
            Opcode::Twap => Instruction::Twap(read_twap(&mut r)?),
            Opcode::FlatFeeIn => {
                let fee = r.read_u16()?;
                Instruction::FlatFeeIn { fee_bps: check_bps(&r, fee)? }
            }
            Opcode::FlatFeeOut => {
                let fee = r.read_u16()?;
                Instruction::FlatFeeOut { fee_bps: check_bps(&r, fee)? }
            }
            Opcode::ProgressiveFeeIn => Instruction::ProgressiveFeeIn(read_progressive(&mut r)?),
            Opcode::ProgressiveFeeOut => Instruction::ProgressiveFeeOut(read_progressive(&mut r)?),
            Opcode::ProtocolFeeIn => {
                let fee = r.read_u16()?;
                Instruction::ProtocolFeeIn {
                    fee_bps: check_bps(&r, fee)?,
                    recipient: r.read_address()?,
                }
            }
            Opcode::ProtocolFeeOut => {
                let fee = r.read_u16()?;
                Instruction::ProtocolFeeOut {
                    fee_bps: check_bps(&r, fee)?,
                    recipient: r.read_address()?,
                }
            }
            Opcode::MinRateAdjust => Instruction::MinRateAdjust(read_rate(&mut r)?),
            Opcode::MinRateRequire => Instruction::MinRateRequire(read_rate(&mut r)?),
            Opcode::BaseFeeAdjust => {
                let base_fee = r.read_u64()?;
                let gas_amount = r.read_u64()?;
                let gas_price = r.read_u64()?;
                let max = r.read_u16()?;
                Instruction::BaseFeeAdjust(GasAdjust {
                    base_fee,
                    gas_amount,
                    gas_price,
                    max_bps: check_bps(&r, max)?,
                })
            }
            Opcode::ValuationStatic => {
                let valuation = r.read_u64()?;
                if valuation == 0 || valuation >= WAD {
                    return Err(r.invalid("valuation outside (0, 1)"));
                }
                Instruction::ValuationStatic { valuation }
            }
            Opcode::ValuationOracle => Instruction::ValuationOracle {
                oracle: r.read_address()?,
            },
            Opcode::ValuationOracleFresh => Instruction::ValuationOracleFresh {
                oracle: r.read_address()?,
                max_age: r.read_u32()?,
            },
            Opcode::ValuationBounded => {
                let oracle = r.read_address()?;
                let max_age = r.read_u32()?;
                let delta = r.read_u16()?;
                Instruction::ValuationBounded {
                    oracle,
                    max_age,
                    max_delta_bps: check_bps(&r, delta)?,
                }
            }
            Opcode::InvalidateBit => Instruction::InvalidateBit { bit: r.read_u32()? },
            Opcode::InvalidateAssetIn => Instruction::InvalidateAssetIn { max: r.read_u64()? },
            Opcode::InvalidateAssetOut => Instruction::InvalidateAssetOut { max: r.read_u64()? },
            Opcode::Extruction => Instruction::Extruction {
                target: r.read_address()?,
                payload: r.read_rest(),
            },
        };
        r.finish()?;
        Ok(ins)
    }

    /// Encoded argument bytes (without the code and length header)
    pub fn encode_args(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Instruction::Jump { target } => write_u16(&mut out, *target),
            Instruction::JumpIfAssetIn { asset, target } | Instruction::JumpIfAssetOut { asset, target } => {
                out.extend_from_slice(asset.as_bytes());
                write_u16(&mut out, *target);
            }
            Instruction::Deadline { deadline } => write_u64(&mut out, *deadline),
            Instruction::OnlyTakerBalanceGte { asset, min: value }
            | Instruction::OnlyTakerSupplyShareGte {
                asset,
                min_share: value,
            } => {
                out.extend_from_slice(asset.as_bytes());
                write_u64(&mut out, *value);
            }
            Instruction::Salt(bytes) => out.extend_from_slice(bytes),
            Instruction::StaticBalances(entries)
            | Instruction::DynamicBalances(entries)
            | Instruction::ConcentrateGrowLiquidity(entries) => write_entries(&mut out, entries),
            Instruction::ExternalBalances | Instruction::XycSwap => {}
            Instruction::ConcentrateGrowPriceRange { delta_lt, delta_gt } => {
                write_u64(&mut out, *delta_lt);
                write_u64(&mut out, *delta_gt);
            }
            Instruction::Decay { period } => write_u32(&mut out, *period),
            Instruction::DutchAuctionBalanceIn(a) | Instruction::DutchAuctionBalanceOut(a) => {
                write_u64(&mut out, a.start);
                write_u32(&mut out, a.duration);
                write_u64(&mut out, a.decay);
            }
            Instruction::Twap(t) => {
                write_u64(&mut out, t.start);
                write_u32(&mut out, t.duration);
                write_u64(&mut out, t.balance_in);
                write_u64(&mut out, t.balance_out);
                write_u64(&mut out, t.decay);
                write_u32(&mut out, t.illiquidity_period);
                write_u64(&mut out, t.price_bump);
                write_u64(&mut out, t.min_trade_out);
            }
            Instruction::FlatFeeIn { fee_bps } | Instruction::FlatFeeOut { fee_bps } => {
                write_u16(&mut out, *fee_bps)
            }
            Instruction::ProgressiveFeeIn(p) | Instruction::ProgressiveFeeOut(p) => {
                write_u16(&mut out, p.base_bps);
                write_u16(&mut out, p.slope_bps);
                write_u16(&mut out, p.max_bps);
            }
            Instruction::ProtocolFeeIn { fee_bps, recipient }
            | Instruction::ProtocolFeeOut { fee_bps, recipient } => {
                write_u16(&mut out, *fee_bps);
                out.extend_from_slice(recipient.as_bytes());
            }
            Instruction::MinRateAdjust(b) | Instruction::MinRateRequire(b) => {
                write_u64(&mut out, b.rate_lt);
                write_u64(&mut out, b.rate_gt);
            }
            Instruction::BaseFeeAdjust(g) => {
                write_u64(&mut out, g.base_fee);
                write_u64(&mut out, g.gas_amount);
                write_u64(&mut out, g.gas_price);
                write_u16(&mut out, g.max_bps);
            }
            Instruction::ValuationStatic { valuation } => write_u64(&mut out, *valuation),
            Instruction::ValuationOracle { oracle } => out.extend_from_slice(oracle.as_bytes()),
            Instruction::ValuationOracleFresh { oracle, max_age } => {
                out.extend_from_slice(oracle.as_bytes());
                write_u32(&mut out, *max_age);
            }
            Instruction::ValuationBounded {
                oracle,
                max_age,
                max_delta_bps,
            } => {
                out.extend_from_slice(oracle.as_bytes());
                write_u32(&mut out, *max_age);
                write_u16(&mut out, *max_delta_bps);
            }
            Instruction::InvalidateBit { bit } => write_u32(&mut out, *bit),
            Instruction::InvalidateAssetIn { max } | Instruction::InvalidateAssetOut { max } => {
                write_u64(&mut out, *max)
            }
            Instruction::Extruction { target, payload } => {
                out.extend_from_slice(target.as_bytes());
                out.extend_from_slice(payload);
            }
        }
        out
    }
}

fn fmt_entries(f: &mut fmt::Formatter<'_>, entries: &[(AssetId, u64)]) -> fmt::Result {
    for (asset, value) in entries {
        write!(f, " {}={}", asset, value)?;
    }
    Ok(())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode())?;
        match self {
            Instruction::Jump { target } => write!(f, " 0x{:04x}", target),
            Instruction::JumpIfAssetIn { asset, target } | Instruction::JumpIfAssetOut { asset, target } => {
                write!(f, " {} 0x{:04x}", asset, target)
            }
            Instruction::Deadline { deadline } => write!(f, " {}", deadline),
            Instruction::OnlyTakerBalanceGte { asset, min } => write!(f, " {} {}", asset, min),
            Instruction::OnlyTakerSupplyShareGte { asset, min_share } => write!(f, " {} {}", asset, min_share),
            Instruction::Salt(bytes) => write!(f, " {}", hex::encode(bytes)),
            Instruction::StaticBalances(entries)
            | Instruction::DynamicBalances(entries)
            | Instruction::ConcentrateGrowLiquidity(entries) => fmt_entries(f, entries),
            Instruction::ExternalBalances | Instruction::XycSwap => Ok(()),
            Instruction::ConcentrateGrowPriceRange { delta_lt, delta_gt } => {
                write!(f, " lt={} gt={}", delta_lt, delta_gt)
            }
            Instruction::Decay { period } => write!(f, " period={}", period),
            Instruction::DutchAuctionBalanceIn(a) | Instruction::DutchAuctionBalanceOut(a) => {
                write!(f, " start={} duration={} decay={}", a.start, a.duration, a.decay)
            }
            Instruction::Twap(t) => write!(
                f,
                " start={} duration={} in={} out={} decay={} illiquidity={} bump={} min_out={}",
                t.start,
                t.duration,
                t.balance_in,
                t.balance_out,
                t.decay,
                t.illiquidity_period,
                t.price_bump,
                t.min_trade_out
            ),
            Instruction::FlatFeeIn { fee_bps } | Instruction::FlatFeeOut { fee_bps } => {
                write!(f, " {}bps", fee_bps)
            }
            Instruction::ProgressiveFeeIn(p) | Instruction::ProgressiveFeeOut(p) => write!(
                f,
                " base={}bps slope={}bps max={}bps",
                p.base_bps, p.slope_bps, p.max_bps
            ),
            Instruction::ProtocolFeeIn { fee_bps, recipient }
            | Instruction::ProtocolFeeOut { fee_bps, recipient } => write!(f, " {}bps -> {}", fee_bps, recipient),
            Instruction::MinRateAdjust(b) | Instruction::MinRateRequire(b) => {
                write!(f, " {}:{}", b.rate_lt, b.rate_gt)
            }
            Instruction::BaseFeeAdjust(g) => write!(
                f,
                " base={} gas={} price={} max={}bps",
                g.base_fee, g.gas_amount, g.gas_price, g.max_bps
            ),
            Instruction::ValuationStatic { valuation } => write!(f, " {}", valuation),
            Instruction::ValuationOracle { oracle } => write!(f, " {}", oracle),
            Instruction::ValuationOracleFresh { oracle, max_age } => write!(f, " {} max_age={}", oracle, max_age),
            Instruction::ValuationBounded {
                oracle,
                max_age,
                max_delta_bps,
            } => write!(f, " {} max_age={} max_delta={}bps", oracle, max_age, max_delta_bps),
            Instruction::InvalidateBit { bit } => write!(f, " {}", bit),
            Instruction::InvalidateAssetIn { max } | Instruction::InvalidateAssetOut { max } => {
                write!(f, " max={}", max)
            }
            Instruction::Extruction { target, payload } => {
                write!(f, " {}", target)?;
                if !payload.is_empty() {
                    write!(f, " {}", hex::encode(payload))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> AssetId {
        name.parse().unwrap()
    }

    #[test]
    fn test_encode_decode_twap() {
        let ins = Instruction::Twap(TwapSchedule {
            start: 100,
            duration: 3_600,
            balance_in: 1_000,
            balance_out: 500,
            decay: WAD,
            illiquidity_period: 60,
            price_bump: WAD + WAD / 10,
            min_trade_out: 5,
        });
        let args = ins.encode_args();
        assert_eq!(args.len(), 8 + 4 + 8 + 8 + 8 + 4 + 8 + 8);
        assert_eq!(Instruction::decode(Opcode::Twap, &args, 0).unwrap(), ins);
    }

    #[test]
    fn test_fee_must_be_below_bps() {
        let ins = Instruction::FlatFeeIn { fee_bps: 10_000 };
        let err = Instruction::decode(Opcode::FlatFeeIn, &ins.encode_args(), 6).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidArgument { offset: 6, .. }));
    }

    #[test]
    fn test_valuation_range() {
        for v in [0, WAD] {
            let args = Instruction::ValuationStatic { valuation: v }.encode_args();
            assert!(Instruction::decode(Opcode::ValuationStatic, &args, 0).is_err());
        }
    }

    #[test]
    fn test_fixed_size_lengths_exact() {
        // One byte too many for a u64 argument
        let args = [0u8; 9];
        assert!(matches!(
            Instruction::decode(Opcode::Deadline, &args, 0),
            Err(DecodeError::ArgumentLength { expected: 8, actual: 9, .. })
        ));
        // No arguments allowed
        assert!(Instruction::decode(Opcode::XycSwap, &[1], 0).is_err());
    }

    #[test]
    fn test_display() {
        let ins = Instruction::StaticBalances(vec![(asset("USDC"), 100), (asset("WETH"), 200)]);
        assert_eq!(ins.to_string(), "static_balances USDC=100 WETH=200");
        assert_eq!(Instruction::Jump { target: 16 }.to_string(), "jump 0x0010");
        assert_eq!(Instruction::FlatFeeIn { fee_bps: 30 }.to_string(), "flat_fee_in 30bps");
    }
}
