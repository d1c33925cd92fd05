//! Per-order persistent state
//!
//! Everything is keyed by program identity, so a program cannot read or
//! write another program's entries. Commit-mode writes are collected in a
//! [`Journal`] and only reach the [`OrderStore`] once the whole invocation
//! succeeded.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, ProgramId};
use crate::query::Leg;

/// Time-decaying balance offset left behind by recent fills
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayOffset {
    pub amount: u64,
    pub updated_at: u64,
}

impl DecayOffset {
    /// Remaining offset: `amount · (period − elapsed) / period`, zero after a full period
    pub fn current(&self, now: u64, period: u32) -> u64 {
        let elapsed = now.saturating_sub(self.updated_at);
        let period = period as u64;
        if period == 0 || elapsed >= period {
            return 0;
        }
        ((self.amount as u128) * ((period - elapsed) as u128) / (period as u128)) as u64
    }
}

/// Progress of a TWAP sale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapState {
    /// Output sold so far
    pub sold: u64,
    pub last_fill_at: Option<u64>,
    /// The current price window was opened after an illiquid gap
    pub bumped: bool,
}

type LegKey = (ProgramId, AssetId, Leg);

/// TWAP progress is tracked per `Twap` record, addressed by its byte offset
type TwapKey = (ProgramId, usize);

/// Read access to per-order state
pub trait StateView {
    fn decay_offset(&self, program: &ProgramId, asset: &AssetId, leg: Leg) -> Option<DecayOffset>;

    /// Total amount filled so far on `leg`
    fn consumed(&self, program: &ProgramId, asset: &AssetId, leg: Leg) -> u64;

    fn is_bit_set(&self, program: &ProgramId, bit: u32) -> bool;

    fn dynamic_balance(&self, program: &ProgramId, asset: &AssetId) -> Option<u64>;

    /// Progress of the `Twap` record at byte `offset`
    fn twap(&self, program: &ProgramId, offset: usize) -> Option<TwapState>;
}

/// Pending writes of one Commit invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDelta {
    decay: BTreeMap<LegKey, DecayOffset>,
    consumed: BTreeMap<LegKey, u64>,
    bits: BTreeSet<(ProgramId, u32)>,
    balances: BTreeMap<(ProgramId, AssetId), u64>,
    twap: BTreeMap<TwapKey, TwapState>,
}

impl StateDelta {
    pub fn is_empty(&self) -> bool {
        self.decay.is_empty()
            && self.consumed.is_empty()
            && self.bits.is_empty()
            && self.balances.is_empty()
            && self.twap.is_empty()
    }

    /// Number of written entries
    pub fn len(&self) -> usize {
        self.decay.len() + self.consumed.len() + self.bits.len() + self.balances.len() + self.twap.len()
    }
}

/// Write overlay on top of a read-only view
pub struct Journal<'a> {
    base: &'a dyn StateView,
    delta: StateDelta,
}

impl<'a> Journal<'a> {
    pub fn new(base: &'a dyn StateView) -> Self {
        Self {
            base,
            delta: StateDelta::default(),
        }
    }

    pub fn set_decay_offset(&mut self, program: ProgramId, asset: AssetId, leg: Leg, offset: DecayOffset) {
        self.delta.decay.insert((program, asset, leg), offset);
    }

    pub fn set_consumed(&mut self, program: ProgramId, asset: AssetId, leg: Leg, total: u64) {
        self.delta.consumed.insert((program, asset, leg), total);
    }

    pub fn set_bit(&mut self, program: ProgramId, bit: u32) {
        self.delta.bits.insert((program, bit));
    }

    pub fn set_dynamic_balance(&mut self, program: ProgramId, asset: AssetId, balance: u64) {
        self.delta.balances.insert((program, asset), balance);
    }

    pub fn set_twap(&mut self, program: ProgramId, offset: usize, state: TwapState) {
        self.delta.twap.insert((program, offset), state);
    }

    pub fn into_delta(self) -> StateDelta {
        self.delta
    }
}

impl StateView for Journal<'_> {
    fn decay_offset(&self, program: &ProgramId, asset: &AssetId, leg: Leg) -> Option<DecayOffset> {
        match self.delta.decay.get(&(*program, *asset, leg)) {
            Some(offset) => Some(*offset),
            None => self.base.decay_offset(program, asset, leg),
        }
    }

    fn consumed(&self, program: &ProgramId, asset: &AssetId, leg: Leg) -> u64 {
        match self.delta.consumed.get(&(*program, *asset, leg)) {
            Some(total) => *total,
            None => self.base.consumed(program, asset, leg),
        }
    }

    fn is_bit_set(&self, program: &ProgramId, bit: u32) -> bool {
        self.delta.bits.contains(&(*program, bit)) || self.base.is_bit_set(program, bit)
    }

    fn dynamic_balance(&self, program: &ProgramId, asset: &AssetId) -> Option<u64> {
        match self.delta.balances.get(&(*program, *asset)) {
            Some(balance) => Some(*balance),
            None => self.base.dynamic_balance(program, asset),
        }
    }

    fn twap(&self, program: &ProgramId, offset: usize) -> Option<TwapState> {
        match self.delta.twap.get(&(*program, offset)) {
            Some(state) => Some(*state),
            None => self.base.twap(program, offset),
        }
    }
}

/// Persistent per-order state, owned by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoreSnapshot", into = "StoreSnapshot")]
pub struct OrderStore {
    decay: BTreeMap<LegKey, DecayOffset>,
    consumed: BTreeMap<LegKey, u64>,
    bits: BTreeSet<(ProgramId, u32)>,
    balances: BTreeMap<(ProgramId, AssetId), u64>,
    twap: BTreeMap<TwapKey, TwapState>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.decay.is_empty()
            && self.consumed.is_empty()
            && self.bits.is_empty()
            && self.balances.is_empty()
            && self.twap.is_empty()
    }

    /// Maker-side invalidation ahead of any fill
    pub fn invalidate_bit(&mut self, program: ProgramId, bit: u32) -> bool {
        self.bits.insert((program, bit))
    }

    /// Merge a successful invocation's writes
    pub fn apply(&mut self, delta: StateDelta) {
        self.decay.extend(delta.decay);
        self.consumed.extend(delta.consumed);
        self.bits.extend(delta.bits);
        self.balances.extend(delta.balances);
        self.twap.extend(delta.twap);
    }

    /// Only the entries belonging to `program`
    pub fn for_program(&self, program: &ProgramId) -> OrderStore {
        OrderStore {
            decay: self
                .decay
                .iter()
                .filter(|((p, _, _), _)| p == program)
                .map(|(k, v)| (*k, *v))
                .collect(),
            consumed: self
                .consumed
                .iter()
                .filter(|((p, _, _), _)| p == program)
                .map(|(k, v)| (*k, *v))
                .collect(),
            bits: self.bits.iter().filter(|(p, _)| p == program).copied().collect(),
            balances: self
                .balances
                .iter()
                .filter(|((p, _), _)| p == program)
                .map(|(k, v)| (*k, *v))
                .collect(),
            twap: self
                .twap
                .iter()
                .filter(|((p, _), _)| p == program)
                .map(|(k, v)| (*k, *v))
                .collect(),
        }
    }
}

impl StateView for OrderStore {
    fn decay_offset(&self, program: &ProgramId, asset: &AssetId, leg: Leg) -> Option<DecayOffset> {
        self.decay.get(&(*program, *asset, leg)).copied()
    }

    fn consumed(&self, program: &ProgramId, asset: &AssetId, leg: Leg) -> u64 {
        self.consumed.get(&(*program, *asset, leg)).copied().unwrap_or(0)
    }

    fn is_bit_set(&self, program: &ProgramId, bit: u32) -> bool {
        self.bits.contains(&(*program, bit))
    }

    fn dynamic_balance(&self, program: &ProgramId, asset: &AssetId) -> Option<u64> {
        self.balances.get(&(*program, *asset)).copied()
    }

    fn twap(&self, program: &ProgramId, offset: usize) -> Option<TwapState> {
        self.twap.get(&(*program, offset)).copied()
    }
}

// JSON form: flat entry lists, since map keys must be strings

#[derive(Serialize, Deserialize)]
struct DecayEntry {
    program: ProgramId,
    asset: AssetId,
    leg: Leg,
    amount: u64,
    updated_at: u64,
}

#[derive(Serialize, Deserialize)]
struct ConsumedEntry {
    program: ProgramId,
    asset: AssetId,
    leg: Leg,
    total: u64,
}

#[derive(Serialize, Deserialize)]
struct BitEntry {
    program: ProgramId,
    bit: u32,
}

#[derive(Serialize, Deserialize)]
struct BalanceEntry {
    program: ProgramId,
    asset: AssetId,
    balance: u64,
}

#[derive(Serialize, Deserialize)]
struct TwapEntry {
    program: ProgramId,
    offset: usize,
    #[serde(flatten)]
    state: TwapState,
}

#[derive(Serialize, Deserialize, Default)]
struct StoreSnapshot {
    #[serde(default)]
    decay: Vec<DecayEntry>,
    #[serde(default)]
    consumed: Vec<ConsumedEntry>,
    #[serde(default)]
    invalidated: Vec<BitEntry>,
    #[serde(default)]
    balances: Vec<BalanceEntry>,
    #[serde(default)]
    twap: Vec<TwapEntry>,
}

impl From<StoreSnapshot> for OrderStore {
    fn from(s: StoreSnapshot) -> Self {
        OrderStore {
            decay: s
                .decay
                .into_iter()
                .map(|e| {
                    let offset = DecayOffset {
                        amount: e.amount,
                        updated_at: e.updated_at,
                    };
                    ((e.program, e.asset, e.leg), offset)
                })
                .collect(),
            consumed: s
                .consumed
                .into_iter()
                .map(|e| ((e.program, e.asset, e.leg), e.total))
                .collect(),
            bits: s.invalidated.into_iter().map(|e| (e.program, e.bit)).collect(),
            balances: s
                .balances
                .into_iter()
                .map(|e| ((e.program, e.asset), e.balance))
                .collect(),
            twap: s.twap.into_iter().map(|e| ((e.program, e.offset), e.state)).collect(),
        }
    }
}

impl From<OrderStore> for StoreSnapshot {
    fn from(store: OrderStore) -> Self {
        StoreSnapshot {
            decay: store
                .decay
                .into_iter()
                .map(|((program, asset, leg), o)| DecayEntry {
                    program,
                    asset,
                    leg,
                    amount: o.amount,
                    updated_at: o.updated_at,
                })
                .collect(),
            consumed: store
                .consumed
                .into_iter()
                .map(|((program, asset, leg), total)| ConsumedEntry {
                    program,
                    asset,
                    leg,
                    total,
                })
                .collect(),
            invalidated: store
                .bits
                .into_iter()
                .map(|(program, bit)| BitEntry { program, bit })
                .collect(),
            balances: store
                .balances
                .into_iter()
                .map(|((program, asset), balance)| BalanceEntry {
                    program,
                    asset,
                    balance,
                })
                .collect(),
            twap: store
                .twap
                .into_iter()
                .map(|((program, offset), state)| TwapEntry { program, offset, state })
                .collect(),
        }
    }
}
