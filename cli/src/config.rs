//! CLI configuration, the simulated environment and persisted order state

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use swap_vm::{Address, AssetId, FixedEnvironment, InstructionSet, OrderStore, VmConfig, DEFAULT_MAX_STEPS};

pub const DEFAULT_CONFIG_PATH: &str = "swapvm.toml";
pub const DEFAULT_STATE_PATH: &str = "swapvm-state.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub state_path: PathBuf,
    pub max_steps: u32,
    /// `v1` or `stateless`
    pub instruction_set: String,
    pub environment: EnvironmentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            max_steps: DEFAULT_MAX_STEPS,
            instruction_set: "v1".to_string(),
            environment: EnvironmentConfig::default(),
        }
    }
}

/// Block time as unix seconds or an RFC 3339 timestamp
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Unix(u64),
    Rfc3339(String),
}

impl Timestamp {
    pub fn unix(&self) -> Result<u64> {
        match self {
            Timestamp::Unix(secs) => Ok(*secs),
            Timestamp::Rfc3339(text) => {
                let parsed = chrono::DateTime::parse_from_rfc3339(text)
                    .with_context(|| format!("Invalid timestamp: {}", text))?;
                u64::try_from(parsed.timestamp())
                    .with_context(|| format!("Timestamp before 1970: {}", text))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// WAD-scaled valuation of the lower-ordered asset
    pub value: u64,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Defaults to the wall clock
    pub now: Option<Timestamp>,
    pub base_fee: u64,
    pub oracles: BTreeMap<Address, OracleConfig>,
    /// `balances.<asset>.<holder> = amount`
    pub balances: BTreeMap<AssetId, BTreeMap<Address, u64>>,
    pub supply: BTreeMap<AssetId, u64>,
    pub reserves: BTreeMap<AssetId, u64>,
}

impl EnvironmentConfig {
    pub fn build(&self) -> Result<FixedEnvironment> {
        let now = match &self.now {
            Some(ts) => ts.unix()?,
            None => u64::try_from(chrono::Utc::now().timestamp()).context("System clock before 1970")?,
        };
        let mut env = FixedEnvironment::at(now).with_base_fee(self.base_fee);
        for (oracle, reading) in &self.oracles {
            env = env.with_oracle(*oracle, reading.value, reading.updated_at.unix()?);
        }
        for (asset, holders) in &self.balances {
            for (holder, amount) in holders {
                env = env.with_balance(*asset, *holder, *amount);
            }
        }
        for (asset, supply) in &self.supply {
            env = env.with_supply(*asset, *supply);
        }
        for (asset, reserve) in &self.reserves {
            env = env.with_reserve(*asset, *reserve);
        }
        Ok(env)
    }
}

impl Config {
    /// Load `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn vm_config(&self) -> VmConfig {
        VmConfig {
            max_steps: self.max_steps,
        }
    }

    pub fn instruction_set(&self) -> Result<InstructionSet> {
        match self.instruction_set.as_str() {
            "v1" => Ok(InstructionSet::v1()),
            "stateless" => Ok(InstructionSet::stateless()),
            other => anyhow::bail!("Unknown instruction set: {}. Use v1 or stateless", other),
        }
    }

    pub fn load_state(&self) -> Result<OrderStore> {
        load_state(&self.state_path)
    }

    pub fn save_state(&self, store: &OrderStore) -> Result<()> {
        save_state(&self.state_path, store)
    }
}

/// Per-order state; a missing file is an empty store
pub fn load_state(path: &Path) -> Result<OrderStore> {
    if !path.exists() {
        return Ok(OrderStore::new());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Failed to parse state file: {}", path.display()))
}

pub fn save_state(path: &Path, store: &OrderStore) -> Result<()> {
    let data = serde_json::to_string_pretty(store)?;
    fs::write(path, data).with_context(|| format!("Failed to write state file: {}", path.display()))
}
