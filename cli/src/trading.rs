//! Quote and swap commands

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use swap_vm::{Address, AssetId, NoExternal, Query, SwapOutcome, SwapVm};

use crate::config::Config;
use crate::strategy::Strategy;

/// Taker side of a trade as given on the command line
pub struct TradeArgs {
    pub asset_in: String,
    pub asset_out: String,
    pub amount: u64,
    pub exact_out: bool,
    pub taker: Option<String>,
}

impl TradeArgs {
    pub fn query(&self) -> Result<Query> {
        let asset_in: AssetId = self
            .asset_in
            .parse()
            .with_context(|| format!("Invalid input asset: {}", self.asset_in))?;
        let asset_out: AssetId = self
            .asset_out
            .parse()
            .with_context(|| format!("Invalid output asset: {}", self.asset_out))?;
        let query = if self.exact_out {
            Query::exact_out(asset_in, asset_out, self.amount)
        } else {
            Query::exact_in(asset_in, asset_out, self.amount)
        };
        match &self.taker {
            Some(taker) => {
                let taker: Address = taker.parse().with_context(|| format!("Invalid taker: {}", taker))?;
                Ok(query.with_taker(taker))
            }
            None => Ok(query),
        }
    }
}

pub fn quote(config: &Config, strategy: &Path, trade: &TradeArgs) -> Result<()> {
    let program = Strategy::load(strategy)?.compile(&config.instruction_set()?)?;
    let env = config.environment.build()?;
    let store = config.load_state()?;
    let query = trade.query()?;

    println!("{}", "=== Quote ===".bright_green().bold());
    println!("{} {}", "Program:".bright_cyan(), program.id());
    let outcome = SwapVm::new(config.vm_config())
        .quote(&program, &query, &store, &env)
        .context("Quote failed")?;
    print_outcome(&query, &outcome);
    Ok(())
}

pub fn swap(config: &Config, strategy: &Path, trade: &TradeArgs) -> Result<()> {
    let program = Strategy::load(strategy)?.compile(&config.instruction_set()?)?;
    let env = config.environment.build()?;
    let mut store = config.load_state()?;
    let query = trade.query()?.committing();

    println!("{}", "=== Swap ===".bright_green().bold());
    println!("{} {}", "Program:".bright_cyan(), program.id());
    let outcome = SwapVm::new(config.vm_config())
        .swap(&program, &query, &mut store, &env, &mut NoExternal)
        .context("Swap failed, state unchanged")?;
    print_outcome(&query, &outcome);

    config.save_state(&store)?;
    println!("{} {}", "State saved:".bright_cyan(), config.state_path.display());
    Ok(())
}

fn print_outcome(query: &Query, outcome: &SwapOutcome) {
    println!("{} {} {}", "Pay:".bright_cyan(), outcome.amount_in, query.asset_in);
    println!("{} {} {}", "Receive:".bright_cyan(), outcome.amount_out, query.asset_out);
    println!(
        "{} {} / {}",
        "Balances:".bright_cyan(),
        outcome.registers.balance_in,
        outcome.registers.balance_out
    );
    println!("{} {}", "Steps:".bright_cyan(), outcome.steps);
    for fee in &outcome.protocol_fees {
        println!(
            "{} {} {} to {}",
            "Protocol fee:".bright_cyan(),
            fee.amount,
            fee.asset,
            fee.recipient
        );
    }
}
