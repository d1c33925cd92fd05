//! swapvm - assemble, inspect and run swap VM programs
//!
//! Strategies are TOML files describing a program step by step. Quotes and
//! swaps run locally against a simulated environment from `swapvm.toml`;
//! per-order state (decay offsets, fills, invalidation bits) is kept in a
//! JSON file and only written when a swap succeeds.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod config;
mod liquidity;
mod program;
mod state;
mod strategy;
mod trading;

use config::{Config, DEFAULT_CONFIG_PATH};
use trading::TradeArgs;

#[derive(Parser)]
#[command(name = "swapvm")]
#[command(about = "Swap VM CLI - assemble and run swap pricing programs", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Verbose output (debug logging of every dispatched instruction)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Trade {
    /// Strategy file
    strategy: PathBuf,

    /// Asset the taker pays
    #[arg(long)]
    asset_in: String,

    /// Asset the taker receives
    #[arg(long)]
    asset_out: String,

    /// Input amount, or output amount with --exact-out
    #[arg(long)]
    amount: u64,

    /// Treat --amount as the exact output
    #[arg(long)]
    exact_out: bool,

    /// Taker address (name or base58)
    #[arg(long)]
    taker: Option<String>,
}

impl From<&Trade> for TradeArgs {
    fn from(trade: &Trade) -> Self {
        TradeArgs {
            asset_in: trade.asset_in.clone(),
            asset_out: trade.asset_out.clone(),
            amount: trade.amount,
            exact_out: trade.exact_out,
            taker: trade.taker.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a strategy and print its id and bytes
    Assemble {
        /// Strategy file
        strategy: PathBuf,
    },

    /// Print the disassembly of a strategy or of raw program bytes
    Disasm {
        /// Strategy file
        strategy: Option<PathBuf>,

        /// Program bytes as hex
        #[arg(long, conflicts_with = "strategy")]
        hex: Option<String>,

        /// Program id for --hex (default: blake3 of the bytes)
        #[arg(long, requires = "hex")]
        id: Option<String>,
    },

    /// Price a swap without touching the state file
    Quote(Trade),

    /// Execute a swap and persist per-order state on success
    Swap(Trade),

    /// Set an invalidation bit ahead of time (maker cancel)
    Invalidate {
        /// Strategy file
        strategy: PathBuf,

        /// Bit to set
        #[arg(long)]
        bit: u32,
    },

    /// Compute concentrate_grow_price_range deltas for a price band
    Concentrate {
        /// Balance of the lower-ordered asset
        #[arg(long)]
        balance_a: u64,

        /// Balance of the higher-ordered asset
        #[arg(long)]
        balance_b: u64,

        /// Current price (b per a, decimal)
        #[arg(long)]
        price: String,

        /// Lower band edge
        #[arg(long)]
        price_min: String,

        /// Upper band edge
        #[arg(long)]
        price_max: String,
    },

    /// Show persisted per-order state
    State {
        /// Only this program
        #[arg(long)]
        program: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = Config::load(&cli.config)?;

    if cli.verbose {
        println!("{} {}", "Config:".bright_cyan(), cli.config.display());
        println!("{} {}", "State:".bright_cyan(), config.state_path.display());
        println!("{} {}", "Instruction set:".bright_cyan(), config.instruction_set);
    }

    match cli.command {
        Commands::Assemble { strategy } => {
            program::assemble(&config, &strategy)?;
        }
        Commands::Disasm { strategy, hex, id } => {
            program::disassemble(&config, strategy.as_deref(), hex.as_deref(), id.as_deref())?;
        }
        Commands::Quote(trade) => {
            trading::quote(&config, &trade.strategy, &TradeArgs::from(&trade))?;
        }
        Commands::Swap(trade) => {
            trading::swap(&config, &trade.strategy, &TradeArgs::from(&trade))?;
        }
        Commands::Invalidate { strategy, bit } => {
            state::invalidate(&config, &strategy, bit)?;
        }
        Commands::Concentrate {
            balance_a,
            balance_b,
            price,
            price_min,
            price_max,
        } => {
            liquidity::show_price_range(balance_a, balance_b, &price, &price_min, &price_max)?;
        }
        Commands::State { program } => {
            state::show(&config, program.as_deref())?;
        }
    }

    Ok(())
}
