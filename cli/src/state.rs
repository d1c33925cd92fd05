//! Persisted per-order state

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use swap_vm::ProgramId;

use crate::config::Config;
use crate::strategy::Strategy;

/// Maker cancels an order ahead of time by setting its bit
pub fn invalidate(config: &Config, strategy: &Path, bit: u32) -> Result<()> {
    let program = Strategy::load(strategy)?.compile(&config.instruction_set()?)?;
    let mut store = config.load_state()?;

    println!("{}", "=== Invalidate ===".bright_green().bold());
    println!("{} {}", "Program:".bright_cyan(), program.id());
    println!("{} {}", "Bit:".bright_cyan(), bit);
    if store.invalidate_bit(program.id(), bit) {
        config.save_state(&store)?;
        println!("{}", "Order invalidated".bright_green());
    } else {
        println!("{}", "Bit already set".yellow());
    }
    Ok(())
}

pub fn show(config: &Config, program: Option<&str>) -> Result<()> {
    let store = config.load_state()?;
    let store = match program {
        Some(id) => {
            let id: ProgramId = id.parse().with_context(|| format!("Invalid program id: {}", id))?;
            store.for_program(&id)
        }
        None => store,
    };

    println!("{}", "=== Order State ===".bright_green().bold());
    println!("{} {}", "File:".bright_cyan(), config.state_path.display());
    if store.is_empty() {
        println!("{}", "No state recorded".dimmed());
    } else {
        println!("{}", serde_json::to_string_pretty(&store)?);
    }
    Ok(())
}
