//! Assemble and disassemble programs

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use swap_vm::{Program, ProgramId};

use crate::config::Config;
use crate::strategy::{content_id, Strategy};

pub fn assemble(config: &Config, strategy: &Path) -> Result<()> {
    let set = config.instruction_set()?;
    let program = Strategy::load(strategy)?.compile(&set)?;

    println!("{}", "=== Assemble ===".bright_green().bold());
    println!("{} {}", "Instruction set:".bright_cyan(), set.name());
    println!("{} {}", "Program:".bright_cyan(), program.id());
    println!("{} {} ({} bytes)", "Records:".bright_cyan(), program.len(), program.bytes().len());
    println!("{}", hex::encode(program.bytes()));
    Ok(())
}

/// Decode hex bytes; the id is pinned or derived from the bytes
pub fn decode_hex(config: &Config, text: &str, id: Option<&str>) -> Result<Program> {
    let bytes = hex::decode(text.trim().trim_start_matches("0x")).context("Invalid program hex")?;
    let id = match id {
        Some(id) => id.parse::<ProgramId>().with_context(|| format!("Invalid program id: {}", id))?,
        None => content_id(&bytes),
    };
    Ok(Program::decode(id, &bytes, &config.instruction_set()?)?)
}

pub fn disassemble(config: &Config, strategy: Option<&Path>, hex: Option<&str>, id: Option<&str>) -> Result<()> {
    let program = match (strategy, hex) {
        (Some(path), None) => Strategy::load(path)?.compile(&config.instruction_set()?)?,
        (None, Some(text)) => decode_hex(config, text, id)?,
        _ => anyhow::bail!("Pass either a strategy file or --hex"),
    };

    println!("{}", "=== Disassembly ===".bright_green().bold());
    println!("{} {}", "Program:".bright_cyan(), program.id());
    print!("{}", program.disassemble());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swap_vm::{InstructionSet, Opcode, ProgramBuilder};

    #[test]
    fn test_decode_hex() {
        let mut builder = ProgramBuilder::new(InstructionSet::v1());
        builder.salt(b"x").xyc_swap();
        let bytes = builder.encode().unwrap();
        let config = Config::default();

        let program = decode_hex(&config, &format!("0x{}", hex::encode(&bytes)), None).unwrap();
        assert_eq!(program.id(), content_id(&bytes));
        assert_eq!(program.records()[1].opcode(), Opcode::XycSwap);

        let pinned = decode_hex(&config, &hex::encode(&bytes), Some("mine")).unwrap();
        assert_eq!(pinned.id(), "mine".parse().unwrap());

        assert!(decode_hex(&config, "zz", None).is_err());
        assert!(decode_hex(&config, "ff00", None).is_err());
    }

    #[test]
    fn test_disassemble_requires_one_source() {
        let config = Config::default();
        assert!(disassemble(&config, None, None, None).is_err());
    }
}
