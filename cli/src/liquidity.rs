//! Concentrated liquidity helpers

use anyhow::{Context, Result};
use colored::Colorize;
use swap_math::{price_range_deltas, WAD};

/// Parse a decimal price ("1.5", "2000") into WAD fixed point
pub fn parse_wad(text: &str) -> Result<u128> {
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    if frac.len() > 18 {
        anyhow::bail!("Price {} has more than 18 decimals", text);
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().with_context(|| format!("Invalid price: {}", text))?
    };
    let frac_value: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<18}", frac);
        padded.parse().with_context(|| format!("Invalid price: {}", text))?
    };
    whole
        .checked_mul(WAD as u128)
        .and_then(|w| w.checked_add(frac_value))
        .with_context(|| format!("Price out of range: {}", text))
}

pub fn show_price_range(balance_a: u64, balance_b: u64, price: &str, price_min: &str, price_max: &str) -> Result<()> {
    let (delta_a, delta_b) = price_range_deltas(
        balance_a,
        balance_b,
        parse_wad(price)?,
        parse_wad(price_min)?,
        parse_wad(price_max)?,
    )
    .map_err(|e| anyhow::anyhow!("Cannot concentrate into [{}, {}] at {}: {}", price_min, price_max, price, e))?;

    println!("{}", "=== Price Range ===".bright_green().bold());
    println!("{} {} .. {} (price {})", "Range:".bright_cyan(), price_min, price_max, price);
    println!("{} {}", "delta_lt:".bright_cyan(), delta_a);
    println!("{} {}", "delta_gt:".bright_cyan(), delta_b);
    println!(
        "\n{}",
        format!(
            "[[step]]\nop = \"concentrate_grow_price_range\"\ndelta_lt = {}\ndelta_gt = {}",
            delta_a, delta_b
        )
        .dimmed()
    );
    Ok(())
}
