//! Reward command implementation

use anyhow::{Context, Result};
use kabao_core::{reward, Config, RawRule};

pub fn cmd_reward(config: &Config, rule: &str, card: Option<&str>) -> Result<()> {
    let raw: RawRule = serde_json::from_str(rule).context("Invalid rule JSON")?;
    let normalized = reward::normalize(&raw);

    println!();
    println!("🧮 Reward");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Normalized: {}", serde_json::to_string(&normalized)?);
    println!("   Label:      {}", normalized.label());
    println!(
        "   Rate:       {}",
        config.display.format_rate(normalized.equivalent_rate())
    );

    if let Some(card) = card {
        match config.overrides.find(card) {
            Some(over) => {
                let adjusted = config.overrides.apply(card, normalized);
                println!();
                println!("   Override for '{}' ({})", card, over.pattern);
                println!("   Adjusted:   {}", adjusted.label());
                println!(
                    "   Rate:       {}",
                    config.display.format_rate(adjusted.equivalent_rate())
                );
            }
            None => println!("   No override matches '{}'", card),
        }
    }

    Ok(())
}
