//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` / `resolve_book_path` - Shared setup used by every command
//! - `load_cards` / `save_cards` - Card book access with sample fallback
//! - `cmd_config` - Show the active configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kabao_core::{config, load_or_default, write_card_book, Adjustment, Card, Config};

/// Sample cards used when no card book exists yet
pub const SAMPLE_CARDS: &str = include_str!("../../../../data/sample-cards.json");

/// Load configuration from an explicit path, the data dir, or the embedded default
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load config")
}

/// Use the explicit book path, or the default one in the data dir
pub fn resolve_book_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => config::default_book_path().ok_or_else(|| {
            anyhow::anyhow!("Could not determine data directory; pass --book <FILE>")
        }),
    }
}

/// Load the card book, falling back to the sample cards
pub fn load_cards(book: &Path) -> Result<Vec<Card>> {
    load_or_default(book, SAMPLE_CARDS).context("Failed to load card book")
}

/// Persist the card book
pub fn save_cards(book: &Path, cards: &[Card]) -> Result<()> {
    write_card_book(book, cards)
        .with_context(|| format!("Failed to write card book: {}", book.display()))
}

pub fn cmd_config(config: &Config) -> Result<()> {
    println!();
    println!("⚙️  Configuration");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Source:          {}", config.source);
    println!("   Rate decimals:   {}", config.display.rate_decimals);
    println!("   Summary words:   {}", config.display.summary_keywords);
    match config.search.limit {
        Some(limit) => println!("   Search limit:    {}", limit),
        None => println!("   Search limit:    none"),
    }

    println!();
    if config.overrides.is_empty() {
        println!("🔧 No rate overrides configured.");
        return Ok(());
    }

    println!("🔧 Rate overrides ({})", config.overrides.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for rule in config.overrides.rules() {
        let adjustment = match rule.adjustment {
            Adjustment::Scale {
                numerator,
                denominator,
            } => format!("× {}/{}", numerator, denominator),
            Adjustment::Miles { spend } => format!("{}元/1哩", spend),
        };
        println!(
            "   {:8} {:24} → {}",
            rule.match_type.as_str(),
            rule.pattern,
            adjustment
        );
    }

    Ok(())
}
