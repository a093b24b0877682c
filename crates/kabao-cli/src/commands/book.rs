//! Card book import and export command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kabao_core::{parse_card_book, write_card_book};

use super::core::{load_cards, save_cards};

/// Import a card book, replacing the current cards
///
/// The file is parsed and normalized before anything is written, so a bad
/// file leaves the current book untouched.
pub fn cmd_import(book: &Path, file: &Path) -> Result<()> {
    println!("📥 Importing cards from {}...", file.display());

    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to open file: {}", file.display()))?;
    let cards = parse_card_book(&content)
        .with_context(|| format!("Invalid card book: {}", file.display()))?;

    save_cards(book, &cards)?;

    let rules: usize = cards.iter().map(|c| c.rules.len()).sum();
    println!();
    println!("✅ Import complete!");
    println!("   Cards: {}", cards.len());
    println!("   Rules: {}", rules);
    Ok(())
}

/// Export the current card book
pub fn cmd_export(book: &Path, file: &Path) -> Result<()> {
    let cards = load_cards(book)?;
    write_card_book(file, &cards)
        .with_context(|| format!("Failed to write export: {}", file.display()))?;

    println!("📤 Exported {} cards to {}", cards.len(), file.display());
    Ok(())
}
