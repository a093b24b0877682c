//! Card management command implementations

use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use kabao_core::cards::{find_card, generate_id};
use kabao_core::{Card, CardColor, CardDraft, Config, RawRule};
use tracing::info;

use super::core::{load_cards, save_cards, SAMPLE_CARDS};
use super::truncate;

/// Parse `--rule` JSON arguments into raw rules
pub fn parse_rule_args(rules: &[String]) -> Result<Vec<RawRule>> {
    rules
        .iter()
        .map(|r| {
            serde_json::from_str::<RawRule>(r)
                .with_context(|| format!("Invalid rule JSON: {}", truncate(r, 60)))
        })
        .collect()
}

fn parse_color(color: Option<&str>) -> Result<Option<CardColor>> {
    color
        .map(|c| c.parse::<CardColor>().map_err(|e: String| anyhow!(e)))
        .transpose()
}

pub fn cmd_cards_list(book: &Path, config: &Config) -> Result<()> {
    let cards = load_cards(book)?;

    if cards.is_empty() {
        println!("No cards found. Add one with 'kabao cards add'.");
        return Ok(());
    }

    println!();
    println!("💳 Cards ({})", cards.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for card in &cards {
        println!();
        println!("   {} [{}]", card.display_name(), card.color);
        println!("   ID: {}", card.id);
        for rule in &card.rules {
            let reward = config.overrides.effective_reward(card, rule);
            println!(
                "     • {:12} {:>8}  {}",
                rule.category,
                config.display.format_rate(reward.equivalent_rate()),
                reward.label()
            );
            println!(
                "       {}",
                truncate(&rule.summary(config.display.summary_keywords), 60)
            );
        }
    }

    Ok(())
}

pub fn cmd_cards_add(
    book: &Path,
    bank: &str,
    name: &str,
    color: Option<&str>,
    rules: &[String],
) -> Result<()> {
    let draft = CardDraft {
        bank: bank.to_string(),
        name: name.to_string(),
        color: parse_color(color)?,
        rules: parse_rule_args(rules)?,
    };

    let seed = Utc::now().to_rfc3339();
    let payload = draft.validate(&seed)?;
    let id = generate_id(
        "card",
        &[seed.as_str(), payload.bank.as_str(), payload.name.as_str()],
    );
    let card = Card::new(id, payload);

    let mut cards = load_cards(book)?;
    cards.insert(0, card.clone());
    save_cards(book, &cards)?;

    info!("Added card {} ({})", card.display_name(), card.id);
    println!(
        "✅ Added {} with {} rule(s) (ID: {})",
        card.display_name(),
        card.rules.len(),
        card.id
    );
    Ok(())
}

pub fn cmd_cards_edit(
    book: &Path,
    id: &str,
    bank: Option<&str>,
    name: Option<&str>,
    color: Option<&str>,
    rules: &[String],
) -> Result<()> {
    let mut cards = load_cards(book)?;
    let existing = find_card(&cards, id)?;

    let rules = if rules.is_empty() {
        existing.rules.iter().map(RawRule::from).collect()
    } else {
        parse_rule_args(rules)?
    };
    let draft = CardDraft {
        bank: bank.unwrap_or(&existing.bank).to_string(),
        name: name.unwrap_or(&existing.name).to_string(),
        color: parse_color(color)?.or(Some(existing.color)),
        rules,
    };

    let payload = draft.validate(&Utc::now().to_rfc3339())?;
    let updated = existing.with_payload(payload);

    if let Some(slot) = cards.iter_mut().find(|c| c.id == id) {
        *slot = updated.clone();
    }
    save_cards(book, &cards)?;

    info!("Updated card {}", id);
    println!("✅ Updated {} (ID: {})", updated.display_name(), updated.id);
    Ok(())
}

pub fn cmd_cards_delete(book: &Path, id: &str) -> Result<()> {
    let mut cards = load_cards(book)?;
    let name = find_card(&cards, id)?.display_name();

    cards.retain(|c| c.id != id);
    save_cards(book, &cards)?;

    info!("Deleted card {}", id);
    println!("🗑️  Deleted {}", name);
    Ok(())
}

pub fn cmd_cards_reset(book: &Path, yes: bool) -> Result<()> {
    if !yes {
        print!("⚠️  This will replace every card with the bundled sample cards.\n\n");
        print!("Are you sure? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let cards = kabao_core::parse_card_book(SAMPLE_CARDS)?;
    save_cards(book, &cards)?;

    info!("Reset card book at {}", book.display());
    println!("✅ Restored {} sample cards", cards.len());
    Ok(())
}
