//! Search command implementation

use std::path::Path;

use anyhow::Result;
use kabao_core::search::highlight;
use kabao_core::{search_with, Config, SearchOptions, SearchStatus};

use super::core::load_cards;

pub fn cmd_search(
    book: &Path,
    config: &Config,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let cards = load_cards(book)?;
    let options = SearchOptions {
        limit: limit.or(config.search.limit),
    };
    let results = search_with(&cards, query, &config.overrides, options);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    match results.status {
        SearchStatus::EmptyQuery => {
            println!("Enter a category or keyword, e.g. 'kabao search 超商'.");
            return Ok(());
        }
        SearchStatus::NoMatches => {
            println!("No rewards found for '{}'.", query.trim());
            return Ok(());
        }
        SearchStatus::Matched => {}
    }

    println!();
    println!("🔍 Rewards for '{}' ({} found)", query.trim(), results.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for (i, m) in results.matches.iter().enumerate() {
        println!(
            "   {:>2}. {:>8}  {}  [{}]",
            i + 1,
            config.display.format_rate(m.equivalent_rate),
            m.card.display_name(),
            highlight(&m.rule.category, query, "[", "]"),
        );
        println!("       {}", m.effective_reward.label());
        if !m.keywords.is_empty() {
            let keywords: Vec<String> = m
                .keywords
                .iter()
                .map(|k| highlight(k, query, "[", "]"))
                .collect();
            println!("       🏷️  {}", keywords.join(", "));
        }
        if !m.rule.note.is_empty() {
            println!("       📝 {}", m.rule.note);
        }
    }

    Ok(())
}
