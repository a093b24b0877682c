//! Kabao CLI - Credit card reward catalogue
//!
//! Usage:
//!   kabao search 超商          Rank every matching reward rule
//!   kabao cards                List cards and rules
//!   kabao cards add ...        Add a card
//!   kabao import cards.json    Import a card book

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let book = || commands::resolve_book_path(cli.book.as_deref());

    match cli.command {
        Commands::Search { query, limit, json } => {
            commands::cmd_search(&book()?, &config, &query, limit, json)
        }
        Commands::Cards { action } => {
            let book = book()?;
            match action {
                None | Some(CardsAction::List) => commands::cmd_cards_list(&book, &config),
                Some(CardsAction::Add {
                    bank,
                    name,
                    color,
                    rules,
                }) => commands::cmd_cards_add(&book, &bank, &name, color.as_deref(), &rules),
                Some(CardsAction::Edit {
                    id,
                    bank,
                    name,
                    color,
                    rules,
                }) => commands::cmd_cards_edit(
                    &book,
                    &id,
                    bank.as_deref(),
                    name.as_deref(),
                    color.as_deref(),
                    &rules,
                ),
                Some(CardsAction::Delete { id }) => commands::cmd_cards_delete(&book, &id),
                Some(CardsAction::Reset { yes }) => commands::cmd_cards_reset(&book, yes),
            }
        }
        Commands::Import { file } => commands::cmd_import(&book()?, &file),
        Commands::Export { file } => commands::cmd_export(&book()?, &file),
        Commands::Reward { rule, card } => commands::cmd_reward(&config, &rule, card.as_deref()),
        Commands::Config => commands::cmd_config(&config),
    }
}
