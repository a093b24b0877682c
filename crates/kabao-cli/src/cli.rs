//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Kabao - Find the card that pays the most, wherever you spend
#[derive(Parser)]
#[command(name = "kabao")]
#[command(about = "Credit card reward catalogue and search", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Card book path (defaults to ~/.local/share/kabao/cards.json)
    #[arg(long, global = true)]
    pub book: Option<PathBuf>,

    /// Config file path (defaults to ~/.local/share/kabao/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search rewards by category or channel keyword
    Search {
        /// Category or keyword, e.g. "超商" or "7-11"
        query: String,

        /// Show at most this many results, 0 for all (overrides config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage cards (list, add, edit, delete, reset)
    Cards {
        #[command(subcommand)]
        action: Option<CardsAction>,
    },

    /// Import a card book JSON file, replacing the current cards
    Import {
        /// JSON file to import (array of cards or exported card book)
        file: PathBuf,
    },

    /// Export the card book to a JSON file
    Export {
        /// Output file
        file: PathBuf,
    },

    /// Normalize a raw rule and show its equivalent rate
    Reward {
        /// Rule JSON, e.g. '{"valueText":"18元/1哩"}'
        rule: String,

        /// Apply overrides for this card name
        #[arg(long)]
        card: Option<String>,
    },

    /// Show the active configuration and rate overrides
    Config,
}

#[derive(Subcommand)]
pub enum CardsAction {
    /// List all cards and their rules
    List,

    /// Add a card
    Add {
        /// Issuing bank
        #[arg(long)]
        bank: String,

        /// Card name
        #[arg(long)]
        name: String,

        /// Card color (藍色系, 綠色系, ... or blue, green, ...)
        #[arg(long)]
        color: Option<String>,

        /// Reward rule as JSON (repeatable), e.g.
        /// '{"category":"超商","percentage":3,"keywords":"7-11 全家"}'
        #[arg(long = "rule", required = true)]
        rules: Vec<String>,
    },

    /// Edit a card; rules are replaced when any --rule is given
    Edit {
        /// Card ID
        id: String,

        #[arg(long)]
        bank: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,

        /// Reward rule as JSON (repeatable)
        #[arg(long = "rule")]
        rules: Vec<String>,
    },

    /// Delete a card
    Delete {
        /// Card ID
        id: String,
    },

    /// Replace all cards with the bundled sample cards
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
