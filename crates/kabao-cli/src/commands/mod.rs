//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config, book path, load/save) and `config`
//! - `search` - Ranked reward search
//! - `cards` - Card management (list, add, edit, delete, reset)
//! - `book` - Card book import/export
//! - `reward` - Normalize a single rule and show its rate

pub mod book;
pub mod cards;
pub mod core;
pub mod reward;
pub mod search;

// Re-export command functions for main.rs
pub use book::*;
pub use cards::*;
pub use core::*;
pub use reward::*;
pub use search::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
