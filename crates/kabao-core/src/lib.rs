//! Kabao Core Library
//!
//! Shared functionality for the Kabao card reward catalogue:
//! - Reward normalization from canonical, legacy and free-text rules
//! - Equivalent-rate calculation across percentage, miles and ratio rewards
//! - Card-name rate overrides supplied as configuration
//! - Card book normalization, validation and JSON import/export
//! - Keyword search ranked by equivalent rate

pub mod book;
pub mod cards;
pub mod config;
pub mod error;
pub mod models;
pub mod overrides;
pub mod reward;
pub mod search;

pub use book::{load_or_default, parse_card_book, read_card_book, write_card_book, CardBook};
pub use cards::{normalize_cards, parse_keywords};
pub use config::{Config, ConfigSource, DisplayConfig};
pub use error::{Error, Result};
pub use models::{Card, CardColor, CardDraft, CardPayload, RawRule, RewardRecord, Rule};
pub use overrides::{Adjustment, MatchType, RateOverride, RateOverrides};
pub use reward::{normalize, rate, rate_value};
pub use search::{search, search_with, SearchMatch, SearchOptions, SearchResults, SearchStatus};
