//! Card book import/export
//!
//! The card book is one JSON document holding every card. Readers accept
//! both the versioned document written here and a bare array of cards, and
//! always normalize what they read.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cards::normalize_cards;
use crate::error::{Error, Result};
use crate::models::Card;

/// Current card book format version
pub const BOOK_VERSION: u32 = 1;

/// Persisted card book document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardBook {
    pub version: u32,
    pub exported_at: Option<DateTime<Utc>>,
    pub cards: Vec<Card>,
}

impl CardBook {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            version: BOOK_VERSION,
            exported_at: Some(Utc::now()),
            cards,
        }
    }
}

/// Parse card book JSON, normalizing every card
///
/// Accepts a bare array of cards or an object with a `cards` array.
pub fn parse_card_book(json: &str) -> Result<Vec<Card>> {
    let value: Value = serde_json::from_str(json)?;
    let cards = match &value {
        Value::Array(_) => &value,
        Value::Object(map) => match map.get("cards") {
            Some(cards) if cards.is_array() => cards,
            _ => {
                return Err(Error::InvalidData(
                    "card book object has no 'cards' array".to_string(),
                ))
            }
        },
        _ => {
            return Err(Error::InvalidData(
                "card book must be an array or an object".to_string(),
            ))
        }
    };
    Ok(normalize_cards(cards))
}

/// Read a card book file; `None` when the file does not exist
pub fn read_card_book(path: &Path) -> Result<Option<Vec<Card>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let cards = parse_card_book(&content)?;
    debug!("Loaded {} cards from {}", cards.len(), path.display());
    Ok(Some(cards))
}

/// Read a card book, falling back to the bundled default cards
///
/// A missing book, or one that cannot be read or parsed, yields the
/// defaults. The default data itself must parse.
pub fn load_or_default(path: &Path, default_json: &str) -> Result<Vec<Card>> {
    match read_card_book(path) {
        Ok(Some(cards)) => return Ok(cards),
        Ok(None) => debug!("No card book at {}, using defaults", path.display()),
        Err(e) => warn!(
            "Ignoring unreadable card book {}: {}",
            path.display(),
            e
        ),
    }
    parse_card_book(default_json)
}

/// Write a card book atomically (temp file in the same directory + rename)
pub fn write_card_book(path: &Path, cards: &[Card]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let book = CardBook::new(cards.to_vec());
    let json = serde_json::to_string_pretty(&book)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!("Wrote {} cards to {}", cards.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RewardRecord;

    const SAMPLE: &str = r#"[
        {"id": "c1", "bank": "玉山", "name": "Pi卡", "color": "紅色系",
         "rules": [{"id": "r1", "category": "超商", "percentage": 5, "keywords": "7-11"}]}
    ]"#;

    #[test]
    fn test_parse_bare_array_and_document() {
        let cards = parse_card_book(SAMPLE).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(
            cards[0].rules[0].reward,
            RewardRecord::Percentage {
                percentage: 5.0,
                multiplier: 1.0
            }
        );

        let doc = format!(r#"{{"version": 1, "cards": {}}}"#, SAMPLE);
        assert_eq!(parse_card_book(&doc).unwrap(), cards);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_card_book("{not json"), Err(Error::Json(_))));
        assert!(matches!(
            parse_card_book(r#"{"version": 1}"#),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(parse_card_book("42"), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_out_of_range_number_keeps_book() {
        let json = r#"[
            {"id": "c1", "bank": "玉山", "name": "Pi卡",
             "rules": [
                {"id": "r1", "category": "超商", "percentage": 1e400},
                {"id": "r2", "category": "網購", "percentage": 3}
             ]}
        ]"#;
        let cards = parse_card_book(json).unwrap();
        assert_eq!(cards[0].rules.len(), 2);
        assert_eq!(cards[0].rules[0].reward, RewardRecord::default());
        assert_eq!(
            cards[0].rules[1].reward,
            RewardRecord::Percentage {
                percentage: 3.0,
                multiplier: 1.0
            }
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");
        fs::write(&path, json).unwrap();
        let loaded = load_or_default(&path, "[]").unwrap();
        assert_eq!(loaded[0].id, "c1");
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cards.json");
        let cards = parse_card_book(SAMPLE).unwrap();

        write_card_book(&path, &cards).unwrap();
        let read = read_card_book(&path).unwrap().unwrap();
        assert_eq!(read, cards);

        let doc: CardBook =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.version, BOOK_VERSION);
        assert!(doc.exported_at.is_some());
    }

    #[test]
    fn test_read_missing_book() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_card_book(&dir.path().join("none.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");

        let cards = load_or_default(&path, SAMPLE).unwrap();
        assert_eq!(cards[0].id, "c1");

        fs::write(&path, "corrupt").unwrap();
        let cards = load_or_default(&path, SAMPLE).unwrap();
        assert_eq!(cards[0].id, "c1");

        fs::write(&path, "[]").unwrap();
        assert!(load_or_default(&path, SAMPLE).unwrap().is_empty());
    }
}
