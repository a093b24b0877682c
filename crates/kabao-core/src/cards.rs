//! Card book normalization and validation
//!
//! Stored and imported card data is untrusted: ids may be missing, colors
//! may fall outside the palette, keywords may be arrays or strings and
//! rewards may still be in legacy form. [`normalize_cards`] accepts any JSON
//! value and always returns canonical cards. User-entered cards go through
//! [`CardDraft::validate`] instead, which rejects structurally incomplete
//! input.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::models::{Card, CardColor, CardDraft, CardPayload, RawRule, Rule};
use crate::reward;

/// Keyword separators: whitespace, `,`, `，`, `、`, `・`
static KEYWORD_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,，、・]+").expect("valid regex"));

/// Summary shown for rules without keywords
pub const DEFAULT_RULE_SUMMARY: &str = "依條件與商店類型適用";

/// Split a keyword string into trimmed, non-empty tokens
pub fn parse_keywords(raw: &str) -> Vec<String> {
    KEYWORD_SEPARATORS
        .split(raw)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Generate a stable id of the form `<prefix>_<12 hex chars>`
///
/// The digest covers every seed part, so the same data always yields the
/// same id.
pub fn generate_id(prefix: &str, seed: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in seed {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hex::encode(hasher.finalize());
    format!("{}_{}", prefix, &digest[..12])
}

/// Text form of a loosely typed value: strings as-is, numbers and booleans
/// formatted, anything else empty
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Keyword field as one string; arrays are joined with ", "
fn keywords_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => text(other),
    }
}

/// Canonical rule from a raw one; `seed` identifies it when an id is generated
pub fn normalize_rule(raw: &RawRule, seed: &[&str]) -> Rule {
    let category = text(&raw.category);
    let id = match text(&raw.id) {
        id if !id.is_empty() => id,
        _ => {
            let mut parts = seed.to_vec();
            parts.push(category.as_str());
            generate_id("rule", &parts)
        }
    };

    Rule {
        id,
        reward: reward::normalize(raw),
        keywords: keywords_text(&raw.keywords),
        note: text(&raw.note),
        category,
    }
}

/// Normalize stored or imported card data
///
/// A value that is not an array yields no cards. Entries that are not
/// objects become empty cards, matching how a partially corrupt book is
/// read back.
pub fn normalize_cards(value: &Value) -> Vec<Card> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .map(|(card_index, card)| {
            let field = |name: &str| card.get(name).map(text).unwrap_or_default();
            let bank = field("bank");
            let name = field("name");
            let card_pos = card_index.to_string();

            let id = match field("id") {
                id if !id.is_empty() => id,
                _ => generate_id("card", &[card_pos.as_str(), bank.as_str(), name.as_str()]),
            };

            let rules = card
                .get("rules")
                .and_then(Value::as_array)
                .map(|rules| {
                    rules
                        .iter()
                        .enumerate()
                        .map(|(rule_index, rule)| {
                            let raw: RawRule =
                                serde_json::from_value(rule.clone()).unwrap_or_default();
                            let rule_pos = rule_index.to_string();
                            normalize_rule(
                                &raw,
                                &[card_pos.as_str(), bank.as_str(), name.as_str(), rule_pos.as_str()],
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();

            Card {
                id,
                color: CardColor::from_lenient(&field("color")),
                bank,
                name,
                rules,
            }
        })
        .collect()
}

/// Whether a raw rule carries any user-entered content
fn is_blank_rule(raw: &RawRule) -> bool {
    text(&raw.category).is_empty()
        && keywords_text(&raw.keywords).is_empty()
        && reward::parse_number(&raw.percentage).is_none()
        && text(&raw.value_text).is_empty()
        && text(&raw.note).is_empty()
        && raw.reward.get("type").is_none()
        && reward::parse_number(&raw.amount_per_mile).is_none()
}

impl CardDraft {
    /// Validate user-entered card data
    ///
    /// Bank and card name are required. Entirely blank rules are dropped
    /// and at least one rule must remain. Rule ids are derived from `seed`
    /// (for example a creation timestamp) and the rule position.
    pub fn validate(&self, seed: &str) -> Result<CardPayload> {
        let bank = self.bank.trim();
        let name = self.name.trim();
        if bank.is_empty() || name.is_empty() {
            return Err(Error::Validation(
                "bank and card name are required".to_string(),
            ));
        }

        let rules: Vec<Rule> = self
            .rules
            .iter()
            .filter(|raw| !is_blank_rule(raw))
            .enumerate()
            .map(|(i, raw)| {
                let rule_pos = i.to_string();
                let rule = normalize_rule(raw, &[seed, bank, name, rule_pos.as_str()]);
                // Drafts always get fresh rule ids
                Rule {
                    id: generate_id(
                        "rule",
                        &[seed, bank, name, rule_pos.as_str(), rule.category.as_str()],
                    ),
                    ..rule
                }
            })
            .collect();

        if rules.is_empty() {
            return Err(Error::Validation(
                "at least one reward rule is required".to_string(),
            ));
        }

        Ok(CardPayload {
            bank: bank.to_string(),
            name: name.to_string(),
            color: self.color.unwrap_or_default(),
            rules,
        })
    }
}

impl Rule {
    /// Parsed keyword tokens
    pub fn keyword_list(&self) -> Vec<String> {
        parse_keywords(&self.keywords)
    }

    /// First `limit` keywords joined with `、`, or a generic description
    pub fn summary(&self, limit: usize) -> String {
        let keywords = self.keyword_list();
        if keywords.is_empty() {
            return DEFAULT_RULE_SUMMARY.to_string();
        }
        keywords
            .into_iter()
            .take(limit)
            .collect::<Vec<_>>()
            .join("、")
    }
}

/// Find a card by id
pub fn find_card<'a>(cards: &'a [Card], id: &str) -> Result<&'a Card> {
    cards
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| Error::NotFound(format!("card '{}'", id)))
}
