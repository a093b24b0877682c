//! Domain models for Kabao

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::reward;

/// Display color of a card, restricted to a fixed palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CardColor {
    #[default]
    #[serde(rename = "藍色系")]
    Blue,
    #[serde(rename = "綠色系")]
    Green,
    #[serde(rename = "紅色系")]
    Red,
    #[serde(rename = "紫色系")]
    Purple,
    #[serde(rename = "金黃色系")]
    Gold,
    #[serde(rename = "黑色系")]
    Black,
    #[serde(rename = "銀灰色系")]
    Silver,
}

impl CardColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "藍色系",
            Self::Green => "綠色系",
            Self::Red => "紅色系",
            Self::Purple => "紫色系",
            Self::Gold => "金黃色系",
            Self::Black => "黑色系",
            Self::Silver => "銀灰色系",
        }
    }

    /// All palette entries, in display order
    pub fn all() -> &'static [CardColor] {
        &[
            Self::Blue,
            Self::Green,
            Self::Red,
            Self::Purple,
            Self::Gold,
            Self::Black,
            Self::Silver,
        ]
    }

    /// Parse a stored color, falling back to the default palette entry
    pub fn from_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for CardColor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(color) = Self::all().iter().find(|c| c.as_str() == trimmed) {
            return Ok(*color);
        }
        match trimmed.to_lowercase().as_str() {
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            "red" => Ok(Self::Red),
            "purple" => Ok(Self::Purple),
            "gold" | "yellow" => Ok(Self::Gold),
            "black" => Ok(Self::Black),
            "silver" | "gray" | "grey" => Ok(Self::Silver),
            _ => Err(format!("Unknown card color: {}", s)),
        }
    }
}

impl std::fmt::Display for CardColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical reward description of a rule
///
/// Serialized with a lowercase `type` tag, matching the stored card schema:
/// `{"type":"miles","spend":18,"miles":1}`. Deserialization is lenient in
/// the same way as the normalizer's tagged-object step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RewardRecord {
    /// Plain cashback rate scaled by a multiplier (e.g. a promotional doubling)
    Percentage { percentage: f64, multiplier: f64 },
    /// Spend `spend` currency units to earn `miles` miles
    Miles { spend: f64, miles: f64 },
    /// Base rate corrected by a points-conversion factor
    Ratio {
        #[serde(rename = "basePercentage")]
        base_percentage: f64,
        numerator: f64,
        denominator: f64,
    },
}

impl RewardRecord {
    /// Tag used in the serialized form
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Percentage { .. } => "percentage",
            Self::Miles { .. } => "miles",
            Self::Ratio { .. } => "ratio",
        }
    }

    /// JSON object in the stored card schema
    pub fn to_value(&self) -> Value {
        match *self {
            Self::Percentage {
                percentage,
                multiplier,
            } => json!({ "type": "percentage", "percentage": percentage, "multiplier": multiplier }),
            Self::Miles { spend, miles } => {
                json!({ "type": "miles", "spend": spend, "miles": miles })
            }
            Self::Ratio {
                base_percentage,
                numerator,
                denominator,
            } => json!({
                "type": "ratio",
                "basePercentage": base_percentage,
                "numerator": numerator,
                "denominator": denominator,
            }),
        }
    }
}

impl<'de> Deserialize<'de> for RewardRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        reward::normalize_tagged(&value)
            .ok_or_else(|| serde::de::Error::custom("reward needs a known `type` tag"))
    }
}

impl Default for RewardRecord {
    fn default() -> Self {
        Self::Percentage {
            percentage: 0.0,
            multiplier: 1.0,
        }
    }
}

/// A reward rule as stored on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    /// Reward category, e.g. "超商" or "海外"
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reward: RewardRecord,
    /// Channel keywords, separated by whitespace, commas or `、`
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub note: String,
}

/// A credit card and its reward rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub bank: String,
    pub name: String,
    #[serde(default)]
    pub color: CardColor,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A rule as it arrives from user input or imported data
///
/// Every field is an arbitrary JSON value so that legacy and partially
/// filled records deserialize without error; the normalizers decide what
/// each value means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRule {
    #[serde(skip_serializing_if = "Value::is_null")]
    pub id: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub category: Value,
    /// Canonical reward object, if already present
    #[serde(skip_serializing_if = "Value::is_null")]
    pub reward: Value,
    /// Legacy cashback percentage
    #[serde(skip_serializing_if = "Value::is_null")]
    pub percentage: Value,
    /// Legacy spend per mile
    #[serde(skip_serializing_if = "Value::is_null")]
    pub amount_per_mile: Value,
    /// Legacy free-text reward description, e.g. "18元/1哩"
    #[serde(skip_serializing_if = "Value::is_null")]
    pub value_text: Value,
    /// Keyword string or array of keyword strings
    #[serde(skip_serializing_if = "Value::is_null")]
    pub keywords: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub note: Value,
}

impl From<&Rule> for RawRule {
    fn from(rule: &Rule) -> Self {
        Self {
            id: Value::String(rule.id.clone()),
            category: Value::String(rule.category.clone()),
            reward: rule.reward.to_value(),
            keywords: Value::String(rule.keywords.clone()),
            note: Value::String(rule.note.clone()),
            ..Default::default()
        }
    }
}

/// User-entered card data, before validation
#[derive(Debug, Clone, Default)]
pub struct CardDraft {
    pub bank: String,
    pub name: String,
    pub color: Option<CardColor>,
    pub rules: Vec<RawRule>,
}

/// Validated card fields, ready to create or replace a card
#[derive(Debug, Clone, PartialEq)]
pub struct CardPayload {
    pub bank: String,
    pub name: String,
    pub color: CardColor,
    pub rules: Vec<Rule>,
}

impl Card {
    /// Create a card from validated fields
    pub fn new(id: impl Into<String>, payload: CardPayload) -> Self {
        Self {
            id: id.into(),
            bank: payload.bank,
            name: payload.name,
            color: payload.color,
            rules: payload.rules,
        }
    }

    /// A copy of this card with its fields replaced, keeping the id
    pub fn with_payload(&self, payload: CardPayload) -> Self {
        Self::new(self.id.clone(), payload)
    }

    /// "bank｜name" label used in listings and confirmations
    pub fn display_name(&self) -> String {
        format!("{}｜{}", self.bank, self.name)
    }
}
