//! Card-name rate overrides
//!
//! Some card products convert points or miles in ways the stored rule does
//! not describe (a percentage that is really paid out at 1000/360, a card
//! whose every rule earns one mile per 18 spent). Overrides capture those
//! mechanics as data: an ordered table of card-name patterns, each mapped to
//! an [`Adjustment`] that rewrites the canonical reward before it is rated.
//! The first matching pattern wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Card, RewardRecord, Rule};
use crate::reward;

/// How an override pattern is compared against a card name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Case-insensitive substring match (supports | for OR)
    #[default]
    Contains,
    /// Regular expression match
    Regex,
    /// Exact string match (case-insensitive)
    Exact,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Regex => "regex",
            Self::Exact => "exact",
        }
    }
}

impl std::str::FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contains" => Ok(Self::Contains),
            "regex" => Ok(Self::Regex),
            "exact" => Ok(Self::Exact),
            _ => Err(format!("Unknown match type: {}", s)),
        }
    }
}

/// Rewrite applied to a matching card's rewards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Adjustment {
    /// Percentage rewards become a ratio `rate × numerator / denominator`
    Scale { numerator: f64, denominator: f64 },
    /// Every reward becomes one mile per `spend`
    Miles { spend: f64 },
}

impl Adjustment {
    /// Apply to a canonical record, returning the adjusted record
    ///
    /// `Scale` only touches percentage rewards with a positive rate; other
    /// records pass through unchanged.
    pub fn apply(&self, record: RewardRecord) -> RewardRecord {
        match (*self, record) {
            (
                Self::Scale {
                    numerator,
                    denominator,
                },
                RewardRecord::Percentage { .. },
            ) => {
                let base = reward::rate(&record);
                if base > 0.0 {
                    RewardRecord::Ratio {
                        base_percentage: base,
                        numerator,
                        denominator,
                    }
                } else {
                    record
                }
            }
            (Self::Scale { .. }, _) => record,
            (Self::Miles { spend }, _) => RewardRecord::Miles { spend, miles: 1.0 },
        }
    }

    fn validate(&self) -> Result<()> {
        let fields = match *self {
            Self::Scale {
                numerator,
                denominator,
            } => vec![("numerator", numerator), ("denominator", denominator)],
            Self::Miles { spend } => vec![("spend", spend)],
        };
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!(
                    "override {} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One entry of the override table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateOverride {
    /// Pattern matched against the card name
    pub pattern: String,
    #[serde(default)]
    pub match_type: MatchType,
    pub adjustment: Adjustment,
}

#[derive(Debug, Clone)]
struct CompiledOverride {
    rule: RateOverride,
    regex: Option<Regex>,
}

impl CompiledOverride {
    fn matches(&self, card_name: &str) -> bool {
        let name_lower = card_name.to_lowercase();
        match self.rule.match_type {
            MatchType::Contains => self
                .rule
                .pattern
                .split('|')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .any(|p| name_lower.contains(&p.to_lowercase())),
            MatchType::Regex => self
                .regex
                .as_ref()
                .is_some_and(|re| re.is_match(card_name) || re.is_match(&name_lower)),
            MatchType::Exact => name_lower == self.rule.pattern.trim().to_lowercase(),
        }
    }
}

/// Ordered, pre-compiled override table
#[derive(Debug, Clone, Default)]
pub struct RateOverrides {
    entries: Vec<CompiledOverride>,
}

impl RateOverrides {
    /// Build a table, compiling regex patterns up front
    pub fn new(rules: Vec<RateOverride>) -> Result<Self> {
        let mut entries = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.pattern.trim().is_empty() {
                return Err(Error::Config("override pattern must not be empty".into()));
            }
            rule.adjustment.validate()?;
            let regex = match rule.match_type {
                MatchType::Regex => Some(Regex::new(&rule.pattern)?),
                _ => None,
            };
            entries.push(CompiledOverride { rule, regex });
        }
        Ok(Self { entries })
    }

    /// A table with no overrides
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Overrides in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &RateOverride> {
        self.entries.iter().map(|e| &e.rule)
    }

    /// First override whose pattern matches the card name
    pub fn find(&self, card_name: &str) -> Option<&RateOverride> {
        self.entries
            .iter()
            .find(|e| e.matches(card_name))
            .map(|e| &e.rule)
    }

    /// Reward record after applying the matching override, if any
    pub fn apply(&self, card_name: &str, record: RewardRecord) -> RewardRecord {
        match self.find(card_name) {
            Some(rule) => {
                let adjusted = rule.adjustment.apply(record);
                if adjusted != record {
                    debug!(
                        "Override '{}' adjusted {} reward for '{}'",
                        rule.pattern,
                        record.kind(),
                        card_name
                    );
                }
                adjusted
            }
            None => record,
        }
    }

    /// Effective reward of a rule on a card
    pub fn effective_reward(&self, card: &Card, rule: &Rule) -> RewardRecord {
        self.apply(&card.name, rule.reward)
    }

    /// Equivalent rate of a rule on a card, overrides applied
    pub fn rate_for(&self, card: &Card, rule: &Rule) -> f64 {
        reward::rate(&self.effective_reward(card, rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(pattern: &str, match_type: MatchType, numerator: f64, denominator: f64) -> RateOverride {
        RateOverride {
            pattern: pattern.to_string(),
            match_type,
            adjustment: Adjustment::Scale {
                numerator,
                denominator,
            },
        }
    }

    fn percentage(p: f64) -> RewardRecord {
        RewardRecord::Percentage {
            percentage: p,
            multiplier: 1.0,
        }
    }

    #[test]
    fn test_match_type_from_str() {
        assert_eq!("Regex".parse::<MatchType>().unwrap(), MatchType::Regex);
        assert_eq!(MatchType::Exact.as_str(), "exact");
        assert!("fuzzy".parse::<MatchType>().is_err());
    }

    #[test]
    fn test_contains_matching() {
        let table = RateOverrides::new(vec![scale("cube|gogo", MatchType::Contains, 2.0, 1.0)])
            .unwrap();

        assert!(table.find("國泰 CUBE卡").is_some());
        assert!(table.find("台新@GoGo卡").is_some());
        assert!(table.find("Live+ 卡").is_none());
    }

    #[test]
    fn test_regex_and_exact_matching() {
        let table = RateOverrides::new(vec![
            scale(r"^LIVE\+", MatchType::Regex, 2.0, 1.0),
            scale("旅人卡", MatchType::Exact, 1.0, 1.0),
        ])
        .unwrap();

        assert!(table.find("live+ 悠遊卡").is_none());
        assert!(table.find("LIVE+ 悠遊卡").is_some());
        assert!(table.find("旅人卡").is_some());
        assert!(table.find("旅人卡 Plus").is_none());
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let result = RateOverrides::new(vec![scale("(", MatchType::Regex, 1.0, 1.0)]);
        assert!(matches!(result, Err(Error::Regex(_))));
    }

    #[test]
    fn test_non_positive_adjustment_is_rejected() {
        let result = RateOverrides::new(vec![scale("CUBE", MatchType::Contains, 1000.0, 0.0)]);
        assert!(matches!(result, Err(Error::Config(_))));

        let result = RateOverrides::new(vec![scale("  ", MatchType::Contains, 1.0, 1.0)]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_first_match_wins() {
        let table = RateOverrides::new(vec![
            scale("CUBE", MatchType::Contains, 1000.0, 360.0),
            scale("CUBE", MatchType::Contains, 2.0, 1.0),
        ])
        .unwrap();

        let adjusted = table.apply("CUBE卡", percentage(3.0));
        assert!((reward::rate(&adjusted) - 8.333_333_3).abs() < 1e-6);
    }

    #[test]
    fn test_scale_only_touches_positive_percentages() {
        let adjustment = Adjustment::Scale {
            numerator: 13.0,
            denominator: 11.0,
        };

        assert_eq!(adjustment.apply(percentage(0.0)), percentage(0.0));
        let miles = RewardRecord::Miles {
            spend: 18.0,
            miles: 1.0,
        };
        assert_eq!(adjustment.apply(miles), miles);
        assert_eq!(
            adjustment.apply(RewardRecord::Percentage {
                percentage: 1.5,
                multiplier: 2.0
            }),
            RewardRecord::Ratio {
                base_percentage: 3.0,
                numerator: 13.0,
                denominator: 11.0
            }
        );
    }

    #[test]
    fn test_miles_adjustment_replaces_reward() {
        let adjustment = Adjustment::Miles { spend: 22.0 };
        assert_eq!(
            adjustment.apply(percentage(0.0)),
            RewardRecord::Miles {
                spend: 22.0,
                miles: 1.0
            }
        );
    }

    #[test]
    fn test_empty_table_passes_through() {
        let table = RateOverrides::empty();
        assert!(table.is_empty());
        assert_eq!(table.apply("CUBE卡", percentage(3.0)), percentage(3.0));
    }
}
