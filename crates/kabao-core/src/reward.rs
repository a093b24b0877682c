//! Reward normalization and equivalent-rate calculation
//!
//! Rules arrive in several shapes: canonical `reward` objects, legacy
//! `percentage` / `amountPerMile` scalars, or free text such as "18元/1哩".
//! [`normalize`] turns any of them into a [`RewardRecord`], and [`rate`]
//! maps a record onto one percentage scale so rewards of different shapes
//! can be ranked against each other.
//!
//! Neither function fails: unparsable input degrades to documented defaults
//! and an unusable reward rates as `0`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::models::{RawRule, RewardRecord};

/// "元/1哩", "元 / 1 哩", "元/哩" or "元1哩" somewhere in the text
static MILES_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"元\s*(?:/\s*)?(?:1\s*)?哩").expect("valid regex"));

/// First decimal number in the text
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)").expect("valid regex"));

/// Parse a loosely typed JSON value as a finite number
///
/// Numbers are taken as-is and strings are trimmed and parsed. Empty
/// strings, `null`, booleans, containers and non-finite results are absent.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Extract the spend amount from a "N元/1哩" style description
///
/// Returns `None` unless the text mentions 元 followed by 哩 and the first
/// number in it is positive.
pub fn parse_miles_spend_from_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || !MILES_MARKER.is_match(text) {
        return None;
    }
    let spend: f64 = FIRST_NUMBER.captures(text)?.get(1)?.as_str().parse().ok()?;
    (spend.is_finite() && spend > 0.0).then_some(spend)
}

/// Normalize a raw rule into a canonical reward record
///
/// Resolution order, first match wins:
/// 1. a `reward` object tagged `percentage`, `miles` or `ratio`
/// 2. a positive legacy `amountPerMile`, or a spend parsed from `valueText`
/// 3. a finite legacy `percentage`
/// 4. `Percentage { percentage: 0, multiplier: 1 }`
pub fn normalize(raw: &RawRule) -> RewardRecord {
    if let Some(record) = normalize_tagged(&raw.reward) {
        return record;
    }

    if let Some(spend) = legacy_spend(raw) {
        debug!("Migrated legacy spend-per-mile rule: {} per mile", spend);
        return RewardRecord::Miles { spend, miles: 1.0 };
    }

    if let Some(percentage) = parse_number(&raw.percentage) {
        debug!("Migrated legacy percentage rule: {}%", percentage);
        return RewardRecord::Percentage {
            percentage,
            multiplier: 1.0,
        };
    }

    RewardRecord::default()
}

/// Coerce a tagged reward object, filling variant defaults
///
/// The `type` tag is trimmed; `None` for a missing or unknown tag.
pub(crate) fn normalize_tagged(reward: &Value) -> Option<RewardRecord> {
    let field = |name: &str| reward.get(name).and_then(parse_number);

    let record = match reward.get("type")?.as_str()?.trim() {
        "percentage" => RewardRecord::Percentage {
            percentage: field("percentage").unwrap_or(0.0),
            multiplier: field("multiplier").unwrap_or(1.0),
        },
        "miles" => RewardRecord::Miles {
            spend: field("spend").unwrap_or(0.0),
            miles: field("miles").unwrap_or(1.0),
        },
        "ratio" => RewardRecord::Ratio {
            base_percentage: field("basePercentage").unwrap_or(0.0),
            numerator: field("numerator").unwrap_or(0.0),
            denominator: field("denominator").unwrap_or(0.0),
        },
        _ => return None,
    };
    Some(record)
}

fn legacy_spend(raw: &RawRule) -> Option<f64> {
    parse_number(&raw.amount_per_mile)
        .filter(|spend| *spend > 0.0)
        .or_else(|| raw.value_text.as_str().and_then(parse_miles_spend_from_text))
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Equivalent reward rate of a canonical record, as a percentage of spend
///
/// - Percentage: `percentage × multiplier`
/// - Miles: `miles / spend × 100`
/// - Ratio: `basePercentage × numerator / denominator`
///
/// Any non-positive field yields `0`; the result is never negative or
/// non-finite.
pub fn rate(record: &RewardRecord) -> f64 {
    let value = match *record {
        RewardRecord::Percentage {
            percentage,
            multiplier,
        } if positive(percentage) && positive(multiplier) => percentage * multiplier,
        RewardRecord::Miles { spend, miles } if positive(spend) && positive(miles) => {
            (miles / spend) * 100.0
        }
        RewardRecord::Ratio {
            base_percentage,
            numerator,
            denominator,
        } if positive(base_percentage) && positive(numerator) && positive(denominator) => {
            base_percentage * (numerator / denominator)
        }
        _ => 0.0,
    };

    if positive(value) {
        value
    } else {
        0.0
    }
}

/// Equivalent rate of an arbitrary JSON reward object, without normalizing
///
/// Unknown or missing `type` tags, non-objects and missing required fields
/// rate as `0`.
pub fn rate_value(reward: &Value) -> f64 {
    normalize_tagged(reward).map_or(0.0, |record| rate(&record))
}

/// Normalize a raw rule and compute its equivalent rate
pub fn equivalent_rate(raw: &RawRule) -> f64 {
    rate(&normalize(raw))
}

impl RewardRecord {
    /// See [`rate`]
    pub fn equivalent_rate(&self) -> f64 {
        rate(self)
    }

    /// Short display text, e.g. `3%`, `18元/1哩`, `3% × 1000/360`
    pub fn label(&self) -> String {
        match *self {
            Self::Percentage {
                percentage,
                multiplier,
            } => {
                if multiplier == 1.0 {
                    format!("{}%", percentage)
                } else {
                    format!("{}% × {}", percentage, multiplier)
                }
            }
            Self::Miles { spend, miles } => format!("{}元/{}哩", spend, miles),
            Self::Ratio {
                base_percentage,
                numerator,
                denominator,
            } => format!("{}% × {}/{}", base_percentage, numerator, denominator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx_eq(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {} to be near {}",
            actual,
            expected
        );
    }

    fn raw(value: Value) -> RawRule {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(&json!(3.5)), Some(3.5));
        assert_eq!(parse_number(&json!(" 18 ")), Some(18.0));
        assert_eq!(parse_number(&json!("-2")), Some(-2.0));
        assert_eq!(parse_number(&json!("")), None);
        assert_eq!(parse_number(&json!("abc")), None);
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!("inf")), None);
        assert_eq!(parse_number(&Value::Null), None);
        assert_eq!(parse_number(&json!(true)), None);
        assert_eq!(parse_number(&json!([1])), None);
    }

    #[test]
    fn test_parse_miles_spend_from_text() {
        assert_eq!(parse_miles_spend_from_text("18元/1哩"), Some(18.0));
        assert_eq!(parse_miles_spend_from_text("18元 / 1 哩"), Some(18.0));
        assert_eq!(parse_miles_spend_from_text("18元/哩"), Some(18.0));
        assert_eq!(parse_miles_spend_from_text("海外 22 元 / 哩"), Some(22.0));
        assert_eq!(parse_miles_spend_from_text("每10.5元1哩"), Some(10.5));
        assert_eq!(parse_miles_spend_from_text("3%"), None);
        assert_eq!(parse_miles_spend_from_text("元/哩"), None);
        assert_eq!(parse_miles_spend_from_text("0元/哩"), None);
        assert_eq!(parse_miles_spend_from_text("   "), None);
    }

    #[test]
    fn test_normalize_tagged_variants() {
        assert_eq!(
            normalize(&raw(json!({"reward": {"type": "percentage", "percentage": "3"}}))),
            RewardRecord::Percentage {
                percentage: 3.0,
                multiplier: 1.0
            }
        );
        assert_eq!(
            normalize(&raw(json!({"reward": {"type": " miles ", "spend": 18}}))),
            RewardRecord::Miles {
                spend: 18.0,
                miles: 1.0
            }
        );
        assert_eq!(
            normalize(&raw(json!({"reward": {"type": "ratio", "basePercentage": 3}}))),
            RewardRecord::Ratio {
                base_percentage: 3.0,
                numerator: 0.0,
                denominator: 0.0
            }
        );
        assert_eq!(
            normalize(&raw(json!({"reward": {"type": "miles", "spend": "x", "miles": "NaN"}}))),
            RewardRecord::Miles {
                spend: 0.0,
                miles: 1.0
            }
        );
    }

    #[test]
    fn test_normalize_tagged_reward_wins_over_legacy_fields() {
        let record = normalize(&raw(json!({
            "reward": {"type": "percentage", "percentage": 1, "multiplier": 2},
            "amountPerMile": 18,
            "percentage": 5
        })));
        assert_eq!(
            record,
            RewardRecord::Percentage {
                percentage: 1.0,
                multiplier: 2.0
            }
        );
    }

    #[test]
    fn test_normalize_legacy_fields() {
        assert_eq!(
            normalize(&raw(json!({"amountPerMile": "20"}))),
            RewardRecord::Miles {
                spend: 20.0,
                miles: 1.0
            }
        );
        // Non-positive amountPerMile falls through to valueText
        assert_eq!(
            normalize(&raw(json!({"amountPerMile": 0, "valueText": "18元/1哩", "percentage": 2}))),
            RewardRecord::Miles {
                spend: 18.0,
                miles: 1.0
            }
        );
        assert_eq!(
            normalize(&raw(json!({"valueText": "最高3%", "percentage": "3.8"}))),
            RewardRecord::Percentage {
                percentage: 3.8,
                multiplier: 1.0
            }
        );
        // Unknown reward tags are ignored in favour of legacy fields
        assert_eq!(
            normalize(&raw(json!({"reward": {"type": "points"}, "percentage": 1}))),
            RewardRecord::Percentage {
                percentage: 1.0,
                multiplier: 1.0
            }
        );
    }

    #[test]
    fn test_normalize_defaults() {
        assert_eq!(normalize(&RawRule::default()), RewardRecord::default());
        assert_eq!(
            normalize(&raw(json!({"percentage": "", "valueText": "看活動"}))),
            RewardRecord::default()
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            json!({"percentage": "2.5"}),
            json!({"valueText": "22元/哩"}),
            json!({"reward": {"type": "ratio", "basePercentage": "3", "numerator": 13, "denominator": 11}}),
            json!({"reward": {"type": "miles", "spend": -1}}),
            json!({}),
        ];
        for input in inputs {
            let once = normalize(&raw(input));
            let again = normalize(&RawRule {
                reward: once.to_value(),
                ..Default::default()
            });
            assert_eq!(once, again);
        }
    }

    #[test]
    fn test_rate_per_variant() {
        approx_eq(
            rate(&RewardRecord::Percentage {
                percentage: 3.0,
                multiplier: 2.0,
            }),
            6.0,
        );
        approx_eq(
            rate(&RewardRecord::Miles {
                spend: 18.0,
                miles: 1.0,
            }),
            5.555_555_555_6,
        );
        approx_eq(
            rate(&RewardRecord::Miles {
                spend: 22.0,
                miles: 1.0,
            }),
            4.545_454_545_5,
        );
        approx_eq(
            rate(&RewardRecord::Ratio {
                base_percentage: 3.0,
                numerator: 13.0,
                denominator: 11.0,
            }),
            3.545_454_545_5,
        );
        approx_eq(
            rate(&RewardRecord::Ratio {
                base_percentage: 3.0,
                numerator: 1000.0,
                denominator: 360.0,
            }),
            8.333_333_333_3,
        );
    }

    #[test]
    fn test_rate_guards_non_positive_fields() {
        assert_eq!(
            rate(&RewardRecord::Percentage {
                percentage: 0.0,
                multiplier: 2.0
            }),
            0.0
        );
        assert_eq!(
            rate(&RewardRecord::Percentage {
                percentage: 3.0,
                multiplier: 0.0
            }),
            0.0
        );
        assert_eq!(
            rate(&RewardRecord::Miles {
                spend: -1.0,
                miles: 1.0
            }),
            0.0
        );
        assert_eq!(
            rate(&RewardRecord::Ratio {
                base_percentage: 3.0,
                numerator: 2.0,
                denominator: 0.0
            }),
            0.0
        );
        assert_eq!(
            rate(&RewardRecord::Ratio {
                base_percentage: 3.0,
                numerator: f64::MAX,
                denominator: f64::MIN_POSITIVE
            }),
            0.0
        );
    }

    #[test]
    fn test_rate_value() {
        approx_eq(
            rate_value(&json!({"type": "percentage", "percentage": 3, "multiplier": 2})),
            6.0,
        );
        approx_eq(rate_value(&json!({"type": "miles", "spend": "18"})), 5.555_555_6);
        assert_eq!(
            rate_value(&json!({"type": "ratio", "basePercentage": 3, "numerator": 2, "denominator": 0})),
            0.0
        );
        assert_eq!(rate_value(&json!({"type": "miles", "spend": -1, "miles": 1})), 0.0);
        assert_eq!(rate_value(&json!({"type": "unknown", "foo": 1})), 0.0);
        assert_eq!(rate_value(&json!({"percentage": 3})), 0.0);
        assert_eq!(rate_value(&json!("percentage")), 0.0);
        assert_eq!(rate_value(&Value::Null), 0.0);
    }

    #[test]
    fn test_rate_value_trims_type_tag() {
        let reward = json!({"type": " miles ", "spend": 18});
        approx_eq(rate_value(&reward), 5.555_555_6);
        assert_eq!(
            rate_value(&reward),
            equivalent_rate(&raw(json!({ "reward": reward })))
        );
    }

    #[test]
    fn test_out_of_range_number_is_absent() {
        let huge: Value = serde_json::from_str("1e400").unwrap();
        assert_eq!(parse_number(&huge), None);

        let rule: RawRule = serde_json::from_str(r#"{"percentage": 1e400}"#).unwrap();
        assert_eq!(normalize(&rule), RewardRecord::default());

        let rule: RawRule =
            serde_json::from_str(r#"{"reward": {"type": "miles", "spend": 1e400}}"#).unwrap();
        assert_eq!(rate(&normalize(&rule)), 0.0);
    }

    #[test]
    fn test_equivalent_rate_from_legacy_text() {
        approx_eq(
            equivalent_rate(&raw(json!({"valueText": "18元/1哩"}))),
            5.555_555_6,
        );
        assert_eq!(equivalent_rate(&raw(json!({"percentage": -3}))), 0.0);
    }

    #[test]
    fn test_label() {
        assert_eq!(
            RewardRecord::Percentage {
                percentage: 3.8,
                multiplier: 1.0
            }
            .label(),
            "3.8%"
        );
        assert_eq!(
            RewardRecord::Percentage {
                percentage: 3.0,
                multiplier: 2.0
            }
            .label(),
            "3% × 2"
        );
        assert_eq!(
            RewardRecord::Miles {
                spend: 18.0,
                miles: 1.0
            }
            .label(),
            "18元/1哩"
        );
        assert_eq!(
            RewardRecord::Ratio {
                base_percentage: 3.0,
                numerator: 1000.0,
                denominator: 360.0
            }
            .label(),
            "3% × 1000/360"
        );
    }
}
