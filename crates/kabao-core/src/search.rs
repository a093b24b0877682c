//! Reward search and ranking
//!
//! A query matches a rule when, after trimming and lowercasing, it is a
//! substring of the rule's category or of any of its keywords. Matches are
//! ranked by equivalent rate, highest first. The sort is stable, so rules
//! with equal rates keep the order in which their cards and rules appear.

use std::ops::Range;

use regex::RegexBuilder;
use serde::Serialize;
use tracing::debug;

use crate::models::{Card, RewardRecord, Rule};
use crate::overrides::RateOverrides;

/// Outcome of a search, distinguishing the two empty cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// Query was empty after trimming; nothing was searched
    EmptyQuery,
    /// Query was searched but nothing matched
    NoMatches,
    /// At least one rule matched
    Matched,
}

/// A matching rule with its card and computed rate
#[derive(Debug, Clone, Serialize)]
pub struct SearchMatch<'a> {
    pub card: &'a Card,
    pub rule: &'a Rule,
    /// Parsed keyword tokens of the rule
    pub keywords: Vec<String>,
    /// Reward after card overrides were applied
    pub effective_reward: RewardRecord,
    pub equivalent_rate: f64,
}

/// Ranked search results
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<'a> {
    /// Normalized query
    pub query: String,
    pub status: SearchStatus,
    pub matches: Vec<SearchMatch<'a>>,
}

impl SearchResults<'_> {
    pub fn is_empty_query(&self) -> bool {
        self.status == SearchStatus::EmptyQuery
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Equivalent rates in ranked order
    pub fn rates(&self) -> Vec<f64> {
        self.matches.iter().map(|m| m.equivalent_rate).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Keep at most this many results after ranking; `0` keeps all
    pub limit: Option<usize>,
}

/// Trim and lowercase a query or field for matching
pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Keyword list of a rule when it matches the normalized query
fn match_rule(rule: &Rule, query: &str) -> Option<Vec<String>> {
    let keywords = rule.keyword_list();
    let hit_category = normalize_query(&rule.category).contains(query);
    let hit_keyword = keywords
        .iter()
        .any(|kw| normalize_query(kw).contains(query));
    (hit_category || hit_keyword).then_some(keywords)
}

/// Search all rules of all cards, ranked by equivalent rate
pub fn search<'a>(cards: &'a [Card], query: &str) -> SearchResults<'a> {
    search_with(cards, query, &RateOverrides::empty(), SearchOptions::default())
}

/// Search with card overrides and result options
pub fn search_with<'a>(
    cards: &'a [Card],
    query: &str,
    overrides: &RateOverrides,
    options: SearchOptions,
) -> SearchResults<'a> {
    let q = normalize_query(query);
    if q.is_empty() {
        return SearchResults {
            query: q,
            status: SearchStatus::EmptyQuery,
            matches: Vec::new(),
        };
    }

    let mut matches: Vec<SearchMatch<'a>> = cards
        .iter()
        .flat_map(|card| card.rules.iter().map(move |rule| (card, rule)))
        .filter_map(|(card, rule)| {
            let keywords = match_rule(rule, &q)?;
            let effective_reward = overrides.effective_reward(card, rule);
            Some(SearchMatch {
                card,
                rule,
                keywords,
                effective_reward,
                equivalent_rate: effective_reward.equivalent_rate(),
            })
        })
        .collect();

    // Vec::sort_by is stable: equal rates keep input order
    matches.sort_by(|a, b| b.equivalent_rate.total_cmp(&a.equivalent_rate));

    debug!("Search '{}' matched {} rules", q, matches.len());

    let status = if matches.is_empty() {
        SearchStatus::NoMatches
    } else {
        SearchStatus::Matched
    };

    if let Some(limit) = options.limit.filter(|&n| n > 0) {
        matches.truncate(limit);
    }

    SearchResults {
        query: q,
        status,
        matches,
    }
}

/// Byte ranges of case-insensitive occurrences of the trimmed query
pub fn highlight_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    let q = query.trim();
    if q.is_empty() {
        return Vec::new();
    }

    match RegexBuilder::new(&regex::escape(q))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.find_iter(text).map(|m| m.range()).collect(),
        Err(e) => {
            debug!("Cannot highlight '{}': {}", q, e);
            Vec::new()
        }
    }
}

/// Wrap every occurrence of the query in `open` / `close` markers
pub fn highlight(text: &str, query: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in highlight_ranges(text, query) {
        out.push_str(&text[last..range.start]);
        out.push_str(open);
        out.push_str(&text[range.clone()]);
        out.push_str(close);
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}
