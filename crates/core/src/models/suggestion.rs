use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What an optimization rule is flagging.
///
/// The declared order is the tie-break order for suggestion sorting:
/// concentration findings outrank correlation findings of equal severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionCategory {
    /// A single position dominates portfolio value
    Concentration,
    /// A holding trails the portfolio by more than the configured margin
    Underperformance,
    /// Two or more holdings move together too closely to diversify
    Correlation,
    /// Portfolio-level risk/return is off target and other rules fired
    Rebalance,
}

impl std::fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionCategory::Concentration => write!(f, "Concentration"),
            SuggestionCategory::Underperformance => write!(f, "Underperformance"),
            SuggestionCategory::Correlation => write!(f, "Correlation"),
            SuggestionCategory::Rebalance => write!(f, "Rebalance"),
        }
    }
}

/// How urgent a suggestion is. Ordered `Low < Medium < High` so suggestions
/// can be sorted by severity directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

/// A structured finding from the optimization rule engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: SuggestionCategory,
    pub severity: Severity,

    /// Tickers the rule fired for. A `BTreeSet` keeps serialization and
    /// display order deterministic.
    pub affected_tickers: BTreeSet<String>,

    /// Human-readable explanation of why the rule fired
    pub rationale: String,
}

impl Suggestion {
    pub fn new(
        category: SuggestionCategory,
        severity: Severity,
        affected_tickers: impl IntoIterator<Item = String>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            affected_tickers: affected_tickers.into_iter().collect(),
            rationale: rationale.into(),
        }
    }

    /// One-line rendering used in model prompts and text summaries.
    pub fn to_line(&self) -> String {
        let tickers: Vec<&str> = self.affected_tickers.iter().map(String::as_str).collect();
        format!(
            "{} ({}): {} — {}",
            self.category,
            self.severity,
            if tickers.is_empty() {
                "portfolio".to_string()
            } else {
                tickers.join(", ")
            },
            self.rationale
        )
    }
}
