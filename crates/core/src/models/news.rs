use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Impact bucket assigned by the external news aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NewsCategory {
    HighImpact,
    MediumImpact,
    LowImpact,
    /// Market-wide news not attributable to a single ticker
    GeneralMarket,
}

/// A single ticker-tagged news item, as delivered by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Ticker the aggregator attributed this item to ("MARKET" for general news)
    pub ticker: String,
    pub headline: String,
    pub published_at: DateTime<Utc>,
    pub category: NewsCategory,
}

impl NewsItem {
    pub fn new(
        ticker: impl Into<String>,
        headline: impl Into<String>,
        published_at: DateTime<Utc>,
        category: NewsCategory,
    ) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            headline: headline.into(),
            published_at,
            category,
        }
    }
}

/// Overall tone of a ticker's recent coverage, classified by the model client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Compressed per-ticker news signal: deduplicated headlines, most recent
/// first, plus a sentiment tag. Tickers with no matching news get no signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSignal {
    pub ticker: String,
    pub sentiment: Sentiment,
    pub headline_refs: Vec<String>,
}
