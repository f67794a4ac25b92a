use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::AdvisorError;
use crate::models::news::NewsItem;
use crate::models::price::PricePoint;

/// Trait abstraction for the historical price collaborator.
///
/// The core never fetches data itself; callers plug in whatever source they
/// have (market-data API, flat-file cache, test fixture). If a source stops
/// working, only its implementation changes — the analytics are untouched.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Ordered (date, close) observations for a ticker over a date range.
    /// May return an empty Vec for an unknown ticker; the normalizer turns
    /// that into `InsufficientData` for the affected holding.
    async fn fetch_history(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, AdvisorError>;
}

/// Trait abstraction for the ticker-tagged news collaborator.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Categorized news items for the given tickers over a date range.
    async fn fetch_news(
        &self,
        tickers: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsItem>, AdvisorError>;
}
