use std::collections::{BTreeMap, BTreeSet};

use crate::errors::AdvisorError;
use crate::llm::LlmClient;
use crate::models::holding::Holding;
use crate::models::news::{NewsItem, NewsSignal, Sentiment};

/// Matches aggregator news to holdings and compresses it into per-ticker
/// signals. Owns deduplication and recency ordering; sentiment is delegated
/// to the language-model client.
pub struct NewsService;

impl NewsService {
    pub fn new() -> Self {
        Self
    }

    /// Group, deduplicate, and order headlines per held ticker.
    ///
    /// - Items for tickers not in the holdings list (including general-market
    ///   items) are dropped.
    /// - Identical headlines collapse to their most recent occurrence.
    /// - Headlines are ordered most recent first; ties break on headline text
    ///   so repeated runs produce identical output.
    /// - Tickers with zero matching news get no entry at all.
    pub fn collate(&self, items: &[NewsItem], holdings: &[Holding]) -> Vec<(String, Vec<String>)> {
        let held: BTreeSet<&str> = holdings.iter().map(|h| h.ticker.as_str()).collect();

        let mut per_ticker: BTreeMap<&str, BTreeMap<&str, &NewsItem>> = BTreeMap::new();
        for item in items {
            if !held.contains(item.ticker.as_str()) {
                continue;
            }
            let newest = per_ticker
                .entry(item.ticker.as_str())
                .or_default()
                .entry(item.headline.as_str())
                .or_insert(item);
            if item.published_at > newest.published_at {
                *newest = item;
            }
        }

        per_ticker
            .into_iter()
            .map(|(ticker, by_headline)| {
                let mut deduped: Vec<&NewsItem> = by_headline.into_values().collect();
                deduped.sort_by(|a, b| {
                    b.published_at
                        .cmp(&a.published_at)
                        .then_with(|| a.headline.cmp(&b.headline))
                });
                (
                    ticker.to_string(),
                    deduped.into_iter().map(|i| i.headline.clone()).collect(),
                )
            })
            .collect()
    }

    /// Produce one `NewsSignal` per held ticker with news present.
    ///
    /// A failed sentiment call degrades that ticker to NEUTRAL rather than
    /// failing the whole run.
    pub async fn fuse(
        &self,
        items: &[NewsItem],
        holdings: &[Holding],
        llm: &dyn LlmClient,
    ) -> Result<Vec<NewsSignal>, AdvisorError> {
        let mut signals = Vec::new();
        for (ticker, headlines) in self.collate(items, holdings) {
            let sentiment = match llm.classify_sentiment(&ticker, &headlines).await {
                Ok(sentiment) => sentiment,
                Err(e) => {
                    tracing::warn!(%ticker, error = %e, "sentiment classification failed; defaulting to neutral");
                    Sentiment::Neutral
                }
            };
            signals.push(NewsSignal {
                ticker,
                sentiment,
                headline_refs: headlines,
            });
        }
        tracing::info!(signals = signals.len(), "fused news into per-ticker signals");
        Ok(signals)
    }
}

impl Default for NewsService {
    fn default() -> Self {
        Self::new()
    }
}
