pub mod errors;
pub mod llm;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use errors::AdvisorError;
use llm::LlmClient;
use models::{
    decision::DecisionRecord,
    holding::Holding,
    metrics::PortfolioAnalysis,
    news::{NewsItem, NewsSignal},
    price::PricePoint,
    settings::AdvisorSettings,
};
use providers::traits::{NewsProvider, PriceHistoryProvider};
use services::{
    contribution_service::ContributionService, decision_service::DecisionService,
    news_service::NewsService, performance_service::PerformanceService,
    return_service::ReturnService, rule_service::RuleService,
};

/// Everything one run consumes, assembled up front so the run itself is a
/// pure function of this snapshot. Nothing in here is shared across runs.
#[derive(Debug, Clone)]
pub struct RunInputs {
    /// The as-of trading date the run analyzes
    pub as_of_date: NaiveDate,
    pub holdings: Vec<Holding>,

    /// Raw per-ticker price history, keyed by holding ticker
    pub price_history: HashMap<String, Vec<PricePoint>>,

    /// Market index the holdings are measured against (e.g., "NIFTY50")
    pub benchmark_ticker: String,
    pub benchmark_history: Vec<PricePoint>,

    /// Ticker-tagged news from the external aggregator
    pub news: Vec<NewsItem>,
}

impl RunInputs {
    /// Assemble a run's inputs from the price and news collaborators.
    ///
    /// The price window is padded with extra calendar days so that
    /// `lookback_days` *trading* days survive weekends and holidays; the
    /// normalizer trims back to the exact window.
    pub async fn collect(
        holdings: Vec<Holding>,
        benchmark_ticker: impl Into<String>,
        as_of_date: NaiveDate,
        settings: &AdvisorSettings,
        prices: &dyn PriceHistoryProvider,
        news: &dyn NewsProvider,
    ) -> Result<Self, AdvisorError> {
        let benchmark_ticker = benchmark_ticker.into().to_uppercase();
        let price_from = as_of_date - chrono::Duration::days(settings.lookback_days as i64 * 2);
        let news_from = as_of_date - chrono::Duration::days(i64::from(settings.news_lookback_days));

        let mut price_history = HashMap::with_capacity(holdings.len());
        for holding in &holdings {
            let history = prices
                .fetch_history(&holding.ticker, price_from, as_of_date)
                .await?;
            price_history.insert(holding.ticker.clone(), history);
        }
        let benchmark_history = prices
            .fetch_history(&benchmark_ticker, price_from, as_of_date)
            .await?;

        let tickers: Vec<String> = holdings.iter().map(|h| h.ticker.clone()).collect();
        let news_items = news.fetch_news(&tickers, news_from, as_of_date).await?;
        tracing::info!(
            provider = prices.name(),
            news_provider = news.name(),
            holdings = holdings.len(),
            news_items = news_items.len(),
            "collected run inputs"
        );

        Ok(Self {
            as_of_date,
            holdings,
            price_history,
            benchmark_ticker,
            benchmark_history,
            news: news_items,
        })
    }
}

/// Main entry point for the Portfolio Advisor core.
///
/// Holds the settings and the computation stages; every run is an isolated
/// left-to-right pass (returns → metrics → contributions → rules → news →
/// decision) with no state carried between invocations.
#[must_use]
pub struct PortfolioAdvisor {
    settings: AdvisorSettings,
    return_service: ReturnService,
    performance_service: PerformanceService,
    contribution_service: ContributionService,
    rule_service: RuleService,
    news_service: NewsService,
    decision_service: DecisionService,
}

impl PortfolioAdvisor {
    /// Advisor with default settings (252-day conventions, 25% concentration
    /// threshold, 60s model timeout).
    pub fn new() -> Self {
        Self::build(AdvisorSettings::default())
    }

    /// Advisor with caller-supplied settings; rejects invalid configurations.
    pub fn with_settings(settings: AdvisorSettings) -> Result<Self, AdvisorError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    #[must_use]
    pub fn settings(&self) -> &AdvisorSettings {
        &self.settings
    }

    /// The deterministic numeric pipeline: normalize returns, compute
    /// portfolio metrics, attribute risk per stock, and evaluate the
    /// optimization rules. No model involvement — fully testable offline.
    pub fn analyze(&self, inputs: &RunInputs) -> Result<PortfolioAnalysis, AdvisorError> {
        if inputs.holdings.is_empty() {
            return Err(AdvisorError::Validation(
                "Cannot analyze a portfolio with no holdings".into(),
            ));
        }
        let mut seen = HashSet::new();
        for holding in &inputs.holdings {
            holding.validate()?;
            if !seen.insert(holding.ticker.as_str()) {
                return Err(AdvisorError::Validation(format!(
                    "Duplicate holding for {}",
                    holding.ticker
                )));
            }
        }
        let benchmark_ticker = inputs.benchmark_ticker.to_uppercase();
        if seen.contains(benchmark_ticker.as_str()) {
            return Err(AdvisorError::Validation(format!(
                "Benchmark ticker {benchmark_ticker} collides with a holding"
            )));
        }

        // Benchmark joins the holdings for normalization so that every
        // series lands on the same trading-day calendar.
        let mut combined = HashMap::with_capacity(inputs.holdings.len() + 1);
        for holding in &inputs.holdings {
            let history = inputs.price_history.get(&holding.ticker).ok_or_else(|| {
                AdvisorError::insufficient(holding.ticker.clone(), "no price history supplied")
            })?;
            combined.insert(holding.ticker.clone(), history.clone());
        }
        combined.insert(benchmark_ticker.clone(), inputs.benchmark_history.clone());

        let normalized = self.return_service.normalize(
            &combined,
            self.settings.lookback_days,
            self.settings.max_missing_fraction,
        )?;

        let mut series = normalized.series;
        let benchmark = series.remove(&benchmark_ticker).ok_or_else(|| {
            AdvisorError::insufficient(benchmark_ticker.clone(), "benchmark series dropped out of normalization")
        })?;

        let weights = self
            .contribution_service
            .weights_from_holdings(&inputs.holdings, &normalized.last_close)?;

        let portfolio_returns = self.performance_service.aggregate(&series, &weights)?;
        let metrics = self.performance_service.compute(
            &portfolio_returns,
            self.settings.risk_free_rate,
            self.settings.trading_days_per_year,
        )?;

        let contributions = self
            .contribution_service
            .analyze(&series, &benchmark, &weights)?;
        let pairwise = self.contribution_service.pairwise_correlations(&series);
        let suggestions =
            self.rule_service
                .evaluate(&metrics, &contributions, &pairwise, &self.settings);

        tracing::info!(
            as_of = %inputs.as_of_date,
            sharpe = metrics.sharpe_ratio,
            suggestions = suggestions.len(),
            "portfolio analysis complete"
        );

        Ok(PortfolioAnalysis {
            metrics,
            contributions,
            suggestions,
        })
    }

    /// Fuse aggregator news into per-ticker signals (sentiment via the model
    /// client; dedup and ordering owned here).
    pub async fn fuse_news(
        &self,
        inputs: &RunInputs,
        llm: &dyn LlmClient,
    ) -> Result<Vec<NewsSignal>, AdvisorError> {
        self.news_service
            .fuse(&inputs.news, &inputs.holdings, llm)
            .await
    }

    /// One complete advisory run: analysis, news fusion, and model-backed
    /// decision synthesis. Produces a `DecisionRecord` even when the model
    /// is unavailable (metrics-only fallback, `incomplete = true`).
    pub async fn run(
        &self,
        inputs: &RunInputs,
        llm: &dyn LlmClient,
    ) -> Result<DecisionRecord, AdvisorError> {
        let analysis = self.analyze(inputs)?;
        let signals = self.fuse_news(inputs, llm).await?;
        self.decision_service
            .synthesize(
                llm,
                inputs.as_of_date,
                &analysis,
                &signals,
                Duration::from_secs(self.settings.model_timeout_secs),
            )
            .await
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(settings: AdvisorSettings) -> Self {
        Self {
            settings,
            return_service: ReturnService::new(),
            performance_service: PerformanceService::new(),
            contribution_service: ContributionService::new(),
            rule_service: RuleService::new(),
            news_service: NewsService::new(),
            decision_service: DecisionService::new(),
        }
    }
}

impl Default for PortfolioAdvisor {
    fn default() -> Self {
        Self::new()
    }
}
