use serde::{Deserialize, Serialize};

use super::suggestion::Suggestion;

/// Portfolio-level risk/return statistics over the lookback window.
///
/// All fields are finite; `annualized_volatility >= 0`, `max_drawdown <= 0`,
/// and `sharpe_ratio` is exactly 0.0 when volatility is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Cumulative compounded return over the window
    pub total_return: f64,

    /// Window return scaled to a trading year: (1 + total)^(D/N) − 1
    pub annualized_return: f64,

    /// Sample stdev of daily returns × sqrt(trading days per year)
    pub annualized_volatility: f64,

    /// (annualized_return − risk_free_rate) / annualized_volatility
    pub sharpe_ratio: f64,

    /// Largest peak-to-trough decline of cumulative value (≤ 0)
    pub max_drawdown: f64,
}

/// Per-stock weight, performance, and risk attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockContribution {
    pub ticker: String,

    /// Share of portfolio value, in [0, 1]; weights sum to 1 across holdings
    pub weight: f64,

    /// Cumulative compounded return of this stock over the window
    #[serde(rename = "return")]
    pub stock_return: f64,

    /// Pearson correlation against the benchmark, in [-1, 1]
    pub correlation_to_market: f64,

    /// cov(stock, market) / var(market)
    pub beta: f64,

    /// weight_i × Σ_j weight_j × cov(i, j) — sums to portfolio variance
    pub contribution_to_variance: f64,
}

/// The full quantitative output of a run, before news fusion and the
/// language-model narrative. External report generators consume this shape
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub metrics: PerformanceMetrics,
    pub contributions: Vec<StockContribution>,
    pub suggestions: Vec<Suggestion>,
}
