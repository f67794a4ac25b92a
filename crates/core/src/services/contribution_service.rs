use std::collections::HashMap;

use crate::errors::AdvisorError;
use crate::models::holding::Holding;
use crate::models::metrics::StockContribution;
use crate::models::price::{pearson_correlation, sample_covariance, ReturnSeries};

/// Tolerance for the weights-sum-to-one invariant.
const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Per-stock weight, market sensitivity, and variance attribution.
///
/// Pure computation over aligned return series; the benchmark series must
/// come out of the same normalization pass as the holdings'.
pub struct ContributionService;

impl ContributionService {
    pub fn new() -> Self {
        Self
    }

    /// Value weights from current holdings: quantity × final aligned close,
    /// divided by total portfolio value. Weights are held fixed over the
    /// lookback window.
    pub fn weights_from_holdings(
        &self,
        holdings: &[Holding],
        last_close: &HashMap<String, f64>,
    ) -> Result<HashMap<String, f64>, AdvisorError> {
        let mut values = HashMap::with_capacity(holdings.len());
        let mut total = 0.0;
        for holding in holdings {
            let close = last_close.get(&holding.ticker).copied().ok_or_else(|| {
                AdvisorError::insufficient(
                    holding.ticker.clone(),
                    "no aligned closing price for weight calculation",
                )
            })?;
            let value = holding.quantity * close;
            total += value;
            values.insert(holding.ticker.clone(), value);
        }
        if total <= 0.0 {
            return Err(AdvisorError::Validation(
                "Total portfolio value must be positive".into(),
            ));
        }
        Ok(values
            .into_iter()
            .map(|(ticker, value)| (ticker, value / total))
            .collect())
    }

    /// Enforce the weights-sum-to-one invariant (±1e-6).
    pub fn validate_weights(weights: &HashMap<String, f64>) -> Result<(), AdvisorError> {
        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(AdvisorError::WeightMismatch { sum });
        }
        Ok(())
    }

    /// Per-ticker contribution analysis against the market benchmark.
    ///
    /// - `correlation_to_market`: Pearson correlation vs the benchmark
    /// - `beta`: cov(stock, market) / var(market)
    /// - `contribution_to_variance`: w_i × Σ_j w_j × cov(i, j), the standard
    ///   decomposition — contributions sum to total portfolio variance
    ///
    /// Both correlation and beta are defined as 0.0 when a variance is zero,
    /// so no valid input ever yields NaN. Output is sorted by ticker.
    pub fn analyze(
        &self,
        series: &HashMap<String, ReturnSeries>,
        benchmark: &ReturnSeries,
        weights: &HashMap<String, f64>,
    ) -> Result<Vec<StockContribution>, AdvisorError> {
        Self::validate_weights(weights)?;

        let mut tickers: Vec<&String> = series.keys().collect();
        tickers.sort();

        for ticker in &tickers {
            if series[*ticker].len() != benchmark.len() {
                return Err(AdvisorError::Validation(format!(
                    "Return series for {ticker} is not aligned with the benchmark"
                )));
            }
        }

        let market_variance = benchmark.sample_variance();
        let mut contributions = Vec::with_capacity(tickers.len());
        for ticker in &tickers {
            let rs = &series[*ticker];
            let weight = weights.get(*ticker).copied().ok_or_else(|| {
                AdvisorError::Validation(format!("No portfolio weight for {ticker}"))
            })?;

            let covariance_with_market = sample_covariance(&rs.returns, &benchmark.returns);
            let beta = if market_variance > 0.0 {
                covariance_with_market / market_variance
            } else {
                0.0
            };

            let cross_term: f64 = tickers
                .iter()
                .map(|other| {
                    let w = weights.get(*other).copied().unwrap_or(0.0);
                    w * sample_covariance(&rs.returns, &series[*other].returns)
                })
                .sum();

            contributions.push(StockContribution {
                ticker: (*ticker).clone(),
                weight,
                stock_return: rs.total_return(),
                correlation_to_market: pearson_correlation(&rs.returns, &benchmark.returns),
                beta,
                contribution_to_variance: weight * cross_term,
            });
        }

        Ok(contributions)
    }

    /// Pairwise correlations between holdings, consumed by the CORRELATION
    /// rule. Pairs are emitted in sorted ticker order for determinism.
    pub fn pairwise_correlations(
        &self,
        series: &HashMap<String, ReturnSeries>,
    ) -> Vec<(String, String, f64)> {
        let mut tickers: Vec<&String> = series.keys().collect();
        tickers.sort();

        let mut pairs = Vec::new();
        for (i, a) in tickers.iter().enumerate() {
            for b in &tickers[i + 1..] {
                let corr = pearson_correlation(&series[*a].returns, &series[*b].returns);
                pairs.push(((*a).clone(), (*b).clone(), corr));
            }
        }
        pairs
    }
}

impl Default for ContributionService {
    fn default() -> Self {
        Self::new()
    }
}
