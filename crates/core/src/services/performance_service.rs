use std::collections::HashMap;

use crate::errors::AdvisorError;
use crate::models::metrics::PerformanceMetrics;
use crate::models::price::ReturnSeries;

/// Portfolio-level performance statistics over the lookback window.
///
/// Pure computation — no I/O. Operates on return series that the
/// normalizer has already aligned onto one calendar.
pub struct PerformanceService;

impl PerformanceService {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate per-ticker returns into one portfolio return series,
    /// weighted by holding value. Weights are held fixed over the window.
    pub fn aggregate(
        &self,
        series: &HashMap<String, ReturnSeries>,
        weights: &HashMap<String, f64>,
    ) -> Result<ReturnSeries, AdvisorError> {
        let mut tickers: Vec<&String> = series.keys().collect();
        tickers.sort();
        let first = tickers
            .first()
            .and_then(|t| series.get(*t))
            .ok_or_else(|| AdvisorError::insufficient_portfolio("no return series to aggregate"))?;

        let mut combined = vec![0.0; first.len()];
        for ticker in &tickers {
            let rs = &series[*ticker];
            if rs.dates != first.dates {
                return Err(AdvisorError::Validation(format!(
                    "Return series for {ticker} is not aligned with the shared calendar"
                )));
            }
            let weight = weights.get(*ticker).copied().ok_or_else(|| {
                AdvisorError::Validation(format!("No portfolio weight for {ticker}"))
            })?;
            for (acc, r) in combined.iter_mut().zip(&rs.returns) {
                *acc += weight * r;
            }
        }

        Ok(ReturnSeries {
            ticker: "PORTFOLIO".to_string(),
            dates: first.dates.clone(),
            returns: combined,
        })
    }

    /// Compute the window's performance metrics from the aggregated series.
    ///
    /// Fails with `InsufficientData` when fewer than 2 returns are available.
    /// Sharpe is defined as exactly 0.0 on zero volatility, never NaN.
    pub fn compute(
        &self,
        portfolio: &ReturnSeries,
        risk_free_rate: f64,
        trading_days_per_year: u32,
    ) -> Result<PerformanceMetrics, AdvisorError> {
        let n = portfolio.len();
        if n < 2 {
            return Err(AdvisorError::insufficient_portfolio(format!(
                "need at least 2 daily returns to compute metrics, got {n}"
            )));
        }

        let days = f64::from(trading_days_per_year);
        let total_return = portfolio.total_return();
        let annualized_return = (1.0 + total_return).powf(days / n as f64) - 1.0;
        let annualized_volatility = portfolio.sample_stdev() * days.sqrt();

        let sharpe_ratio = if annualized_volatility > 0.0 {
            let sharpe = (annualized_return - risk_free_rate) / annualized_volatility;
            if sharpe.is_finite() {
                sharpe
            } else {
                0.0
            }
        } else {
            0.0
        };

        Ok(PerformanceMetrics {
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown: Self::max_drawdown(&portfolio.returns),
        })
    }

    /// Largest peak-to-trough decline of cumulative value: min over t of
    /// wealth[t] / running_max(wealth[0..=t]) − 1. Always ≤ 0; exactly 0
    /// only for a monotonically non-decreasing value series.
    fn max_drawdown(returns: &[f64]) -> f64 {
        let mut wealth = 1.0;
        let mut peak = 1.0;
        let mut worst = 0.0f64;
        for r in returns {
            wealth *= 1.0 + r;
            if wealth > peak {
                peak = wealth;
            }
            worst = worst.min(wealth / peak - 1.0);
        }
        worst
    }
}

impl Default for PerformanceService {
    fn default() -> Self {
        Self::new()
    }
}
