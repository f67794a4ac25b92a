use serde::{Deserialize, Serialize};

use crate::errors::AdvisorError;

/// Tunable parameters for a run. Defaults mirror common Indian-equity
/// conventions; every threshold is overridable by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorSettings {
    /// Annual risk-free rate used in the Sharpe ratio (0.0 = simplified Sharpe)
    pub risk_free_rate: f64,

    /// Annualization base; 252 trading days by convention
    pub trading_days_per_year: u32,

    /// Maximum number of daily returns analyzed per run
    pub lookback_days: usize,

    /// A ticker missing more than this fraction of the shared calendar
    /// (after single-day forward fills) fails normalization
    pub max_missing_fraction: f64,

    /// CONCENTRATION fires when a single weight exceeds this
    pub concentration_threshold: f64,

    /// UNDERPERFORMANCE fires when a stock trails the portfolio by more than this
    pub underperformance_margin: f64,

    /// CORRELATION fires for holding pairs above this
    pub correlation_threshold: f64,

    /// REBALANCE considers the portfolio off target below this Sharpe
    pub sharpe_target: f64,

    /// Wall-clock budget for each language-model invocation
    pub model_timeout_secs: u64,

    /// How many calendar days of news to pull when collecting run inputs
    pub news_lookback_days: u32,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            trading_days_per_year: 252,
            lookback_days: 252,
            max_missing_fraction: 0.2,
            concentration_threshold: 0.25,
            underperformance_margin: 0.05,
            correlation_threshold: 0.85,
            sharpe_target: 0.5,
            model_timeout_secs: 60,
            news_lookback_days: 3,
        }
    }
}

impl AdvisorSettings {
    /// Reject configurations that would make the numeric stages meaningless.
    pub fn validate(&self) -> Result<(), AdvisorError> {
        if self.trading_days_per_year == 0 {
            return Err(AdvisorError::Validation(
                "trading_days_per_year must be positive".into(),
            ));
        }
        if self.lookback_days < 2 {
            return Err(AdvisorError::Validation(format!(
                "lookback_days must be at least 2, got {}",
                self.lookback_days
            )));
        }
        if !(0.0..1.0).contains(&self.max_missing_fraction) {
            return Err(AdvisorError::Validation(format!(
                "max_missing_fraction must be in [0, 1), got {}",
                self.max_missing_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.concentration_threshold) {
            return Err(AdvisorError::Validation(format!(
                "concentration_threshold must be in [0, 1], got {}",
                self.concentration_threshold
            )));
        }
        if self.underperformance_margin < 0.0 {
            return Err(AdvisorError::Validation(format!(
                "underperformance_margin must be non-negative, got {}",
                self.underperformance_margin
            )));
        }
        if !(-1.0..=1.0).contains(&self.correlation_threshold) {
            return Err(AdvisorError::Validation(format!(
                "correlation_threshold must be in [-1, 1], got {}",
                self.correlation_threshold
            )));
        }
        if self.model_timeout_secs == 0 {
            return Err(AdvisorError::Validation(
                "model_timeout_secs must be positive".into(),
            ));
        }
        if self.news_lookback_days == 0 {
            return Err(AdvisorError::Validation(
                "news_lookback_days must be positive".into(),
            ));
        }
        Ok(())
    }
}
