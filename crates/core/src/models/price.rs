use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AdvisorError;

/// A single price observation (date → adjusted close).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// An ordered per-ticker price history.
///
/// Invariant: dates are strictly increasing with no duplicates. The
/// constructor enforces this; raw provider output should go through
/// [`PriceSeries::new`] before any return math touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, AdvisorError> {
        let ticker = ticker.into().to_uppercase();
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AdvisorError::Validation(format!(
                    "Price series for {ticker} is not strictly increasing at {} → {}",
                    pair[0].date, pair[1].date
                )));
            }
        }
        Ok(Self { ticker, points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Daily simple returns derived from an aligned price series.
///
/// `returns[i]` is the return realized *on* `dates[i]`, i.e.
/// `close[i+1] / close[i] - 1` of the underlying prices. Invariant:
/// `returns.len() == dates.len() == len(prices) - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub ticker: String,
    pub dates: Vec<NaiveDate>,
    pub returns: Vec<f64>,
}

impl ReturnSeries {
    /// Derive returns from aligned (date, close) observations.
    /// Requires at least 2 prices; closes must already be validated positive.
    pub fn from_prices(
        ticker: impl Into<String>,
        prices: &[(NaiveDate, f64)],
    ) -> Result<Self, AdvisorError> {
        let ticker = ticker.into().to_uppercase();
        if prices.len() < 2 {
            return Err(AdvisorError::insufficient(
                ticker,
                format!("need at least 2 prices to compute returns, got {}", prices.len()),
            ));
        }
        let mut dates = Vec::with_capacity(prices.len() - 1);
        let mut returns = Vec::with_capacity(prices.len() - 1);
        for pair in prices.windows(2) {
            dates.push(pair[1].0);
            returns.push(pair[1].1 / pair[0].1 - 1.0);
        }
        Ok(Self {
            ticker,
            dates,
            returns,
        })
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Arithmetic mean of daily returns (0.0 for an empty series).
    pub fn mean(&self) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        self.returns.iter().sum::<f64>() / self.returns.len() as f64
    }

    /// Unbiased sample variance (n − 1 denominator; 0.0 when n < 2).
    pub fn sample_variance(&self) -> f64 {
        let n = self.returns.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean();
        self.returns
            .iter()
            .map(|r| (r - mean) * (r - mean))
            .sum::<f64>()
            / (n - 1) as f64
    }

    /// Sample standard deviation of daily returns.
    pub fn sample_stdev(&self) -> f64 {
        self.sample_variance().sqrt()
    }

    /// Cumulative compounded return over the whole series.
    pub fn total_return(&self) -> f64 {
        self.returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
    }
}

/// Unbiased sample covariance of two equal-length return slices.
/// Returns 0.0 when fewer than 2 observations.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let mean_a = a[..n].iter().sum::<f64>() / n as f64;
    let mean_b = b[..n].iter().sum::<f64>() / n as f64;
    a[..n]
        .iter()
        .zip(&b[..n])
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / (n - 1) as f64
}

/// Pearson correlation of two equal-length return slices.
/// Defined as 0.0 when either side has zero variance (never NaN).
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let cov = sample_covariance(a, b);
    let var_a = sample_covariance(a, a);
    let var_b = sample_covariance(b, b);
    if var_a <= 0.0 || var_b <= 0.0 {
        return 0.0;
    }
    let corr = cov / (var_a.sqrt() * var_b.sqrt());
    // Floating error can push |corr| a hair past 1.
    corr.clamp(-1.0, 1.0)
}
