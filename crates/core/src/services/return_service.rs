use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::errors::AdvisorError;
use crate::models::price::{PricePoint, PriceSeries, ReturnSeries};

/// The output of normalization: every ticker's return series on one shared
/// trading-day calendar, plus the final aligned close per ticker (the price
/// that value weights are computed from).
#[derive(Debug, Clone)]
pub struct NormalizedReturns {
    /// The shared calendar the returns are computed over (price dates)
    pub calendar: Vec<NaiveDate>,
    pub series: HashMap<String, ReturnSeries>,
    pub last_close: HashMap<String, f64>,
}

/// Converts raw per-ticker price histories into aligned daily return series.
///
/// Gap policy (applied in this order, consistently for every ticker):
/// 1. Non-finite closes count as missing observations.
/// 2. Any close ≤ 0 fails the run with `InvalidPrice`.
/// 3. The candidate calendar is the union of observed dates across all
///    tickers, truncated to the last `window + 1` entries.
/// 4. A missing calendar date is forward-filled only when the ticker has a
///    real observation on the immediately preceding calendar date, so exactly
///    single-day gaps are repaired.
/// 5. A ticker still missing more than `max_missing_fraction` of the calendar
///    fails with `InsufficientData`.
/// 6. The final calendar is the intersection of dates every ticker covers;
///    longer gaps simply drop their dates from it.
pub struct ReturnService;

impl ReturnService {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(
        &self,
        raw: &HashMap<String, Vec<PricePoint>>,
        window: usize,
        max_missing_fraction: f64,
    ) -> Result<NormalizedReturns, AdvisorError> {
        if raw.is_empty() {
            return Err(AdvisorError::insufficient_portfolio(
                "no price histories supplied",
            ));
        }

        // 1-2. Validate ordering through PriceSeries, then clean each
        // ticker's observations.
        let mut cleaned: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
        for (ticker, points) in raw {
            let series = PriceSeries::new(ticker.clone(), points.clone())?;
            let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for point in &series.points {
                if !point.close.is_finite() {
                    continue; // missing observation
                }
                if point.close <= 0.0 {
                    return Err(AdvisorError::InvalidPrice {
                        ticker: series.ticker.clone(),
                        date: point.date,
                        price: point.close,
                    });
                }
                by_date.insert(point.date, point.close);
            }
            if by_date.is_empty() {
                return Err(AdvisorError::insufficient(
                    series.ticker.clone(),
                    "no usable price observations",
                ));
            }
            cleaned.insert(series.ticker, by_date);
        }

        // 3. Candidate calendar: union of observed dates, last window+1 entries.
        let union: BTreeSet<NaiveDate> = cleaned
            .values()
            .flat_map(|m| m.keys().copied())
            .collect();
        let mut calendar: Vec<NaiveDate> = union.into_iter().collect();
        if calendar.len() > window + 1 {
            calendar = calendar.split_off(calendar.len() - (window + 1));
        }

        // 4-5. Forward-fill single-day gaps and gate on missing fraction.
        let mut filled: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
        for (ticker, observed) in &cleaned {
            let mut values: Vec<Option<f64>> = Vec::with_capacity(calendar.len());
            let mut missing = 0usize;
            for (i, date) in calendar.iter().enumerate() {
                let value = match observed.get(date) {
                    Some(close) => Some(*close),
                    None => {
                        let fill = i
                            .checked_sub(1)
                            .and_then(|prev| observed.get(&calendar[prev]))
                            .copied();
                        if fill.is_some() {
                            tracing::debug!(%ticker, %date, "forward-filled single-day gap");
                        } else {
                            missing += 1;
                        }
                        fill
                    }
                };
                values.push(value);
            }
            let missing_fraction = missing as f64 / calendar.len() as f64;
            if missing_fraction > max_missing_fraction {
                return Err(AdvisorError::insufficient(
                    ticker.clone(),
                    format!(
                        "missing {:.1}% of the {}-day window (limit {:.1}%)",
                        missing_fraction * 100.0,
                        calendar.len(),
                        max_missing_fraction * 100.0
                    ),
                ));
            }
            filled.insert(ticker.as_str(), values);
        }

        // 6. Final calendar: dates every ticker covers.
        let keep: Vec<usize> = (0..calendar.len())
            .filter(|&i| filled.values().all(|values| values[i].is_some()))
            .collect();
        if keep.len() < 2 {
            return Err(AdvisorError::insufficient_portfolio(format!(
                "only {} shared trading days across all tickers (need at least 2)",
                keep.len()
            )));
        }
        let final_calendar: Vec<NaiveDate> = keep.iter().map(|&i| calendar[i]).collect();

        let mut series = HashMap::new();
        let mut last_close = HashMap::new();
        for (ticker, values) in &filled {
            let aligned: Vec<(NaiveDate, f64)> = keep
                .iter()
                .filter_map(|&i| values[i].map(|close| (calendar[i], close)))
                .collect();
            let returns = ReturnSeries::from_prices(*ticker, &aligned)?;
            last_close.insert(returns.ticker.clone(), aligned[aligned.len() - 1].1);
            series.insert(returns.ticker.clone(), returns);
        }

        tracing::info!(
            tickers = series.len(),
            days = final_calendar.len(),
            "normalized price histories onto shared calendar"
        );

        Ok(NormalizedReturns {
            calendar: final_calendar,
            series,
            last_close,
        })
    }
}

impl Default for ReturnService {
    fn default() -> Self {
        Self::new()
    }
}
