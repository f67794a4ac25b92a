use std::collections::BTreeSet;

use crate::models::metrics::{PerformanceMetrics, StockContribution};
use crate::models::settings::AdvisorSettings;
use crate::models::suggestion::{Severity, Suggestion, SuggestionCategory};

/// Deterministic, order-independent rule evaluation over the quantitative
/// metrics. Rules are pure functions: same input, same ordered output.
pub struct RuleService;

impl RuleService {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate all rules and return suggestions sorted by severity
    /// descending, ties broken by category order, then by affected tickers.
    pub fn evaluate(
        &self,
        metrics: &PerformanceMetrics,
        contributions: &[StockContribution],
        pairwise_correlations: &[(String, String, f64)],
        settings: &AdvisorSettings,
    ) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        suggestions.extend(Self::concentration(contributions, settings));
        suggestions.extend(Self::underperformance(metrics, contributions, settings));
        suggestions.extend(Self::correlation(pairwise_correlations, settings));

        // REBALANCE fires only when the portfolio is off target AND some
        // other rule already found something actionable.
        if metrics.sharpe_ratio < settings.sharpe_target && !suggestions.is_empty() {
            let affected: BTreeSet<String> = suggestions
                .iter()
                .flat_map(|s| s.affected_tickers.iter().cloned())
                .collect();
            suggestions.push(Suggestion::new(
                SuggestionCategory::Rebalance,
                Severity::Medium,
                affected,
                format!(
                    "Sharpe ratio {:.2} is below the {:.2} target while other findings are open; \
                     a risk/return rebalance is warranted.",
                    metrics.sharpe_ratio, settings.sharpe_target
                ),
            ));
        }

        suggestions.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(a.category.cmp(&b.category))
                .then_with(|| a.affected_tickers.cmp(&b.affected_tickers))
        });
        suggestions
    }

    /// Any single weight above the threshold; severity scales with the excess.
    fn concentration(
        contributions: &[StockContribution],
        settings: &AdvisorSettings,
    ) -> Vec<Suggestion> {
        contributions
            .iter()
            .filter(|c| c.weight > settings.concentration_threshold)
            .map(|c| {
                let excess = c.weight - settings.concentration_threshold;
                let severity = if excess >= 0.15 {
                    Severity::High
                } else if excess >= 0.05 {
                    Severity::Medium
                } else {
                    Severity::Low
                };
                Suggestion::new(
                    SuggestionCategory::Concentration,
                    severity,
                    [c.ticker.clone()],
                    format!(
                        "{} makes up {:.1}% of portfolio value, exceeding the {:.0}% \
                         concentration threshold.",
                        c.ticker,
                        c.weight * 100.0,
                        settings.concentration_threshold * 100.0
                    ),
                )
            })
            .collect()
    }

    /// Any stock trailing the portfolio's window return by more than the margin.
    fn underperformance(
        metrics: &PerformanceMetrics,
        contributions: &[StockContribution],
        settings: &AdvisorSettings,
    ) -> Vec<Suggestion> {
        contributions
            .iter()
            .filter(|c| c.stock_return < metrics.total_return - settings.underperformance_margin)
            .map(|c| {
                let shortfall = metrics.total_return - c.stock_return;
                let severity = if shortfall > 2.0 * settings.underperformance_margin {
                    Severity::High
                } else {
                    Severity::Medium
                };
                Suggestion::new(
                    SuggestionCategory::Underperformance,
                    severity,
                    [c.ticker.clone()],
                    format!(
                        "{} returned {:.1}% over the window, trailing the portfolio's {:.1}% \
                         by {:.1} points.",
                        c.ticker,
                        c.stock_return * 100.0,
                        metrics.total_return * 100.0,
                        shortfall * 100.0
                    ),
                )
            })
            .collect()
    }

    /// Holding pairs that move together too closely collapse into a single
    /// diversification suggestion naming every involved ticker.
    fn correlation(
        pairwise: &[(String, String, f64)],
        settings: &AdvisorSettings,
    ) -> Vec<Suggestion> {
        let flagged: Vec<&(String, String, f64)> = pairwise
            .iter()
            .filter(|(_, _, corr)| *corr > settings.correlation_threshold)
            .collect();
        if flagged.is_empty() {
            return Vec::new();
        }

        let affected: BTreeSet<String> = flagged
            .iter()
            .flat_map(|(a, b, _)| [a.clone(), b.clone()])
            .collect();
        let severity = if flagged.iter().any(|(_, _, corr)| *corr >= 0.95) {
            Severity::Medium
        } else {
            Severity::Low
        };
        let pairs: Vec<String> = flagged
            .iter()
            .map(|(a, b, corr)| format!("{a}/{b} ({corr:.2})"))
            .collect();

        vec![Suggestion::new(
            SuggestionCategory::Correlation,
            severity,
            affected,
            format!(
                "Holdings move together too closely to diversify: {}. Consider replacing \
                 one from each pair.",
                pairs.join(", ")
            ),
        )]
    }
}

impl Default for RuleService {
    fn default() -> Self {
        Self::new()
    }
}
