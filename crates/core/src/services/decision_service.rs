use chrono::{NaiveDate, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::errors::AdvisorError;
use crate::llm::parse::{parse_narrative, ParsedNarrative};
use crate::llm::LlmClient;
use crate::models::decision::{DecisionRecord, SupportingMetrics};
use crate::models::metrics::{PerformanceMetrics, PortfolioAnalysis};
use crate::models::news::NewsSignal;
use crate::models::suggestion::Suggestion;

/// Assembles the prompt contract, invokes the language model under a
/// timeout, and parses the reply into a `DecisionRecord`.
///
/// Recovery policy: a `ModelResponse` failure (timeout, transport, empty or
/// malformed reply) is retried once; a second failure degrades the record to
/// a metrics-only summary instead of failing the run.
pub struct DecisionService;

impl DecisionService {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic structured prompt from the run's quantitative output.
    pub fn build_prompt(
        &self,
        metrics: &PerformanceMetrics,
        suggestions: &[Suggestion],
        signals: &[NewsSignal],
    ) -> Result<String, AdvisorError> {
        let metrics_json = serde_json::to_string_pretty(metrics)
            .map_err(|e| AdvisorError::Serialization(e.to_string()))?;

        let suggestion_lines = if suggestions.is_empty() {
            "None".to_string()
        } else {
            suggestions
                .iter()
                .map(|s| format!("- {}", s.to_line()))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let signal_lines = if signals.is_empty() {
            "None".to_string()
        } else {
            signals
                .iter()
                .map(|s| {
                    format!(
                        "- {} [{}]: {}",
                        s.ticker,
                        s.sentiment,
                        s.headline_refs.join(" | ")
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        Ok(format!(
            "You are a financial advisor specializing in the Indian stock market.\n\
             \n\
             Analyze my equity portfolio based on the following data.\n\
             \n\
             PORTFOLIO PERFORMANCE METRICS:\n{metrics_json}\n\
             \n\
             OPTIMIZATION SUGGESTIONS (from quantitative analysis):\n{suggestion_lines}\n\
             \n\
             RECENT NEWS SIGNALS:\n{signal_lines}\n\
             \n\
             Respond with exactly these three sections:\n\
             \n\
             1. PORTFOLIO ASSESSMENT:\n\
                Overall health, key strengths and vulnerabilities.\n\
             \n\
             2. ACTIONABLE RECOMMENDATIONS:\n\
                Specific holdings to buy, hold, or reduce, with clear reasoning.\n\
             \n\
             3. MARKET OUTLOOK:\n\
                How recent news might impact the portfolio; risks and opportunities.\n\
             \n\
             Be specific, data-driven, and practical."
        ))
    }

    /// Plain-text summary used when the model is unavailable.
    pub fn metrics_summary(
        &self,
        metrics: &PerformanceMetrics,
        suggestions: &[Suggestion],
    ) -> String {
        let mut summary = format!(
            "Metrics-only summary (model narrative unavailable). \
             Total return {:.2}%, annualized return {:.2}%, annualized volatility {:.2}%, \
             Sharpe ratio {:.2}, max drawdown {:.2}%.",
            metrics.total_return * 100.0,
            metrics.annualized_return * 100.0,
            metrics.annualized_volatility * 100.0,
            metrics.sharpe_ratio,
            metrics.max_drawdown * 100.0,
        );
        if suggestions.is_empty() {
            summary.push_str(" No optimization rules fired.");
        } else {
            summary.push_str(&format!(" {} finding(s): ", suggestions.len()));
            summary.push_str(
                &suggestions
                    .iter()
                    .map(Suggestion::to_line)
                    .collect::<Vec<_>>()
                    .join("; "),
            );
        }
        summary
    }

    /// Run the full synthesis: prompt → model (timeout, retry once) → parse →
    /// record. Only `ModelResponse` failures are recovered; everything else
    /// propagates.
    pub async fn synthesize(
        &self,
        llm: &dyn LlmClient,
        date: NaiveDate,
        analysis: &PortfolioAnalysis,
        signals: &[NewsSignal],
        timeout: Duration,
    ) -> Result<DecisionRecord, AdvisorError> {
        let prompt = self.build_prompt(&analysis.metrics, &analysis.suggestions, signals)?;

        for attempt in 1..=2u32 {
            match self.invoke_and_parse(llm, &prompt, timeout).await {
                Ok((narrative, raw)) => {
                    let incomplete = !narrative.is_complete();
                    if incomplete {
                        tracing::warn!(client = llm.name(), "model narrative is partial; keeping extractable sections");
                    }
                    let summary_text = narrative
                        .assessment
                        .clone()
                        .or_else(|| narrative.recommendations.clone())
                        .or_else(|| narrative.outlook.clone())
                        .unwrap_or_default();
                    return Ok(self.record(date, analysis, signals, narrative, raw, summary_text, incomplete));
                }
                Err(AdvisorError::ModelResponse(detail)) => {
                    tracing::warn!(client = llm.name(), attempt, %detail, "model invocation failed");
                }
                Err(other) => return Err(other),
            }
        }

        // Retry exhausted: degrade to a metrics-only record.
        tracing::warn!(client = llm.name(), "falling back to metrics-only summary");
        let summary = self.metrics_summary(&analysis.metrics, &analysis.suggestions);
        Ok(self.record(
            date,
            analysis,
            signals,
            ParsedNarrative::default(),
            String::new(),
            summary,
            true,
        ))
    }

    /// One guarded model call: timeout and transport failures both surface
    /// as `ModelResponse` so the caller's retry policy covers them.
    async fn invoke_and_parse(
        &self,
        llm: &dyn LlmClient,
        prompt: &str,
        timeout: Duration,
    ) -> Result<(ParsedNarrative, String), AdvisorError> {
        let raw = match tokio::time::timeout(timeout, llm.generate(prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(AdvisorError::Network(detail))) => {
                return Err(AdvisorError::ModelResponse(format!(
                    "transport failure: {detail}"
                )))
            }
            Ok(Err(other)) => return Err(other),
            Err(_) => {
                return Err(AdvisorError::ModelResponse(format!(
                    "model call timed out after {}s",
                    timeout.as_secs()
                )))
            }
        };
        let narrative = parse_narrative(&raw)?;
        Ok((narrative, raw))
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        date: NaiveDate,
        analysis: &PortfolioAnalysis,
        signals: &[NewsSignal],
        narrative: ParsedNarrative,
        raw_model_output: String,
        summary_text: String,
        incomplete: bool,
    ) -> DecisionRecord {
        DecisionRecord {
            id: Uuid::new_v4(),
            date,
            generated_at: Utc::now(),
            summary_text,
            assessment: narrative.assessment,
            recommendations: narrative.recommendations,
            outlook: narrative.outlook,
            suggestions: analysis.suggestions.clone(),
            news_signals: signals.to_vec(),
            supporting_metrics: SupportingMetrics {
                performance: analysis.metrics.clone(),
                contributions: analysis.contributions.clone(),
            },
            raw_model_output,
            incomplete,
        }
    }
}

impl Default for DecisionService {
    fn default() -> Self {
        Self::new()
    }
}
