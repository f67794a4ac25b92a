// ═══════════════════════════════════════════════════════════════════
// News Fusion & Decision Synthesis Tests — collation/dedup, sentiment
// delegation, narrative parsing, retry-then-fallback behavior
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use portfolio_advisor_core::errors::AdvisorError;
use portfolio_advisor_core::llm::parse::parse_narrative;
use portfolio_advisor_core::llm::{parse_sentiment, sentiment_prompt, LlmClient};
use portfolio_advisor_core::models::holding::Holding;
use portfolio_advisor_core::models::metrics::{
    PerformanceMetrics, PortfolioAnalysis, StockContribution,
};
use portfolio_advisor_core::models::news::{NewsCategory, NewsItem, Sentiment};
use portfolio_advisor_core::models::suggestion::{Severity, Suggestion, SuggestionCategory};
use portfolio_advisor_core::services::decision_service::DecisionService;
use portfolio_advisor_core::services::news_service::NewsService;

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn at(day: u32, hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
}

fn analysis() -> PortfolioAnalysis {
    PortfolioAnalysis {
        metrics: PerformanceMetrics {
            total_return: 0.08,
            annualized_return: 0.11,
            annualized_volatility: 0.16,
            sharpe_ratio: 0.69,
            max_drawdown: -0.05,
        },
        contributions: vec![StockContribution {
            ticker: "RELIANCE".into(),
            weight: 0.42,
            stock_return: 0.06,
            correlation_to_market: 0.8,
            beta: 1.1,
            contribution_to_variance: 0.0004,
        }],
        suggestions: vec![Suggestion::new(
            SuggestionCategory::Concentration,
            Severity::High,
            ["RELIANCE".to_string()],
            "RELIANCE makes up 42.0% of portfolio value.",
        )],
    }
}

// ═══════════════════════════════════════════════════════════════════
// Mock LLM Clients
// ═══════════════════════════════════════════════════════════════════

/// Returns queued responses in order, repeating the last one.
struct ScriptedClient {
    responses: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: responses.into_iter().map(String::from).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, AdvisorError> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .responses
            .get(i)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or_default())
    }
}

/// Never answers within any timeout.
struct HangingClient;

#[async_trait]
impl LlmClient for HangingClient {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, AdvisorError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".into())
    }
}

const FULL_RESPONSE: &str = "\
1. PORTFOLIO ASSESSMENT:
The portfolio is healthy overall but heavily concentrated in RELIANCE.

2. ACTIONABLE RECOMMENDATIONS:
Trim RELIANCE below 30% and add a defensive holding.

3. MARKET OUTLOOK:
Energy-sector news suggests near-term volatility.";

const PARTIAL_RESPONSE: &str = "\
PORTFOLIO ASSESSMENT:
Reasonable risk-adjusted returns.

MARKET OUTLOOK:
Stable, barring policy surprises.";

// ═══════════════════════════════════════════════════════════════════
// Narrative parsing
// ═══════════════════════════════════════════════════════════════════

#[test]
fn parses_all_three_sections() {
    let narrative = parse_narrative(FULL_RESPONSE).unwrap();
    assert!(narrative.is_complete());
    assert!(narrative.assessment.unwrap().contains("concentrated"));
    assert!(narrative.recommendations.unwrap().contains("Trim RELIANCE"));
    assert!(narrative.outlook.unwrap().contains("volatility"));
}

#[test]
fn parses_markdown_decorated_headings() {
    let text = "## 1. Portfolio Assessment:\nFine.\n\n**Actionable Recommendations**\nHold.\n\n# Market Outlook\nCalm.";
    let narrative = parse_narrative(text).unwrap();
    assert!(narrative.is_complete());
    assert_eq!(narrative.assessment.as_deref(), Some("Fine."));
    assert_eq!(narrative.recommendations.as_deref(), Some("Hold."));
    assert_eq!(narrative.outlook.as_deref(), Some("Calm."));
}

#[test]
fn partial_response_keeps_extractable_sections() {
    let narrative = parse_narrative(PARTIAL_RESPONSE).unwrap();
    assert!(!narrative.is_complete());
    assert!(narrative.assessment.is_some());
    assert!(narrative.recommendations.is_none());
    assert!(narrative.outlook.is_some());
}

#[test]
fn empty_or_sectionless_response_is_model_error() {
    assert!(matches!(
        parse_narrative("   \n  "),
        Err(AdvisorError::ModelResponse(_))
    ));
    assert!(matches!(
        parse_narrative("The market went up today. Nothing else to report."),
        Err(AdvisorError::ModelResponse(_))
    ));
}

#[test]
fn sentiment_parsing_finds_first_keyword() {
    assert_eq!(parse_sentiment("POSITIVE").unwrap(), Sentiment::Positive);
    assert_eq!(
        parse_sentiment("Overall this reads negative, not neutral.").unwrap(),
        Sentiment::Negative
    );
    assert!(parse_sentiment("no verdict here").is_err());
}

// ═══════════════════════════════════════════════════════════════════
// News fusion
// ═══════════════════════════════════════════════════════════════════

fn holdings() -> Vec<Holding> {
    vec![
        Holding::new("RELIANCE", 10.0, 2400.0),
        Holding::new("INFY", 5.0, 1450.0),
    ]
}

#[test]
fn collate_dedupes_and_orders_most_recent_first() {
    let items = vec![
        NewsItem::new("RELIANCE", "Refinery output up", at(3, 9), NewsCategory::MediumImpact),
        NewsItem::new("RELIANCE", "Major acquisition announced", at(5, 10), NewsCategory::HighImpact),
        // Duplicate headline, older copy — must collapse into one.
        NewsItem::new("RELIANCE", "Refinery output up", at(2, 8), NewsCategory::LowImpact),
        NewsItem::new("MARKET", "Nifty hits record", at(5, 11), NewsCategory::GeneralMarket),
        NewsItem::new("TCS", "Unheld ticker news", at(5, 12), NewsCategory::HighImpact),
    ];

    let collated = NewsService::new().collate(&items, &holdings());
    // INFY had no news → omitted entirely, not zero-filled.
    assert_eq!(collated.len(), 1);
    let (ticker, headlines) = &collated[0];
    assert_eq!(ticker, "RELIANCE");
    assert_eq!(
        headlines,
        &vec![
            "Major acquisition announced".to_string(),
            "Refinery output up".to_string(),
        ]
    );
}

#[tokio::test]
async fn fuse_delegates_sentiment_to_client() {
    let items = vec![
        NewsItem::new("RELIANCE", "Record profits", at(5, 10), NewsCategory::HighImpact),
        NewsItem::new("INFY", "Guidance cut", at(5, 9), NewsCategory::MediumImpact),
    ];
    // Default classify_sentiment prompts generate() for a one-word verdict.
    let client = ScriptedClient::new(vec!["POSITIVE"]);

    let signals = NewsService::new()
        .fuse(&items, &holdings(), &client)
        .await
        .unwrap();
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0].ticker, "INFY");
    assert_eq!(signals[1].ticker, "RELIANCE");
    assert!(signals.iter().all(|s| s.sentiment == Sentiment::Positive));
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn failed_sentiment_degrades_to_neutral() {
    let items = vec![NewsItem::new(
        "RELIANCE",
        "Record profits",
        at(5, 10),
        NewsCategory::HighImpact,
    )];
    let client = ScriptedClient::new(vec!["no verdict in this reply"]);

    let signals = NewsService::new()
        .fuse(&items, &holdings(), &client)
        .await
        .unwrap();
    assert_eq!(signals[0].sentiment, Sentiment::Neutral);
}

#[test]
fn ollama_client_builds_with_explicit_config() {
    use portfolio_advisor_core::llm::ollama::OllamaClient;
    let client = OllamaClient::new("http://localhost:11434/api/generate", "llama3").unwrap();
    assert_eq!(client.model(), "llama3");
    assert_eq!(client.name(), "Ollama");
}

#[test]
fn sentiment_prompt_lists_headlines() {
    let prompt = sentiment_prompt("INFY", &["Guidance cut".into(), "Buyback".into()]);
    assert!(prompt.contains("INFY"));
    assert!(prompt.contains("- Guidance cut"));
    assert!(prompt.contains("- Buyback"));
}

// ═══════════════════════════════════════════════════════════════════
// Decision synthesis
// ═══════════════════════════════════════════════════════════════════

#[test]
fn prompt_is_deterministic_and_carries_all_inputs() {
    let svc = DecisionService::new();
    let a = analysis();
    let prompt = svc.build_prompt(&a.metrics, &a.suggestions, &[]).unwrap();
    let again = svc.build_prompt(&a.metrics, &a.suggestions, &[]).unwrap();
    assert_eq!(prompt, again);
    assert!(prompt.contains("PORTFOLIO PERFORMANCE METRICS"));
    assert!(prompt.contains("\"sharpe_ratio\": 0.69"));
    assert!(prompt.contains("Concentration (High): RELIANCE"));
    assert!(prompt.contains("RECENT NEWS SIGNALS:\nNone"));
}

#[tokio::test]
async fn full_response_yields_complete_record() {
    let svc = DecisionService::new();
    let client = ScriptedClient::new(vec![FULL_RESPONSE]);
    let a = analysis();

    let record = svc
        .synthesize(&client, d(2025, 6, 6), &a, &[], Duration::from_secs(60))
        .await
        .unwrap();

    assert!(!record.incomplete);
    assert_eq!(record.date, d(2025, 6, 6));
    assert_eq!(record.raw_model_output, FULL_RESPONSE);
    assert!(record.summary_text.contains("concentrated"));
    assert_eq!(record.suggestions, a.suggestions);
    assert_eq!(record.supporting_metrics.performance, a.metrics);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn partial_response_marks_record_incomplete_not_error() {
    let svc = DecisionService::new();
    let client = ScriptedClient::new(vec![PARTIAL_RESPONSE]);
    let a = analysis();

    let record = svc
        .synthesize(&client, d(2025, 6, 6), &a, &[], Duration::from_secs(60))
        .await
        .unwrap();

    assert!(record.incomplete);
    assert!(record.assessment.is_some());
    assert!(record.recommendations.is_none());
    assert!(record.outlook.is_some());
    // Partial is not retried: the extractable fields are kept as-is.
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn malformed_first_reply_is_retried_once() {
    let svc = DecisionService::new();
    let client = ScriptedClient::new(vec!["", FULL_RESPONSE]);
    let a = analysis();

    let record = svc
        .synthesize(&client, d(2025, 6, 6), &a, &[], Duration::from_secs(60))
        .await
        .unwrap();

    assert!(!record.incomplete);
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn two_malformed_replies_fall_back_to_metrics_summary() {
    let svc = DecisionService::new();
    let client = ScriptedClient::new(vec!["gibberish", "more gibberish"]);
    let a = analysis();

    let record = svc
        .synthesize(&client, d(2025, 6, 6), &a, &[], Duration::from_secs(60))
        .await
        .unwrap();

    assert!(record.incomplete);
    assert!(record.raw_model_output.is_empty());
    assert!(record.assessment.is_none());
    assert!(record.summary_text.starts_with("Metrics-only summary"));
    assert!(record.summary_text.contains("Sharpe ratio 0.69"));
    assert_eq!(client.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn timeout_degrades_to_metrics_only_record() {
    let svc = DecisionService::new();
    let a = analysis();

    let record = svc
        .synthesize(&HangingClient, d(2025, 6, 6), &a, &[], Duration::from_secs(60))
        .await
        .unwrap();

    assert!(record.incomplete);
    assert!(record.raw_model_output.is_empty());
    assert!(record.summary_text.starts_with("Metrics-only summary"));
    assert_eq!(record.supporting_metrics.contributions, a.contributions);
}
