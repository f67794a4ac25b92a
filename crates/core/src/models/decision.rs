use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics::{PerformanceMetrics, StockContribution};
use super::news::NewsSignal;
use super::suggestion::Suggestion;

/// The quantitative evidence a decision was based on, embedded so a record
/// stands alone once serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingMetrics {
    pub performance: PerformanceMetrics,
    pub contributions: Vec<StockContribution>,
}

/// The final advisory payload of one run: model narrative (when available),
/// rule-engine suggestions, news signals, and the metrics behind them.
///
/// `incomplete` is true when the model narrative is partial or the run fell
/// back to a metrics-only summary; the numeric fields are always complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: Uuid,

    /// The as-of trading date the run analyzed
    pub date: NaiveDate,
    pub generated_at: DateTime<Utc>,

    /// Lead narrative: the model's portfolio assessment, or the metrics-only
    /// fallback text when the model was unavailable
    pub summary_text: String,

    /// Model narrative sections; each may be absent on a partial response
    pub assessment: Option<String>,
    pub recommendations: Option<String>,
    pub outlook: Option<String>,

    /// Rule-engine suggestions, ordered by severity then category
    pub suggestions: Vec<Suggestion>,

    /// Per-ticker news signals that informed the decision
    pub news_signals: Vec<NewsSignal>,

    pub supporting_metrics: SupportingMetrics,

    /// Verbatim model output; empty when the run degraded to metrics-only
    pub raw_model_output: String,

    pub incomplete: bool,
}
