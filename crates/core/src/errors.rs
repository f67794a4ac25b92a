use chrono::NaiveDate;
use thiserror::Error;

/// Unified error type for the entire portfolio-advisor-core library.
/// Every public fallible function returns `Result<T, AdvisorError>`.
#[derive(Debug, Error)]
pub enum AdvisorError {
    // ── Price & return normalization ────────────────────────────────
    #[error("Invalid price for {ticker} on {date}: {price} (must be positive and finite)")]
    InvalidPrice {
        ticker: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("Insufficient data ({scope}): {message}")]
    InsufficientData { scope: String, message: String },

    // ── Contribution & risk analysis ────────────────────────────────
    #[error("Portfolio weights sum to {sum} (expected 1.0 ± 1e-6)")]
    WeightMismatch { sum: f64 },

    // ── Language model ──────────────────────────────────────────────
    #[error("Model response error: {0}")]
    ModelResponse(String),

    // ── Input validation ────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    // ── Network / serialization / I/O ───────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    Io(String),
}

impl AdvisorError {
    /// `InsufficientData` scoped to a single ticker.
    pub fn insufficient(ticker: impl Into<String>, message: impl Into<String>) -> Self {
        AdvisorError::InsufficientData {
            scope: ticker.into(),
            message: message.into(),
        }
    }

    /// `InsufficientData` scoped to the whole portfolio rather than one ticker.
    pub fn insufficient_portfolio(message: impl Into<String>) -> Self {
        AdvisorError::InsufficientData {
            scope: "portfolio".into(),
            message: message.into(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for AdvisorError {
    fn from(e: std::io::Error) -> Self {
        AdvisorError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(e: serde_json::Error) -> Self {
        AdvisorError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for AdvisorError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters from URLs so endpoint secrets never end up
        // in logs or snapshots. reqwest errors often contain full URLs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        AdvisorError::Network(sanitized)
    }
}
