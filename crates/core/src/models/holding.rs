use serde::{Deserialize, Serialize};

use crate::errors::AdvisorError;

/// A single equity position in the user's portfolio. Immutable input to a run.
///
/// **Important**: Holdings do NOT store market prices. Prices come from the
/// price history collaborator and are aligned by the return normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol, uppercased (e.g., "RELIANCE", "INFY", "TCS")
    pub ticker: String,

    /// Number of shares held (always positive)
    pub quantity: f64,

    /// Average acquisition cost per share (always positive)
    pub average_cost: f64,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, quantity: f64, average_cost: f64) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            quantity,
            average_cost,
        }
    }

    /// Validate the holding before it enters a run.
    ///
    /// Rules:
    /// - Ticker must be non-empty
    /// - Quantity and average cost must be positive and finite
    pub fn validate(&self) -> Result<(), AdvisorError> {
        if self.ticker.trim().is_empty() {
            return Err(AdvisorError::Validation(
                "Holding ticker must not be empty".into(),
            ));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(AdvisorError::Validation(format!(
                "Holding {} has non-positive quantity {}",
                self.ticker, self.quantity
            )));
        }
        if !self.average_cost.is_finite() || self.average_cost <= 0.0 {
            return Err(AdvisorError::Validation(format!(
                "Holding {} has non-positive average cost {}",
                self.ticker, self.average_cost
            )));
        }
        Ok(())
    }
}
