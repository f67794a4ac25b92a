pub mod ollama;
pub mod parse;

use async_trait::async_trait;

use crate::errors::AdvisorError;
use crate::models::news::Sentiment;

/// Narrow boundary to the language model: prompt in, free text out.
///
/// Keeping the model behind this trait means the deterministic numeric core
/// is testable with a fake client returning fixed text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Human-readable name of this client (for logs/errors).
    fn name(&self) -> &str;

    /// Send a prompt and return the model's free-text response.
    /// May fail with `Network` (transport) or `ModelResponse` (bad reply).
    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError>;

    /// Classify the overall tone of a ticker's recent headlines.
    ///
    /// Default implementation prompts `generate` for a one-word verdict;
    /// clients with a native classification endpoint can override.
    async fn classify_sentiment(
        &self,
        ticker: &str,
        headlines: &[String],
    ) -> Result<Sentiment, AdvisorError> {
        let response = self.generate(&sentiment_prompt(ticker, headlines)).await?;
        parse_sentiment(&response)
    }
}

/// Deterministic one-word classification prompt.
pub fn sentiment_prompt(ticker: &str, headlines: &[String]) -> String {
    let mut prompt = format!(
        "Classify the overall sentiment of these recent headlines about the stock {ticker}.\n\
         Answer with exactly one word: POSITIVE, NEGATIVE, or NEUTRAL.\n\nHEADLINES:\n"
    );
    for headline in headlines {
        prompt.push_str("- ");
        prompt.push_str(headline);
        prompt.push('\n');
    }
    prompt
}

/// Extract the first sentiment keyword from a model reply.
pub fn parse_sentiment(text: &str) -> Result<Sentiment, AdvisorError> {
    let upper = text.to_uppercase();
    let found = [
        (Sentiment::Positive, "POSITIVE"),
        (Sentiment::Negative, "NEGATIVE"),
        (Sentiment::Neutral, "NEUTRAL"),
    ]
    .into_iter()
    .filter_map(|(sentiment, keyword)| upper.find(keyword).map(|idx| (idx, sentiment)))
    .min_by_key(|(idx, _)| *idx);

    match found {
        Some((_, sentiment)) => Ok(sentiment),
        None => Err(AdvisorError::ModelResponse(format!(
            "no sentiment keyword in model reply: {}",
            text.trim()
        ))),
    }
}
