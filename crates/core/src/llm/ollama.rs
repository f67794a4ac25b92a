use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LlmClient;
use crate::errors::AdvisorError;

const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
const DEFAULT_MODEL: &str = "llama3";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Client for a locally hosted model behind Ollama's generate endpoint.
///
/// The HTTP timeout here is transport-level only; the decision synthesizer
/// wraps every invocation in its own configurable timeout.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, AdvisorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
        })
    }

    /// Configure from `OLLAMA_ENDPOINT` / `OLLAMA_MODEL`, with local defaults.
    pub fn from_env() -> Result<Self, AdvisorError> {
        let endpoint =
            std::env::var("OLLAMA_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(endpoint, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError> {
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let res = self.http.post(&self.endpoint).json(&req).send().await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(AdvisorError::ModelResponse(format!(
                "Ollama returned status {status}: {text}"
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            AdvisorError::ModelResponse(format!("failed to decode Ollama response: {e}"))
        })?;
        tracing::debug!(model = %self.model, chars = parsed.response.len(), "model reply received");
        Ok(parsed.response)
    }
}
