//! Live adapter for the Gemini text generation API.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{truncate_body, GenerationError};
use crate::ports::text_generator::{CompleteFuture, CompletionRequest, TextGenerator};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live Gemini text generator that calls the Google AI API in JSON mode.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiGenerator {
    /// Create a new Gemini generator with the given API key.
    #[must_use]
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self { client: Client::new(), api_key, base_url: GEMINI_API_BASE.to_string(), timeout }
    }

    /// Point the generator at a different models endpoint.
    #[cfg(test)]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl TextGenerator for GeminiGenerator {
    fn complete(&self, request: &CompletionRequest) -> CompleteFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let url = format!("{}/{}:generateContent", self.base_url, request.model);
            let body = serde_json::json!({
                "contents": [{
                    "parts": [{"text": request.prompt}]
                }],
                "generationConfig": {
                    "responseMimeType": "application/json"
                }
            });

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(GenerationError::Api {
                    status: status.as_u16(),
                    message: truncate_body(&response_text, 500),
                });
            }

            let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
                GenerationError::Api {
                    status: status.as_u16(),
                    message: format!("Failed to parse response: {e}"),
                }
            })?;

            let text: String = parsed
                .candidates
                .into_iter()
                .next()
                .map(|c| c.content.parts.into_iter().filter_map(|p| p.text).collect())
                .unwrap_or_default();

            if text.trim().is_empty() {
                return Err(GenerationError::EmptyResponse);
            }
            Ok(text)
        })
    }
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}
