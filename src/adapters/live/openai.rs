//! Live adapter for the `OpenAI` chat completions API.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{truncate_body, GenerationError};
use crate::ports::text_generator::{CompleteFuture, CompletionRequest, TextGenerator};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Live `OpenAI` text generator using JSON-object response format.
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    url: String,
    timeout: Duration,
}

impl OpenAiGenerator {
    /// Create a new `OpenAI` generator with the given API key.
    #[must_use]
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self { client: Client::new(), api_key, url: OPENAI_API_URL.to_string(), timeout }
    }

    /// Send completions to a different URL.
    #[cfg(test)]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl TextGenerator for OpenAiGenerator {
    fn complete(&self, request: &CompletionRequest) -> CompleteFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::json!({
                "model": request.model,
                "messages": [{"role": "user", "content": request.prompt}],
                "response_format": {"type": "json_object"},
            });

            let response = self
                .client
                .post(&self.url)
                .header("Authorization", format!("Bearer {}", self.api_key))
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

            let parsed: OpenAiResponse = serde_json::from_str(&response_text).map_err(|e| {
                GenerationError::Api {
                    status: status.as_u16(),
                    message: format!("Failed to parse response: {e}"),
                }
            })?;

            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|text| !text.trim().is_empty())
                .ok_or(GenerationError::EmptyResponse)
        })
    }
}

// --- OpenAI API response types ---

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn sends_bearer_and_json_object_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer o-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4.1",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"quote\":\"Q\"}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = OpenAiGenerator::new("o-key".into(), Duration::from_secs(5))
            .with_url(format!("{}/v1/chat/completions", server.uri()));
        let request = CompletionRequest { model: "gpt-4.1".into(), prompt: "p".into() };
        assert_eq!(generator.complete(&request).await.unwrap(), "{\"quote\":\"Q\"}");
    }

    #[tokio::test]
    async fn null_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": null}}]
            })))
            .mount(&server)
            .await;

        let generator =
            OpenAiGenerator::new("k".into(), Duration::from_secs(5)).with_url(server.uri());
        let request = CompletionRequest { model: "gpt-4.1".into(), prompt: "p".into() };
        assert!(matches!(
            generator.complete(&request).await,
            Err(GenerationError::EmptyResponse)
        ));
    }
}
