//! Text generator port for hosted language models.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// A single-prompt completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The resolved model identifier (e.g., `"gemini-3-flash-preview"`).
    pub model: String,
    /// The full prompt text.
    pub prompt: String,
}

/// Boxed future type returned by [`TextGenerator::complete`].
pub type CompleteFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// Produces free text from a prompt via an external API.
///
/// Implementations return the model's raw text untouched; interpreting it
/// is the caller's job.
pub trait TextGenerator: Send + Sync {
    /// Complete the given prompt.
    fn complete(&self, request: &CompletionRequest) -> CompleteFuture<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_serialization() {
        let request = CompletionRequest {
            model: "gemini-3-flash-preview".into(),
            prompt: "Give me a quote".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gemini-3-flash-preview");
        assert_eq!(json["prompt"], "Give me a quote");
    }
}
