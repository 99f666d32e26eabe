//! Content provider: asks a text generator for a quote and parses it strictly.

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::ports::{CompletionRequest, TextGenerator};

/// A philosophical quote as produced by the content provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRecord {
    quote: String,
    author: String,
    context: String,
}

impl QuoteRecord {
    /// Build a record, trimming each field.
    ///
    /// # Errors
    ///
    /// Returns an error if `quote` or `author` is blank.
    pub fn new(quote: &str, author: &str, context: &str) -> Result<Self, String> {
        let quote = quote.trim();
        let author = author.trim();
        if quote.is_empty() {
            return Err("\"quote\" is empty".to_string());
        }
        if author.is_empty() {
            return Err("\"author\" is empty".to_string());
        }
        Ok(Self {
            quote: quote.to_string(),
            author: author.to_string(),
            context: context.trim().to_string(),
        })
    }

    /// The quote text.
    #[must_use]
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Who said it.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Background on the quote; may be empty.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Text body of the social post.
    #[must_use]
    pub fn post_text(&self) -> String {
        let mut text = format!("{}\n\n\u{2014} {}", self.quote, self.author);
        if !self.context.is_empty() {
            text.push_str("\n\n");
            text.push_str(&self.context);
        }
        text
    }
}

/// Wire shape the model must answer with. All three keys are required.
#[derive(Deserialize)]
struct RawQuote {
    quote: String,
    author: String,
    context: String,
}

const RESPONSE_SHAPE: &str = r#"Return ONLY raw JSON (no markdown, no code blocks, no commentary) with exactly this structure:
{
  "quote": "the actual quote text",
  "author": "philosopher name",
  "context": "brief context about the quote or philosopher (1-2 sentences)"
}"#;

/// Build the generation prompt for an optional topic.
///
/// A missing, blank, or `"random"` topic asks for any well-known Western
/// philosopher.
#[must_use]
pub fn build_prompt(topic: Option<&str>) -> String {
    match topic.map(str::trim).filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("random")) {
        Some(topic) => format!(
            "Generate a profound quote from {topic}, a famous Western philosopher or \
             philosophical tradition.\n{RESPONSE_SHAPE}"
        ),
        None => format!(
            "Generate a profound quote from a famous Western philosopher (e.g., Marcus \
             Aurelius, Nietzsche, Seneca, Kant, Plato, Aristotle, Epictetus, Schopenhauer, \
             Camus, Sartre).\n{RESPONSE_SHAPE}"
        ),
    }
}

/// Parse model output into a [`QuoteRecord`].
///
/// The text must be exactly one JSON object with string `quote`, `author`
/// and `context` keys. Markdown fences or prose around it are rejected.
///
/// # Errors
///
/// Returns [`GenerationError::Malformed`] for anything else.
pub fn parse_quote(text: &str) -> Result<QuoteRecord, GenerationError> {
    let raw: RawQuote =
        serde_json::from_str(text.trim()).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    QuoteRecord::new(&raw.quote, &raw.author, &raw.context).map_err(GenerationError::Malformed)
}

/// Ask the generator for a quote on `topic` and parse the answer.
///
/// # Errors
///
/// Returns a [`GenerationError`] if the call fails or the answer is not a
/// valid quote object.
pub async fn generate_quote(
    generator: &dyn TextGenerator,
    model: &str,
    topic: Option<&str>,
) -> Result<QuoteRecord, GenerationError> {
    let request = CompletionRequest { model: model.to_string(), prompt: build_prompt(topic) };
    tracing::debug!(model, topic = topic.unwrap_or("random"), "Requesting quote");
    let text = generator.complete(&request).await?;
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    parse_quote(&text)
}
