//! Generation model name resolution and provider detection.

/// Supported text generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini API.
    Gemini,
    /// `OpenAI` API.
    OpenAi,
}

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Short name aliases for text models.
const ALIASES: &[(&str, &str)] = &[
    ("flash", "gemini-3-flash-preview"),
    ("flash-lite", "gemini-2.5-flash-lite"),
    ("pro", "gemini-3-pro-preview"),
    ("gpt", "gpt-4.1"),
    ("gpt-mini", "gpt-4.1-mini"),
];

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    for &(alias, full) in ALIASES {
        if name == alias {
            return full.to_string();
        }
    }
    name.to_string()
}

/// Detect the provider from a resolved model name.
///
/// # Errors
///
/// Returns an error if the model name doesn't match a known provider prefix.
pub fn detect_provider(model: &str) -> Result<Provider, String> {
    if model.starts_with("gemini") {
        Ok(Provider::Gemini)
    } else if model.starts_with("gpt-") {
        Ok(Provider::OpenAi)
    } else {
        Err(format!("Unknown provider for model '{model}'. Expected 'gemini-*' or 'gpt-*'."))
    }
}
