//! Error types for stoa.
//!
//! Each pipeline stage has its own error enum; [`RunError`] unifies the
//! fatal ones for `main`. Publish failures are not errors at all: they are
//! classified into a [`crate::gateway::ErrorKind`] on the per-platform
//! result so that one platform can fail while another succeeds.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run before anything is published.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required credential is not configured.
    #[error("No {what} configured. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// Human-readable name of the missing value.
        what: String,
        /// The environment variable name.
        env_var: String,
    },

    /// The content provider could not produce a quote.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The quote card could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the text generation API or from parsing its output.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The generation API returned an error response.
    #[error("Generation API error ({status}): {message}")]
    Api {
        /// HTTP status code (0 when replayed from a cassette).
        status: u16,
        /// Error message or truncated response body.
        message: String,
    },

    /// The request never produced a response.
    #[error("Generation request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The model answered without any text.
    #[error("Generation response contained no text")]
    EmptyResponse,

    /// The text was not exactly the required quote object.
    #[error("Generation response is not a valid quote object: {0}")]
    Malformed(String),
}

/// Errors from rendering the quote card. Only I/O problems qualify.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The selected background image could not be read or decoded.
    #[error("Failed to load background {path:?}: {source}")]
    Background {
        /// Path of the background file.
        path: PathBuf,
        /// Underlying decoder error.
        source: image::ImageError,
    },

    /// A configured font could not be read or parsed.
    #[error("Failed to load font {path:?}: {message}")]
    Font {
        /// Path of the font file.
        path: PathBuf,
        /// Why loading failed.
        message: String,
    },

    /// The card could not be encoded.
    #[error("Failed to encode card: {0}")]
    Encode(#[from] image::ImageError),

    /// The card could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the media hosting step. Never fatal: the gateway degrades
/// to a text-only post instead.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The local file could not be read.
    #[error("Failed to read media file: {0}")]
    Io(#[from] std::io::Error),

    /// The upload request failed before a response arrived.
    #[error("Media upload failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The host rejected the upload.
    #[error("Media host error ({status}): {message}")]
    Upload {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// The host answered 2xx but without a usable URL.
    #[error("Media host response has no public URL: {0}")]
    MalformedResponse(String),
}

/// Failures below the HTTP status line when talking to the publish API.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection or protocol failure.
    #[error("network error: {0}")]
    Network(String),
}

/// Truncate a response body for inclusion in diagnostics.
#[must_use]
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_body_unchanged() {
        assert_eq!(truncate_body("short", 500), "short");
    }

    #[test]
    fn truncate_long_body() {
        let body = "x".repeat(600);
        let out = truncate_body(&body, 500);
        assert_eq!(out.len(), 503);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(10);
        assert_eq!(truncate_body(&body, 3), "ééé...");
    }

    #[test]
    fn missing_key_message_names_env_var() {
        let err = RunError::MissingApiKey {
            what: "Blotato API key".into(),
            env_var: "BLOTATO_API_KEY".into(),
        };
        assert!(err.to_string().contains("BLOTATO_API_KEY"));
    }
}
