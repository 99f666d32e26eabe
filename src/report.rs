//! Run summary printed to stdout.

use std::fmt::Write as _;

use serde::Serialize;

use crate::content::QuoteRecord;
use crate::gateway::{PublishOutcome, PublishResult};
use crate::render::RenderedCard;

/// Everything a finished run produced.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// The generated quote.
    pub quote: &'a QuoteRecord,
    /// The rendered card.
    pub card: &'a RenderedCard,
    /// Per-platform publish results.
    pub publish: &'a PublishOutcome,
    /// Overall success: at least one platform accepted the post.
    pub success: bool,
}

impl<'a> RunReport<'a> {
    /// Assemble a report.
    #[must_use]
    pub fn new(
        quote: &'a QuoteRecord,
        card: &'a RenderedCard,
        publish: &'a PublishOutcome,
    ) -> Self {
        Self { quote, card, publish, success: publish.any_succeeded() }
    }

    /// The report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The report as human-readable text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\"{}\"", self.quote.quote());
        let _ = writeln!(out, "  \u{2014} {}", self.quote.author());
        if !self.quote.context().is_empty() {
            let _ = writeln!(out, "Context: {}", self.quote.context());
        }
        let background =
            if self.card.used_fallback { "solid background" } else { "template background" };
        let _ = writeln!(
            out,
            "Card: {} ({}x{}, {background}{})",
            self.card.path.display(),
            self.card.width,
            self.card.height,
            if self.card.truncated { ", quote truncated" } else { "" },
        );
        let _ = writeln!(
            out,
            "Published to {}/{} platforms{}",
            self.publish.success_count(),
            self.publish.results.len(),
            if self.publish.media_omitted { " (media omitted, text-only)" } else { "" },
        );
        for result in &self.publish.results {
            let _ = writeln!(out, "  {}", result_line(result));
        }
        out
    }
}

fn result_line(result: &PublishResult) -> String {
    let attempts = match result.attempts {
        1 => "1 attempt".to_string(),
        n => format!("{n} attempts"),
    };
    if result.success {
        let id = result.remote_post_id.as_deref().unwrap_or("-");
        return format!("{:<10} ok     id={id} ({attempts})", result.platform.as_str());
    }
    let kind = result.error_kind.map_or_else(|| "unknown".to_string(), |k| format!("{k:?}"));
    let status = result.raw_status.map_or_else(|| "no response".to_string(), |s| s.to_string());
    let mut line = format!("{:<10} FAILED {kind} ({status}, {attempts})", result.platform.as_str());
    if let Some(detail) = &result.detail {
        let _ = write!(line, ": {detail}");
    }
    line
}
