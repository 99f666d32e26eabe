//! Publish outcomes and response classification.

use serde::Serialize;

use crate::error::truncate_body;
use crate::params::Platform;
use crate::ports::TransportResponse;

/// Longest body excerpt kept in diagnostics.
pub(crate) const BODY_EXCERPT_CHARS: usize = 500;

/// Why a publish attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// The API refused the request (payload, auth, validation). Not retried.
    ClientRejected,
    /// Server error, network failure or timeout. Retried.
    Transient,
    /// The API answered in a shape this client does not understand.
    ProtocolMismatch,
}

impl ErrorKind {
    /// Whether another attempt could change the outcome.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// Result of publishing to one platform.
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    /// The platform attempted.
    pub platform: Platform,
    /// Whether the API accepted the post.
    pub success: bool,
    /// Identifier the API assigned, if it returned one.
    pub remote_post_id: Option<String>,
    /// Failure classification; `None` on success.
    pub error_kind: Option<ErrorKind>,
    /// Last HTTP status seen, if any response arrived.
    pub raw_status: Option<u16>,
    /// Media was dropped and the post went out text-only.
    pub media_omitted: bool,
    /// Requests sent, including retries.
    pub attempts: u32,
    /// Endpoint, status and truncated body for failures.
    pub detail: Option<String>,
}

/// Results for every platform in one run.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    /// One result per platform, in the order requested.
    pub results: Vec<PublishResult>,
    /// Media was dropped for this run.
    pub media_omitted: bool,
}

impl PublishOutcome {
    /// At least one platform accepted the post.
    #[must_use]
    pub fn any_succeeded(&self) -> bool {
        self.results.iter().any(|r| r.success)
    }

    /// Number of platforms that accepted the post.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }
}

/// How a single sent request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Attempt {
    /// 2xx with a readable body.
    Succeeded { status: u16, post_id: Option<String> },
    /// Anything else; `kind` decides whether it is worth retrying.
    Failed { kind: ErrorKind, status: Option<u16>, detail: String },
}

impl Attempt {
    /// A failure below the status line: network error or timeout.
    pub(crate) fn transport_failure(detail: String) -> Self {
        Self::Failed { kind: ErrorKind::Transient, status: None, detail }
    }
}

/// Classify a response by status code and body.
pub(crate) fn classify(response: &TransportResponse) -> Attempt {
    let status = response.status;
    let excerpt = || truncate_body(&response.body, BODY_EXCERPT_CHARS);
    match status {
        200..=299 => match serde_json::from_str::<serde_json::Value>(&response.body) {
            Ok(value) if value.is_object() => {
                Attempt::Succeeded { status, post_id: extract_post_id(&value) }
            }
            _ => Attempt::Failed {
                kind: ErrorKind::ProtocolMismatch,
                status: Some(status),
                detail: format!("unreadable success body: {}", excerpt()),
            },
        },
        400..=499 => Attempt::Failed {
            kind: ErrorKind::ClientRejected,
            status: Some(status),
            detail: excerpt(),
        },
        500..=599 => Attempt::Failed {
            kind: ErrorKind::Transient,
            status: Some(status),
            detail: excerpt(),
        },
        _ => Attempt::Failed {
            kind: ErrorKind::ProtocolMismatch,
            status: Some(status),
            detail: format!("unexpected status: {}", excerpt()),
        },
    }
}

/// Pull the post identifier out of a success body.
fn extract_post_id(value: &serde_json::Value) -> Option<String> {
    const ID_KEYS: &[&str] = &["postSubmissionId", "id", "postId"];
    let scopes = [Some(value), value.get("data"), value.get("post")];
    scopes.into_iter().flatten().find_map(|scope| {
        ID_KEYS.iter().find_map(|key| match scope.get(key)? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    })
}
