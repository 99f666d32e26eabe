//! Publish gateway: turns post text and media into remote posts.
//!
//! One attempt moves through
//! `Built -> MediaResolved -> Authenticated -> Sent` and ends
//! `Succeeded`, `RejectedPermanently` or `FailedTransiently`; only the last
//! goes back to `Sent`, and only while the retry budget lasts.

mod auth;
mod payload;
mod result;
mod retry;

use std::time::Duration;

use futures_util::{stream, StreamExt};

pub use auth::{credential_header, AuthHeader, Credentials};
pub use payload::{MediaRef, PostPayload, PublishRequest};
pub use result::{ErrorKind, PublishOutcome, PublishResult};
pub use retry::RetryPolicy;

use crate::config::PublishSettings;
use crate::error::TransportError;
use crate::params::{ApiVersion, Platform};
use crate::ports::{MediaHost, PostTransport};
use result::{classify, Attempt};

/// Default bound on one publish request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Media after resolution: public URLs, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// Public URLs to attach.
    pub urls: Vec<String>,
    /// Media existed but was dropped.
    pub omitted: bool,
}

impl ResolvedMedia {
    fn omitted() -> Self {
        Self { urls: Vec::new(), omitted: true }
    }
}

/// Reliable front for the publishing API.
pub struct PublishGateway {
    transport: Box<dyn PostTransport>,
    media_host: Option<Box<dyn MediaHost>>,
    credentials: Credentials,
    api_version: ApiVersion,
    retry: RetryPolicy,
    timeout: Duration,
    max_concurrency: usize,
}

impl PublishGateway {
    /// Create a gateway with default retry, timeout and concurrency.
    #[must_use]
    pub fn new(
        transport: Box<dyn PostTransport>,
        credentials: Credentials,
        api_version: ApiVersion,
    ) -> Self {
        Self {
            transport,
            media_host: None,
            credentials,
            api_version,
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: 4,
        }
    }

    /// Create a gateway from resolved settings.
    #[must_use]
    pub fn from_settings(
        settings: &PublishSettings,
        transport: Box<dyn PostTransport>,
        media_host: Option<Box<dyn MediaHost>>,
    ) -> Self {
        Self::new(transport, settings.credentials.clone(), settings.api_version)
            .with_media_host(media_host)
            .with_retry(settings.retry)
            .with_timeout(settings.timeout)
            .with_max_concurrency(settings.max_concurrency)
    }

    /// Set the host used to publish local media.
    #[must_use]
    pub fn with_media_host(mut self, media_host: Option<Box<dyn MediaHost>>) -> Self {
        self.media_host = media_host;
        self
    }

    /// Set the retry policy for transient failures.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many platforms are published concurrently.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Publish one request to its target platform.
    pub async fn publish(&self, request: &PublishRequest) -> PublishResult {
        let media = self.resolve_media(&request.media_refs).await;
        self.deliver(&request.text, request.target_platform, &media).await
    }

    /// Publish every request, each to its own platform.
    ///
    /// Media is resolved once per distinct set of references, so a card
    /// shared by all requests is uploaded once. Requests are attempted
    /// independently and concurrently; results come back in request order.
    pub async fn publish_all(&self, requests: &[PublishRequest]) -> PublishOutcome {
        let mut resolved: Vec<(&[MediaRef], ResolvedMedia)> = Vec::new();
        let mut media_slots = Vec::with_capacity(requests.len());
        for request in requests {
            let refs = request.media_refs.as_slice();
            let slot = if let Some(slot) = resolved.iter().position(|(seen, _)| *seen == refs) {
                slot
            } else {
                let media = self.resolve_media(refs).await;
                resolved.push((refs, media));
                resolved.len() - 1
            };
            media_slots.push(slot);
        }
        let media_omitted = resolved.iter().any(|(_, media)| media.omitted);
        let resolved = &resolved;

        let mut indexed: Vec<(usize, PublishResult)> =
            stream::iter(requests.iter().zip(media_slots).enumerate())
                .map(|(index, (request, slot))| async move {
                    let media = &resolved[slot].1;
                    let resolved_request = PublishRequest {
                        text: request.text.clone(),
                        media_refs: media.urls.iter().cloned().map(MediaRef::Url).collect(),
                        target_platform: request.target_platform,
                    };
                    let mut result = self.publish(&resolved_request).await;
                    result.media_omitted = media.omitted;
                    (index, result)
                })
                .buffer_unordered(self.max_concurrency)
                .collect()
                .await;
        indexed.sort_by_key(|(index, _)| *index);

        PublishOutcome {
            results: indexed.into_iter().map(|(_, result)| result).collect(),
            media_omitted,
        }
    }

    /// Turn media references into public URLs.
    ///
    /// Without a media host, or when any upload fails, all media is dropped
    /// and the post goes out text-only.
    pub async fn resolve_media(&self, refs: &[MediaRef]) -> ResolvedMedia {
        let mut urls = Vec::with_capacity(refs.len());
        for media_ref in refs {
            match media_ref {
                MediaRef::Url(url) => urls.push(url.clone()),
                MediaRef::Local(path) => {
                    let Some(host) = self.media_host.as_deref() else {
                        tracing::warn!(
                            path = %path.display(),
                            "No media host configured, publishing text only"
                        );
                        return ResolvedMedia::omitted();
                    };
                    match host.upload(path).await {
                        Ok(url) => {
                            tracing::info!(path = %path.display(), url = %url, "Uploaded card");
                            urls.push(url);
                        }
                        Err(e) => {
                            tracing::warn!(
                                path = %path.display(),
                                "Media upload failed, publishing text only: {e}"
                            );
                            return ResolvedMedia::omitted();
                        }
                    }
                }
            }
        }
        ResolvedMedia { urls, omitted: false }
    }

    async fn deliver(
        &self,
        text: &str,
        platform: Platform,
        media: &ResolvedMedia,
    ) -> PublishResult {
        let mut result = PublishResult {
            platform,
            success: false,
            remote_post_id: None,
            error_kind: None,
            raw_status: None,
            media_omitted: media.omitted,
            attempts: 0,
            detail: None,
        };

        let payload =
            PostPayload::new(self.credentials.account_id(), text, platform, media.urls.clone());
        if let Err(missing) = payload.validate() {
            tracing::error!(%platform, "Refusing to send malformed payload: {missing}");
            result.error_kind = Some(ErrorKind::ClientRejected);
            result.detail = Some(missing);
            return result;
        }

        let auth = credential_header(self.api_version, &self.credentials);
        let endpoint = self.transport.endpoint().to_string();

        loop {
            result.attempts += 1;
            let attempt =
                match tokio::time::timeout(self.timeout, self.transport.send(&payload, &auth))
                    .await
                {
                    Ok(Ok(response)) => classify(&response),
                    Ok(Err(e)) => Attempt::transport_failure(e.to_string()),
                    Err(_) => Attempt::transport_failure(
                        TransportError::Timeout(self.timeout).to_string(),
                    ),
                };

            let (kind, status, detail) = match attempt {
                Attempt::Succeeded { status, post_id } => {
                    tracing::info!(
                        %platform,
                        status,
                        post_id = post_id.as_deref().unwrap_or("-"),
                        attempts = result.attempts,
                        "Published"
                    );
                    result.success = true;
                    result.raw_status = Some(status);
                    result.remote_post_id = post_id;
                    return result;
                }
                Attempt::Failed { kind, status, detail } => {
                    (kind, status, self.describe(&endpoint, status, &detail))
                }
            };

            let retries_used = result.attempts - 1;
            if kind.is_retryable() && retries_used < self.retry.max_retries() {
                let delay = self.retry.delay(retries_used);
                tracing::warn!(
                    %platform,
                    attempt = result.attempts,
                    max_retries = self.retry.max_retries(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Transient publish failure, retrying: {detail}"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            match kind {
                ErrorKind::ProtocolMismatch => {
                    tracing::error!(%platform, "Publish API contract changed? {detail}");
                }
                ErrorKind::ClientRejected => {
                    tracing::warn!(%platform, "Publish rejected: {detail}");
                }
                ErrorKind::Transient => {
                    tracing::warn!(
                        %platform,
                        attempts = result.attempts,
                        "Publish failed: {detail}"
                    );
                }
            }
            result.error_kind = Some(kind);
            result.raw_status = status;
            result.detail = Some(detail);
            return result;
        }
    }

    /// Diagnostic line for a failure, with the API key scrubbed.
    fn describe(&self, endpoint: &str, status: Option<u16>, detail: &str) -> String {
        let line = match status {
            Some(status) => format!("POST {endpoint} -> {status}: {detail}"),
            None => format!("POST {endpoint}: {detail}"),
        };
        self.credentials.scrub(&line)
    }
}
