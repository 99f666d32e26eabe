//! Replaying adapter for the `PostTransport` port.

use std::sync::{Arc, Mutex};

use super::next_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::PUBLISHER_PORT;
use crate::error::TransportError;
use crate::gateway::{AuthHeader, PostPayload};
use crate::ports::publisher::{PostTransport, SendFuture};
use crate::ports::TransportResponse;

/// Serves recorded publish responses from a cassette.
///
/// Calls are answered in recorded order regardless of which platform asks.
/// Multi-platform recordings therefore replay faithfully only with one
/// request in flight at a time.
pub struct ReplayingTransport {
    replayer: Arc<Mutex<CassetteReplayer>>,
    endpoint: String,
}

impl ReplayingTransport {
    /// Create a replaying transport backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>, endpoint: impl Into<String>) -> Self {
        Self { replayer, endpoint: endpoint.into() }
    }
}

impl PostTransport for ReplayingTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send(&self, payload: &PostPayload, _auth: &AuthHeader) -> SendFuture<'_> {
        tracing::debug!(platform = %payload.post.target.target_type, "Replaying publish call");
        let result = next_result::<TransportResponse>(&self.replayer, PUBLISHER_PORT, "send")
            .unwrap_or_else(Err)
            .map_err(TransportError::Network);
        Box::pin(async move { result })
    }
}
