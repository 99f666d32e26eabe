//! Publisher port for the social-publishing API.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::gateway::{AuthHeader, PostPayload};

/// Status line and body of a publish API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Boxed future type returned by [`PostTransport::send`].
pub type SendFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>>;

/// Delivers one post payload and reports the raw response.
///
/// Transports never interpret status codes; classification belongs to the
/// gateway.
pub trait PostTransport: Send + Sync {
    /// The URL posts are sent to, for diagnostics.
    fn endpoint(&self) -> &str;

    /// Send the payload with the given credential header.
    fn send(&self, payload: &PostPayload, auth: &AuthHeader) -> SendFuture<'_>;
}
