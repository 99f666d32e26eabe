//! Recording adapter for the `PostTransport` port.
//!
//! Only the payload is recorded. The auth header never reaches the cassette.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::PUBLISHER_PORT;
use crate::gateway::{AuthHeader, PostPayload};
use crate::ports::publisher::{PostTransport, SendFuture};

/// Records publish calls while delegating to an inner transport.
pub struct RecordingTransport {
    inner: Box<dyn PostTransport>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTransport {
    /// Creates a new recording transport wrapping the given implementation.
    pub fn new(inner: Box<dyn PostTransport>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl PostTransport for RecordingTransport {
    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    fn send(&self, payload: &PostPayload, auth: &AuthHeader) -> SendFuture<'_> {
        let payload = payload.clone();
        let auth = auth.clone();
        Box::pin(async move {
            let result = self.inner.send(&payload, &auth).await;
            record_result(&self.recorder, PUBLISHER_PORT, "send", &payload, &result);
            result
        })
    }
}
