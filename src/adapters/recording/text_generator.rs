//! Recording adapter for the `TextGenerator` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::TEXT_GENERATOR_PORT;
use crate::ports::text_generator::{CompleteFuture, CompletionRequest, TextGenerator};

/// Records completions while delegating to an inner implementation.
pub struct RecordingTextGenerator {
    inner: Box<dyn TextGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTextGenerator {
    /// Creates a new recording generator wrapping the given implementation.
    pub fn new(inner: Box<dyn TextGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl TextGenerator for RecordingTextGenerator {
    fn complete(&self, request: &CompletionRequest) -> CompleteFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.complete(&request).await;
            record_result(&self.recorder, TEXT_GENERATOR_PORT, "complete", &request, &result);
            result
        })
    }
}
