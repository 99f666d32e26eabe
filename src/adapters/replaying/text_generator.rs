//! Replaying adapter for the `TextGenerator` port.

use std::sync::{Arc, Mutex};

use super::next_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::TEXT_GENERATOR_PORT;
use crate::error::GenerationError;
use crate::ports::text_generator::{CompleteFuture, CompletionRequest, TextGenerator};

/// Serves recorded completions from a cassette.
pub struct ReplayingTextGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingTextGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl TextGenerator for ReplayingTextGenerator {
    fn complete(&self, _request: &CompletionRequest) -> CompleteFuture<'_> {
        let result = next_result::<String>(&self.replayer, TEXT_GENERATOR_PORT, "complete")
            .unwrap_or_else(Err)
            .map_err(|message| GenerationError::Api { status: 0, message });
        Box::pin(async move { result })
    }
}
