//! Recording adapters that capture interactions to cassettes.

pub mod publisher;
pub mod text_generator;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

/// Record a `Result<T, E>` interaction on a shared recorder.
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    match recorder.lock() {
        Ok(mut guard) => guard.record_result(port, method, input, result),
        Err(e) => tracing::warn!(port, error = %e, "Recorder lock poisoned, interaction dropped"),
    }
}
