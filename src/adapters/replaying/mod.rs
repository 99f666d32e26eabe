//! Replaying adapters that serve recorded interactions from cassettes.

pub mod publisher;
pub mod text_generator;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;

/// A recorded call outcome: the `Ok` value, or the recorded error message.
pub(crate) type Replayed<T> = Result<T, String>;

/// Retrieve and decode the next recorded output for a port and method.
///
/// The outer error means the cassette itself could not serve the call
/// (exhausted, or the recording does not decode as `T`).
pub(crate) fn next_result<T: serde::de::DeserializeOwned>(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<Replayed<T>, String> {
    let output = {
        let mut guard = replayer.lock().map_err(|e| format!("Replayer lock poisoned: {e}"))?;
        guard.next_interaction(port, method)?.output.clone()
    };
    replay_result(output)
        .map_err(|e| format!("Cassette entry for {port}::{method} is invalid: {e}"))
}

/// Decode a recorded output using the `Ok`/`Err` convention.
fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<Replayed<T>, serde_json::Error> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Ok(Err(msg));
    }
    if let Some(ok_val) = output.get("Ok").or_else(|| output.get("ok")) {
        return serde_json::from_value(ok_val.clone()).map(Ok);
    }
    serde_json::from_value(output).map(Ok)
}
