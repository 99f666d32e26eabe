//! Records interactions into a cassette file.
//!
//! Callers pass already-serializable inputs; nothing secret (auth headers,
//! API keys) should ever reach the recorder.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use super::format::{Cassette, Interaction};

/// Default root for recorded runs, relative to the working directory.
pub const CASSETTE_ROOT: &str = ".stoa/cassettes";

/// Records interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            commit: commit.into(),
            interactions: Vec::new(),
            next_seq: 0,
        }
    }

    /// Create a recorder for a new run under `root`, in a directory named
    /// after the current UTC time.
    pub fn for_run(root: &Path, commit: impl Into<String>) -> Self {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = root.join(&timestamp).join("run.cassette.yaml");
        Self::new(path, format!("{timestamp}-run"), commit)
    }

    /// Where the cassette will be written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record an interaction. The `seq` field is assigned automatically.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: Value,
        output: Value,
    ) {
        let interaction = Interaction {
            seq: self.next_seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        };
        self.next_seq += 1;
        self.interactions.push(interaction);
    }

    /// Record a call result using the `Ok`/`Err` convention.
    ///
    /// Values that fail to serialize are recorded as `null` with a warning;
    /// a broken recording must not break the run being recorded.
    pub fn record_result<I, T, E>(
        &mut self,
        port: &str,
        method: &str,
        input: &I,
        result: &Result<T, E>,
    ) where
        I: Serialize,
        T: Serialize,
        E: Display,
    {
        let input = to_value_or_null(input, port);
        let output = match result {
            Ok(value) => json!({ "Ok": to_value_or_null(value, port) }),
            Err(e) => json!({ "Err": e.to_string() }),
        };
        self.record(port, method, input, output);
    }

    /// Finish recording and write the cassette YAML file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions: self.interactions,
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path)
    }
}

fn to_value_or_null<T: Serialize>(value: &T, port: &str) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::warn!(port, error = %e, "Could not serialize value for cassette");
        Value::Null
    })
}
