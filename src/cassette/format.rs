//! On-disk cassette format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded run: every port call in the order it happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable name, usually `<timestamp>-run`.
    pub name: String,
    /// When recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Recorded calls.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// One port call and its outcome.
///
/// `output` is `{"Ok": value}` or `{"Err": "message"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the whole recording.
    pub seq: u64,
    /// Port name, e.g. `text_generator`.
    pub port: String,
    /// Method on the port, e.g. `complete`.
    pub method: String,
    /// Serialized request.
    #[serde(default)]
    pub input: serde_json::Value,
    /// Serialized result.
    pub output: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_handwritten_yaml() {
        let yaml = r#"
name: fixture
recorded_at: 2026-01-01T00:00:00Z
commit: abc123
interactions:
  - seq: 0
    port: text_generator
    method: complete
    output:
      Ok: '{"quote":"Q","author":"A","context":""}'
  - seq: 1
    port: publisher
    method: send
    input: {}
    output:
      Err: connection reset
"#;
        let cassette: Cassette = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cassette.interactions.len(), 2);
        assert!(cassette.interactions[0].input.is_null());
        assert_eq!(cassette.interactions[1].output["Err"], "connection reset");
    }
}
