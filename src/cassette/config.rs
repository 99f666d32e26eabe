//! Cassette configuration for loading and replaying.

use std::path::Path;

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Load a cassette file and create a replayer.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
    let cassette: Cassette = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
    Ok(CassetteReplayer::new(&cassette))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn load_valid_cassette() {
        let dir = std::env::temp_dir().join("stoa_cassette_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.cassette.yaml");

        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions: vec![Interaction {
                seq: 0,
                port: "text_generator".into(),
                method: "complete".into(),
                input: json!({"model": "gemini-3-flash-preview"}),
                output: json!({"Ok": "{}"}),
            }],
        };
        let yaml = serde_yaml::to_string(&cassette).unwrap();
        std::fs::write(&path, yaml).unwrap();

        let mut replayer = load_cassette(&path).unwrap();
        let i = replayer.next_interaction("text_generator", "complete").unwrap();
        assert_eq!(i.seq, 0);
        assert_eq!(i.input["model"], "gemini-3-flash-preview");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_nonexistent_fails() {
        let err = load_cassette(Path::new("/nonexistent/cassette.yaml")).unwrap_err();
        assert!(err.contains("Failed to read"));
    }

    #[test]
    fn load_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.cassette.yaml");
        std::fs::write(&path, "interactions: [not, a, list, of, maps").unwrap();
        let err = load_cassette(&path).unwrap_err();
        assert!(err.contains("Failed to parse"));
    }
}
