//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::blotato::BlotatoTransport;
use crate::adapters::live::gemini::GeminiGenerator;
use crate::adapters::live::media_host::HttpMediaHost;
use crate::adapters::live::openai::OpenAiGenerator;
use crate::adapters::recording::publisher::RecordingTransport;
use crate::adapters::recording::text_generator::RecordingTextGenerator;
use crate::adapters::replaying::publisher::ReplayingTransport;
use crate::adapters::replaying::text_generator::ReplayingTextGenerator;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::{CassetteRecorder, CASSETTE_ROOT};
use crate::config::{PublishSettings, Settings};
use crate::error::RunError;
use crate::model::Provider;
use crate::ports::{MediaHost, PostTransport, TextGenerator};

/// How the ports are wired for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Real network calls.
    Live,
    /// Real network calls, captured to a cassette.
    Recording,
    /// Calls answered from a cassette.
    Replaying,
}

impl Mode {
    /// Platforms published at once in this mode.
    ///
    /// Cassettes hold publisher calls in order, so recording and replaying
    /// publish one platform at a time.
    #[must_use]
    pub fn publish_concurrency(self, configured: usize) -> usize {
        match self {
            Self::Live => configured,
            Self::Recording | Self::Replaying => 1,
        }
    }
}

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Text generator port.
    pub generator: Box<dyn TextGenerator>,
    /// Publish transport port.
    pub transport: Box<dyn PostTransport>,
    /// Media host; `None` means posts go out text-only.
    pub media_host: Option<Box<dyn MediaHost>>,
    /// Which wiring this is.
    pub mode: Mode,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if adapters still hold the recorder or the cassette
    /// file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the generation API key is not configured.
    pub fn live(settings: &Settings) -> Result<Self, RunError> {
        let generation = &settings.generation;
        let (what, env_var) = match generation.provider {
            Provider::Gemini => ("Gemini API key", "GEMINI_API_KEY"),
            Provider::OpenAi => ("OpenAI API key", "OPENAI_API_KEY"),
        };
        let key = generation.api_key.clone().ok_or_else(|| RunError::MissingApiKey {
            what: what.into(),
            env_var: env_var.into(),
        })?;
        let generator: Box<dyn TextGenerator> = match generation.provider {
            Provider::Gemini => Box::new(GeminiGenerator::new(key, generation.timeout)),
            Provider::OpenAi => Box::new(OpenAiGenerator::new(key, generation.timeout)),
        };

        let media_host = settings.media.as_ref().map(|media| {
            Box::new(HttpMediaHost::new(
                media.upload_url.clone(),
                media.api_key.clone(),
                media.timeout,
            ))
                as Box<dyn MediaHost>
        });

        Ok(Self {
            generator,
            transport: Box::new(BlotatoTransport::new(
                &settings.publish.base_url,
                settings.publish.timeout,
            )),
            media_host,
            mode: Mode::Live,
        })
    }

    /// Create a recording context that wraps the live adapters with a
    /// recorder. Media uploads are not recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub fn recording(settings: &Settings) -> Result<(Self, RecordingSession), RunError> {
        let live = Self::live(settings)?;

        let recorder = CassetteRecorder::for_run(Path::new(CASSETTE_ROOT), get_commit_hash());
        tracing::info!(path = %recorder.path().display(), "Recording to cassette");
        let recorder = Arc::new(Mutex::new(recorder));

        let ctx = Self {
            generator: Box::new(RecordingTextGenerator::new(live.generator, Arc::clone(&recorder))),
            transport: Box::new(RecordingTransport::new(live.transport, Arc::clone(&recorder))),
            media_host: live.media_host,
            mode: Mode::Recording,
        };
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// No API keys are needed and media is never uploaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path, publish: &PublishSettings) -> Result<Self, RunError> {
        let replayer = load_cassette(path)
            .map_err(|e| RunError::Config(format!("Failed to load cassette: {e}")))?;
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self {
            generator: Box::new(ReplayingTextGenerator::new(Arc::clone(&replayer))),
            transport: Box::new(ReplayingTransport::new(
                replayer,
                format!("{}/posts", publish.base_url),
            )),
            media_host: None,
            mode: Mode::Replaying,
        })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
