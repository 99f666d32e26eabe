//! Configuration file loading with environment variable overrides.
//!
//! The file is optional; every value has a default except credentials.
//! [`Settings::resolve`] folds file, environment and CLI into one immutable
//! value. Nothing below `main` reads the environment after that.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::RunError;
use crate::gateway::{Credentials, RetryPolicy};
use crate::model::{detect_provider, resolve_model, Provider, DEFAULT_MODEL};
use crate::params::{
    parse_platforms, validate_canvas, validate_publish, validate_timeout, ApiVersion, Platform,
};
use crate::render::{FontChoice, RenderSettings};

/// Default Blotato API base URL.
pub const DEFAULT_PUBLISH_BASE_URL: &str = "https://backend.blotato.com/v2";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Quote generation settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Card rendering settings.
    #[serde(default)]
    pub render: RenderConfig,

    /// Publishing settings.
    #[serde(default)]
    pub publish: PublishConfig,

    /// Media hosting settings.
    #[serde(default)]
    pub media: MediaConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
    /// `OpenAI` API key.
    pub openai: Option<String>,
    /// Blotato API key.
    pub blotato: Option<String>,
    /// Media host API key.
    pub media: Option<String>,
}

/// Quote generation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model name or alias.
    pub model: String,
    /// Topic or philosopher; `None` or `"random"` means unconstrained.
    pub topic: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL.to_string(), topic: None, timeout_secs: 30 }
    }
}

/// Card rendering settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory of background images.
    pub templates_dir: String,
    /// Font path, `"builtin"`, or unset for auto-detection.
    pub font: Option<String>,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Margin around the text box in pixels.
    pub margin: u32,
    /// Directory for rendered cards (defaults to the system temp dir).
    pub output_dir: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            templates_dir: "assets/templates".to_string(),
            font: None,
            width: 1080,
            height: 1080,
            margin: 80,
            output_dir: None,
        }
    }
}

/// Publishing settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Blotato account identifier.
    pub account_id: Option<String>,
    /// API base URL.
    pub base_url: String,
    /// API version, which selects the auth header scheme.
    pub api_version: ApiVersion,
    /// Target platforms.
    pub platforms: Vec<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Additional attempts for transient failures.
    pub max_retries: u32,
    /// Initial backoff in milliseconds.
    pub backoff_ms: u64,
    /// Platforms published concurrently.
    pub max_concurrency: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            base_url: DEFAULT_PUBLISH_BASE_URL.to_string(),
            api_version: ApiVersion::default(),
            platforms: vec!["twitter".to_string()],
            timeout_secs: 30,
            max_retries: 2,
            backoff_ms: 1000,
            max_concurrency: 4,
        }
    }
}

/// Media hosting settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Upload endpoint; unset disables media upload.
    pub upload_url: Option<String>,
    /// Upload timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { upload_url: None, timeout_secs: 60 }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }
}

/// Environment lookup, injectable so tests never touch the process env.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Read a non-blank variable from the process environment.
#[must_use]
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolved generation settings.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Full model identifier.
    pub model: String,
    /// Provider serving the model.
    pub provider: Provider,
    /// Topic override, if any.
    pub topic: Option<String>,
    /// API key for the provider (absent is fine when replaying).
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

/// Resolved publish settings.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    /// API base URL.
    pub base_url: String,
    /// API version for the auth scheme.
    pub api_version: ApiVersion,
    /// Target platforms, deduplicated.
    pub platforms: Vec<Platform>,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
    /// Platforms published concurrently.
    pub max_concurrency: usize,
    /// Account credentials.
    pub credentials: Credentials,
}

/// Resolved media host settings.
#[derive(Debug, Clone)]
pub struct MediaSettings {
    /// Upload endpoint.
    pub upload_url: String,
    /// Optional bearer key for the host.
    pub api_key: Option<String>,
    /// Upload timeout.
    pub timeout: Duration,
}

/// Everything one run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Quote generation.
    pub generation: GenerationSettings,
    /// Card rendering.
    pub render: RenderSettings,
    /// Explicit card output path.
    pub output: Option<PathBuf>,
    /// Directory for auto-named cards.
    pub output_dir: PathBuf,
    /// Publishing.
    pub publish: PublishSettings,
    /// Media hosting; `None` means cards are never uploaded.
    pub media: Option<MediaSettings>,
}

impl Settings {
    /// Resolve settings from the config file, environment and CLI flags.
    ///
    /// Precedence is CLI, then environment, then file, then defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid values or missing publish credentials.
    pub fn resolve(config: Config, cli: &Cli, env: EnvLookup<'_>) -> Result<Self, RunError> {
        let model_name = cli.model.clone().unwrap_or(config.generation.model);
        let model = resolve_model(&model_name);
        let provider = detect_provider(&model).map_err(RunError::InvalidArgument)?;
        let api_key = match provider {
            Provider::Gemini => env("GEMINI_API_KEY").or(config.keys.gemini),
            Provider::OpenAi => env("OPENAI_API_KEY").or(config.keys.openai),
        };
        let topic = cli
            .topic
            .clone()
            .or_else(|| env("STOA_TOPIC"))
            .or(config.generation.topic)
            .filter(|t| !t.trim().is_empty());
        validate_timeout("Generation", config.generation.timeout_secs)
            .map_err(RunError::InvalidArgument)?;
        let generation = GenerationSettings {
            model,
            provider,
            topic,
            api_key,
            timeout: Duration::from_secs(config.generation.timeout_secs),
        };

        let render_cfg = config.render;
        validate_canvas(render_cfg.width, render_cfg.height, render_cfg.margin)
            .map_err(RunError::InvalidArgument)?;
        let font = FontChoice::parse(cli.font.as_deref().or(render_cfg.font.as_deref()));
        let templates_dir =
            cli.templates_dir.clone().unwrap_or(render_cfg.templates_dir);
        let render = RenderSettings {
            templates_dir: PathBuf::from(templates_dir),
            font,
            width: render_cfg.width,
            height: render_cfg.height,
            margin: render_cfg.margin,
            ..RenderSettings::default()
        };
        let output_dir = render_cfg
            .output_dir
            .map_or_else(|| std::env::temp_dir().join("stoa"), PathBuf::from);

        let publish_cfg = config.publish;
        validate_publish(publish_cfg.max_retries, publish_cfg.backoff_ms, publish_cfg.timeout_secs)
            .map_err(RunError::InvalidArgument)?;
        let platforms = if cli.platforms.is_empty() {
            parse_platforms(&publish_cfg.platforms)
        } else {
            parse_platforms(&cli.platforms)
        }
        .map_err(RunError::InvalidArgument)?;
        let api_key = env("BLOTATO_API_KEY").or(config.keys.blotato).ok_or_else(|| {
            RunError::MissingApiKey {
                what: "Blotato API key".into(),
                env_var: "BLOTATO_API_KEY".into(),
            }
        })?;
        let account_id =
            env("BLOTATO_ACCOUNT_ID").or(publish_cfg.account_id).ok_or_else(|| {
                RunError::MissingApiKey {
                    what: "Blotato account id".into(),
                    env_var: "BLOTATO_ACCOUNT_ID".into(),
                }
            })?;
        let credentials =
            Credentials::new(&api_key, &account_id).map_err(RunError::Config)?;
        let publish = PublishSettings {
            base_url: publish_cfg.base_url.trim_end_matches('/').to_string(),
            api_version: publish_cfg.api_version,
            platforms,
            timeout: Duration::from_secs(publish_cfg.timeout_secs),
            retry: RetryPolicy::new(
                publish_cfg.max_retries,
                Duration::from_millis(publish_cfg.backoff_ms),
            ),
            max_concurrency: publish_cfg.max_concurrency.max(1),
            credentials,
        };

        validate_timeout("Media upload", config.media.timeout_secs)
            .map_err(RunError::InvalidArgument)?;
        let media = env("STOA_MEDIA_UPLOAD_URL").or(config.media.upload_url).map(|upload_url| {
            MediaSettings {
                upload_url,
                api_key: env("STOA_MEDIA_API_KEY").or(config.keys.media),
                timeout: Duration::from_secs(config.media.timeout_secs),
            }
        });

        Ok(Self {
            generation,
            render,
            output: cli.output.as_ref().map(PathBuf::from),
            output_dir,
            publish,
            media,
        })
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `STOA_CONFIG` environment variable
/// 3. `~/.config/stoa/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("STOA_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/stoa/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/stoa/config.toml")
    } else {
        PathBuf::from("stoa.toml")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    fn creds_env() -> impl Fn(&str) -> Option<String> {
        env_of(&[("BLOTATO_API_KEY", "key-123"), ("BLOTATO_ACCOUNT_ID", "acct-9")])
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.keys.gemini.is_none());
        assert!(config.keys.blotato.is_none());
        assert_eq!(config.generation.model, DEFAULT_MODEL);
        assert_eq!(config.render.width, 1080);
        assert_eq!(config.render.margin, 80);
        assert_eq!(config.publish.platforms, vec!["twitter"]);
        assert_eq!(config.publish.max_retries, 2);
        assert_eq!(config.media.timeout_secs, 60);
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.publish.base_url, DEFAULT_PUBLISH_BASE_URL);
    }

    #[test]
    fn load_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[keys]
gemini = "test-gemini-key"
blotato = "test-blotato-key"

[generation]
model = "gpt-mini"
topic = "Stoicism"

[render]
templates_dir = "/srv/backgrounds"
font = "builtin"

[publish]
account_id = "acct-1"
api_version = "v1"
platforms = ["twitter", "bluesky"]
max_retries = 1
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.keys.gemini.as_deref(), Some("test-gemini-key"));
        assert_eq!(config.keys.blotato.as_deref(), Some("test-blotato-key"));
        assert_eq!(config.generation.model, "gpt-mini");
        assert_eq!(config.generation.topic.as_deref(), Some("Stoicism"));
        assert_eq!(config.generation.timeout_secs, 30);
        assert_eq!(config.render.templates_dir, "/srv/backgrounds");
        assert_eq!(config.render.height, 1080);
        assert_eq!(config.publish.api_version, ApiVersion::V1);
        assert_eq!(config.publish.platforms, vec!["twitter", "bluesky"]);
        assert_eq!(config.publish.max_retries, 1);
        assert_eq!(config.publish.timeout_secs, 30);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn resolve_requires_publish_credentials() {
        let cli = Cli::parse_from(["stoa"]);
        let env = env_of(&[("BLOTATO_ACCOUNT_ID", "acct")]);
        let err = Settings::resolve(Config::default(), &cli, &env).unwrap_err();
        assert!(err.to_string().contains("BLOTATO_API_KEY"));

        let env = env_of(&[("BLOTATO_API_KEY", "key")]);
        let err = Settings::resolve(Config::default(), &cli, &env).unwrap_err();
        assert!(err.to_string().contains("BLOTATO_ACCOUNT_ID"));
    }

    #[test]
    fn resolve_env_overrides_file_keys() {
        let config = Config {
            keys: KeysConfig {
                gemini: Some("from-file".into()),
                blotato: Some("file-key".into()),
                ..KeysConfig::default()
            },
            ..Config::default()
        };
        let cli = Cli::parse_from(["stoa"]);
        let env = env_of(&[("GEMINI_API_KEY", "from-env"), ("BLOTATO_ACCOUNT_ID", "acct")]);
        let settings = Settings::resolve(config, &cli, &env).unwrap();
        assert_eq!(settings.generation.api_key.as_deref(), Some("from-env"));
        assert_eq!(settings.publish.credentials.api_key(), "file-key");
    }

    #[test]
    fn resolve_defaults() {
        let cli = Cli::parse_from(["stoa"]);
        let settings = Settings::resolve(Config::default(), &cli, &creds_env()).unwrap();
        assert_eq!(settings.generation.model, DEFAULT_MODEL);
        assert_eq!(settings.generation.provider, Provider::Gemini);
        assert!(settings.generation.topic.is_none());
        assert_eq!(settings.generation.timeout, Duration::from_secs(30));
        assert_eq!(settings.publish.platforms, vec![Platform::Twitter]);
        assert_eq!(settings.publish.timeout, Duration::from_secs(30));
        assert_eq!(settings.publish.retry.max_retries(), 2);
        assert_eq!(settings.publish.api_version, ApiVersion::V2);
        assert_eq!(settings.publish.credentials.account_id(), "acct-9");
        assert!(settings.media.is_none());
        assert!(settings.output.is_none());
        assert_eq!(settings.render.font, FontChoice::Auto);
    }

    #[test]
    fn resolve_cli_overrides() {
        let cli = Cli::parse_from([
            "stoa",
            "--topic",
            "Stoicism",
            "--platform",
            "instagram",
            "--platform",
            "twitter",
            "--model",
            "gpt-mini",
            "--font",
            "builtin",
            "--templates-dir",
            "/tmp/bg",
        ]);
        let settings = Settings::resolve(Config::default(), &cli, &creds_env()).unwrap();
        assert_eq!(settings.generation.topic.as_deref(), Some("Stoicism"));
        assert_eq!(settings.generation.provider, Provider::OpenAi);
        assert_eq!(settings.publish.platforms, vec![Platform::Instagram, Platform::Twitter]);
        assert_eq!(settings.render.font, FontChoice::Builtin);
        assert_eq!(settings.render.templates_dir, PathBuf::from("/tmp/bg"));
    }

    #[test]
    fn resolve_topic_from_env() {
        let cli = Cli::parse_from(["stoa"]);
        let env = env_of(&[
            ("BLOTATO_API_KEY", "k"),
            ("BLOTATO_ACCOUNT_ID", "a"),
            ("STOA_TOPIC", "Nietzsche"),
        ]);
        let settings = Settings::resolve(Config::default(), &cli, &env).unwrap();
        assert_eq!(settings.generation.topic.as_deref(), Some("Nietzsche"));
    }

    #[test]
    fn resolve_media_host_from_env() {
        let cli = Cli::parse_from(["stoa"]);
        let env = env_of(&[
            ("BLOTATO_API_KEY", "k"),
            ("BLOTATO_ACCOUNT_ID", "a"),
            ("STOA_MEDIA_UPLOAD_URL", "https://img.example/upload"),
        ]);
        let settings = Settings::resolve(Config::default(), &cli, &env).unwrap();
        let media = settings.media.unwrap();
        assert_eq!(media.upload_url, "https://img.example/upload");
        assert!(media.api_key.is_none());
        assert_eq!(media.timeout, Duration::from_secs(60));
    }

    #[test]
    fn resolve_rejects_unknown_platform() {
        let cli = Cli::parse_from(["stoa", "--platform", "myspace"]);
        let err = Settings::resolve(Config::default(), &cli, &creds_env()).unwrap_err();
        assert!(matches!(err, RunError::InvalidArgument(_)));
    }

    #[test]
    fn resolve_rejects_retry_budget_above_two() {
        let mut config = Config::default();
        config.publish.max_retries = 7;
        let cli = Cli::parse_from(["stoa"]);
        let err = Settings::resolve(config, &cli, &creds_env()).unwrap_err();
        assert!(matches!(err, RunError::InvalidArgument(_)));
        assert!(err.to_string().contains("max_retries 7"));
    }

    #[test]
    fn resolve_rejects_zero_backoff() {
        let mut config = Config::default();
        config.publish.backoff_ms = 0;
        let cli = Cli::parse_from(["stoa"]);
        let err = Settings::resolve(config, &cli, &creds_env()).unwrap_err();
        assert!(err.to_string().contains("backoff_ms"));
    }

    #[test]
    fn resolve_rejects_zero_timeouts() {
        let cli = Cli::parse_from(["stoa"]);

        let mut config = Config::default();
        config.publish.timeout_secs = 0;
        let err = Settings::resolve(config, &cli, &creds_env()).unwrap_err();
        assert!(err.to_string().contains("Publish timeout"));

        let mut config = Config::default();
        config.generation.timeout_secs = 0;
        let err = Settings::resolve(config, &cli, &creds_env()).unwrap_err();
        assert!(err.to_string().contains("Generation timeout"));

        let mut config = Config::default();
        config.media.timeout_secs = 0;
        let err = Settings::resolve(config, &cli, &creds_env()).unwrap_err();
        assert!(err.to_string().contains("Media upload timeout"));
    }

    #[test]
    fn resolved_backoff_schedule_is_strictly_increasing() {
        let cli = Cli::parse_from(["stoa"]);
        let settings = Settings::resolve(Config::default(), &cli, &creds_env()).unwrap();
        let schedule = settings.publish.retry.schedule();
        assert_eq!(schedule.len(), 2);
        assert!(schedule[0] > Duration::ZERO);
        assert!(schedule[0] < schedule[1]);
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
