//! Parameter translation between CLI/config inputs and publish API values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target social platforms accepted by the publishing API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Twitter / X.
    Twitter,
    /// Instagram.
    Instagram,
    /// `LinkedIn`.
    Linkedin,
    /// Facebook.
    Facebook,
    /// `TikTok`.
    Tiktok,
    /// Threads.
    Threads,
    /// Pinterest.
    Pinterest,
    /// Bluesky.
    Bluesky,
}

const ALL_PLATFORMS: &[Platform] = &[
    Platform::Twitter,
    Platform::Instagram,
    Platform::Linkedin,
    Platform::Facebook,
    Platform::Tiktok,
    Platform::Threads,
    Platform::Pinterest,
    Platform::Bluesky,
];

impl Platform {
    /// The discriminator string the publishing API expects.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
            Self::Facebook => "facebook",
            Self::Tiktok => "tiktok",
            Self::Threads => "threads",
            Self::Pinterest => "pinterest",
            Self::Bluesky => "bluesky",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        // "x" is what the platform calls itself now; the API still says twitter.
        if wanted == "x" {
            return Ok(Self::Twitter);
        }
        ALL_PLATFORMS.iter().copied().find(|p| p.as_str() == wanted).ok_or_else(|| {
            let valid: Vec<&str> = ALL_PLATFORMS.iter().map(|p| p.as_str()).collect();
            format!("Unsupported platform '{s}'. Valid: {}", valid.join(", "))
        })
    }
}

/// Parse a list of platform names, dropping duplicates but keeping order.
///
/// # Errors
///
/// Returns an error if any name is unknown or the list is empty.
pub fn parse_platforms<S: AsRef<str>>(names: &[S]) -> Result<Vec<Platform>, String> {
    let mut platforms = Vec::with_capacity(names.len());
    for name in names {
        let platform: Platform = name.as_ref().parse()?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    if platforms.is_empty() {
        return Err("At least one target platform is required".to_string());
    }
    Ok(platforms)
}

/// Publishing API versions, which differ in how the key is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// Raw key in a dedicated header.
    V1,
    /// Bearer token in `Authorization`.
    #[default]
    V2,
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            _ => Err(format!("Unsupported API version '{s}'. Valid: v1, v2")),
        }
    }
}

/// Validate card canvas dimensions against the margin.
///
/// # Errors
///
/// Returns an error if the margin box would be empty or the canvas is
/// implausibly large.
pub fn validate_canvas(width: u32, height: u32, margin: u32) -> Result<(), String> {
    if width == 0 || height == 0 || width > 8192 || height > 8192 {
        return Err(format!("Unsupported canvas {width}x{height}. Each side must be 1..=8192"));
    }
    if margin.saturating_mul(2) >= width.min(height) {
        return Err(format!("Margin {margin} leaves no room on a {width}x{height} canvas"));
    }
    Ok(())
}

/// Most retries the publish gateway may make after the first attempt.
pub const MAX_PUBLISH_RETRIES: u32 = 2;

/// Validate a request timeout in whole seconds.
///
/// # Errors
///
/// Returns an error if the timeout is zero.
pub fn validate_timeout(what: &str, secs: u64) -> Result<(), String> {
    if secs == 0 {
        return Err(format!("{what} timeout must be at least 1 second"));
    }
    Ok(())
}

/// Validate the publish retry budget, backoff base and timeout.
///
/// # Errors
///
/// Returns an error if more than [`MAX_PUBLISH_RETRIES`] retries are
/// requested, the backoff base is zero, or the timeout is zero.
pub fn validate_publish(
    max_retries: u32,
    backoff_ms: u64,
    timeout_secs: u64,
) -> Result<(), String> {
    if max_retries > MAX_PUBLISH_RETRIES {
        return Err(format!(
            "max_retries {max_retries} is too high. At most {MAX_PUBLISH_RETRIES} are allowed"
        ));
    }
    if backoff_ms == 0 {
        return Err("backoff_ms must be at least 1".to_string());
    }
    validate_timeout("Publish", timeout_secs)
}

/// Image extensions accepted as card backgrounds.
const BACKGROUND_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Whether a file extension names a supported background image.
#[must_use]
pub fn is_background_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    BACKGROUND_EXTENSIONS.contains(&ext.as_str())
}
