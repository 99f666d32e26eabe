//! Card file naming and JPEG encoding.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::RenderError;

/// Largest card file the publishing platforms reliably accept.
pub const MAX_CARD_BYTES: usize = 5 * 1024 * 1024;

/// Encoder qualities tried in order until the card fits [`MAX_CARD_BYTES`].
const JPEG_QUALITIES: [u8; 5] = [95, 85, 75, 65, 55];

/// Generate a card filename from the quote author.
///
/// Sanitizes the author to kebab-case and appends a unix timestamp.
#[must_use]
pub fn auto_filename(author: &str) -> String {
    let sanitized = sanitize_for_filename(author, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    format!("{sanitized}-{timestamp}.jpg")
}

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true; // Prevents leading hyphen

    for ch in input.chars().take(max_len * 2) {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "quote".to_string()
    } else {
        result
    }
}

/// Resolve the card path: use the explicit path or auto-generate one in `dir`.
#[must_use]
pub fn resolve_output_path(explicit: Option<&Path>, dir: &Path, author: &str) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => dir.join(auto_filename(author)),
    }
}

/// Encode `image` as JPEG, lowering quality until it fits [`MAX_CARD_BYTES`].
///
/// # Errors
///
/// Returns [`RenderError::Encode`] if the encoder fails.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    for quality in JPEG_QUALITIES {
        bytes.clear();
        JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(image)?;
        if bytes.len() <= MAX_CARD_BYTES {
            break;
        }
        tracing::debug!(quality, size = bytes.len(), "Card too large, re-encoding");
    }
    Ok(bytes)
}

/// Encode and write the card, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written.
pub fn save_card(image: &RgbImage, path: &Path) -> Result<u64, RenderError> {
    let bytes = encode_jpeg(image)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;
    Ok(bytes.len() as u64)
}
