//! Card renderer: draws a quote onto a background and writes a JPEG.
//!
//! Layout is computed against the margin box, never the canvas. Every line
//! is wrapped or ellipsised to the box width and the number of quote lines
//! is capped by the box height, so no glyph lands inside the margin.

mod glyphs;
mod layout;

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use rand::Rng;
use serde::Serialize;

use crate::content::QuoteRecord;
use crate::error::RenderError;
use crate::output;
use crate::params::is_background_extension;

use glyphs::Glyphs;

/// Vertical gap between the quote block and the author line.
const AUTHOR_GAP: u32 = 30;

/// Which glyph source to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontChoice {
    /// First loadable system font, else the builtin font.
    Auto,
    /// The embedded bitmap font.
    Builtin,
    /// A specific font file, which must load.
    File(PathBuf),
}

impl FontChoice {
    /// Interpret a configured font value.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("" | "auto") => Self::Auto,
            Some(v) if v.eq_ignore_ascii_case("builtin") => Self::Builtin,
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }
}

/// Canvas and typography settings.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Directory of candidate background images.
    pub templates_dir: PathBuf,
    /// Glyph source.
    pub font: FontChoice,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Margin on every side in pixels.
    pub margin: u32,
    /// Text colour.
    pub text_color: Rgb<u8>,
    /// Fallback background colour.
    pub background_color: Rgb<u8>,
    /// Quote font size in pixels.
    pub quote_size: f32,
    /// Author font size in pixels.
    pub author_size: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("assets/templates"),
            font: FontChoice::Auto,
            width: 1080,
            height: 1080,
            margin: 80,
            text_color: Rgb([255, 255, 255]),
            background_color: Rgb([20, 20, 30]),
            quote_size: 48.0,
            author_size: 36.0,
        }
    }
}

/// A card written to local storage.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedCard {
    /// Where the JPEG was written.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded format.
    pub format: &'static str,
    /// Whether the solid-colour background was used.
    pub used_fallback: bool,
    /// Whether the quote was cut short to fit.
    pub truncated: bool,
    /// Encoded size in bytes.
    pub bytes: u64,
}

/// An in-memory card before encoding.
pub struct Composition {
    /// The drawn canvas.
    pub image: RgbImage,
    /// Whether the solid-colour background was used.
    pub used_fallback: bool,
    /// Whether the quote was cut short to fit.
    pub truncated: bool,
}

/// Draws quote cards.
pub struct CardRenderer {
    settings: RenderSettings,
    glyphs: Glyphs,
}

impl CardRenderer {
    /// Create a renderer, loading the configured font up front.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] if an explicit font file fails to load.
    pub fn new(settings: RenderSettings) -> Result<Self, RenderError> {
        let glyphs = Glyphs::load(&settings.font)?;
        tracing::debug!(font = %glyphs.describe(), "Loaded font");
        Ok(Self { settings, glyphs })
    }

    /// Render `quote` and write it as a JPEG to `output_path`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the background cannot be decoded or the
    /// card cannot be encoded or written.
    pub fn render(
        &self,
        quote: &QuoteRecord,
        output_path: &Path,
    ) -> Result<RenderedCard, RenderError> {
        let composition = self.compose(quote)?;
        let bytes = output::save_card(&composition.image, output_path)?;
        tracing::info!(
            path = %output_path.display(),
            bytes,
            fallback = composition.used_fallback,
            "Rendered card"
        );
        Ok(RenderedCard {
            path: output_path.to_path_buf(),
            width: self.settings.width,
            height: self.settings.height,
            format: "jpeg",
            used_fallback: composition.used_fallback,
            truncated: composition.truncated,
            bytes,
        })
    }

    /// Draw the card in memory.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Background`] if the chosen background cannot
    /// be decoded.
    pub fn compose(&self, quote: &QuoteRecord) -> Result<Composition, RenderError> {
        let s = &self.settings;
        let (mut canvas, used_fallback) = match self.pick_background() {
            Some(path) => (self.load_background(path)?, false),
            None => (RgbImage::from_pixel(s.width, s.height, s.background_color), true),
        };

        let box_width = s.width.saturating_sub(2 * s.margin);
        let box_height = s.height.saturating_sub(2 * s.margin);
        let quote_measure = |text: &str| self.glyphs.width(text, s.quote_size);
        let author_measure = |text: &str| self.glyphs.width(text, s.author_size);

        let author_line =
            layout::ellipsize(&format!("\u{2014} {}", quote.author()), box_width, &author_measure);
        let author_height = line_height(s.author_size);
        let quote_height = line_height(s.quote_size);

        let available = box_height.saturating_sub(author_height + AUTHOR_GAP);
        let max_lines = usize::try_from(available / quote_height.max(1)).unwrap_or(usize::MAX);
        let wrapped = layout::wrap(quote.quote(), box_width, &quote_measure);
        let (lines, truncated) = layout::fit_lines(wrapped, max_lines, box_width, &quote_measure);
        if truncated {
            tracing::warn!(max_lines, "Quote too long for card, truncated");
        }

        let line_count = u32::try_from(lines.len()).unwrap_or(u32::MAX);
        let block_height = line_count * quote_height + AUTHOR_GAP + author_height;
        let mut y = s.margin + box_height.saturating_sub(block_height) / 2;

        for line in &lines {
            let x = s.margin + box_width.saturating_sub(quote_measure(line)) / 2;
            self.glyphs.draw(&mut canvas, line, x, y, s.quote_size, s.text_color);
            y += quote_height;
        }
        y += AUTHOR_GAP;
        if !author_line.is_empty() {
            let x = s.margin + box_width.saturating_sub(author_measure(&author_line)) / 2;
            self.glyphs.draw(&mut canvas, &author_line, x, y, s.author_size, s.text_color);
        }

        Ok(Composition { image: canvas, used_fallback, truncated })
    }

    /// Pick a random background from the templates directory, if any.
    fn pick_background(&self) -> Option<PathBuf> {
        let mut candidates = background_candidates(&self.settings.templates_dir);
        if candidates.is_empty() {
            tracing::info!(
                dir = %self.settings.templates_dir.display(),
                "No background templates, using solid colour"
            );
            return None;
        }
        let index = rand::rng().random_range(0..candidates.len());
        Some(candidates.swap_remove(index))
    }

    fn load_background(&self, path: PathBuf) -> Result<RgbImage, RenderError> {
        tracing::debug!(path = %path.display(), "Loading background");
        match image::open(&path) {
            Ok(img) => Ok(img
                .resize_exact(self.settings.width, self.settings.height, FilterType::Lanczos3)
                .to_rgb8()),
            Err(source) => Err(RenderError::Background { path, source }),
        }
    }
}

/// Image files in `dir` usable as backgrounds, sorted by name. A missing or
/// unreadable directory has none.
fn background_candidates(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Templates directory unreadable");
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|e| e.to_str()).is_some_and(is_background_extension)
        })
        .collect();
    files.sort();
    files
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn line_height(size: f32) -> u32 {
    (size * 1.25).ceil() as u32
}
