//! Glyph sources: a TrueType face when one is available, otherwise the
//! embedded 8x8 bitmap font scaled up.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

use super::FontChoice;
use crate::error::RenderError;

/// Fonts probed when no font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Bitmap cell size of the embedded font.
const CELL: u32 = 8;

/// Where glyph shapes come from.
pub enum Glyphs {
    /// A parsed TrueType/OpenType face.
    TrueType {
        /// The face.
        font: FontVec,
        /// File it was loaded from.
        path: PathBuf,
    },
    /// The embedded bitmap font.
    Bitmap,
}

impl Glyphs {
    /// Load glyphs for a font choice.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] if an explicitly configured file cannot
    /// be read or parsed. Auto-detection never fails.
    pub fn load(choice: &FontChoice) -> Result<Self, RenderError> {
        match choice {
            FontChoice::Builtin => Ok(Self::Bitmap),
            FontChoice::File(path) => Self::from_file(path),
            FontChoice::Auto => {
                for candidate in SYSTEM_FONTS.iter().map(Path::new).filter(|p| p.is_file()) {
                    match Self::from_file(candidate) {
                        Ok(glyphs) => return Ok(glyphs),
                        Err(e) => tracing::debug!(error = %e, "Skipping system font"),
                    }
                }
                tracing::debug!("No system font found, using builtin bitmap font");
                Ok(Self::Bitmap)
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, RenderError> {
        let font_error = |message: String| RenderError::Font { path: path.to_path_buf(), message };
        let data = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
        let font = FontVec::try_from_vec(data).map_err(|e| font_error(e.to_string()))?;
        Ok(Self::TrueType { font, path: path.to_path_buf() })
    }

    /// Short description for logs and reports.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::TrueType { path, .. } => path.display().to_string(),
            Self::Bitmap => "builtin".to_string(),
        }
    }

    /// Width of `text` in pixels at `size`.
    #[must_use]
    pub fn width(&self, text: &str, size: f32) -> u32 {
        match self {
            Self::TrueType { font, .. } => text_size(PxScale::from(size), font, text).0,
            Self::Bitmap => {
                let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                chars.saturating_mul(CELL * bitmap_scale(size))
            }
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`).
    pub fn draw(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        x: u32,
        y: u32,
        size: f32,
        color: Rgb<u8>,
    ) {
        match self {
            Self::TrueType { font, .. } => {
                let x = i32::try_from(x).unwrap_or(i32::MAX);
                let y = i32::try_from(y).unwrap_or(i32::MAX);
                draw_text_mut(canvas, color, x, y, PxScale::from(size), font, text);
            }
            Self::Bitmap => draw_bitmap(canvas, text, x, y, bitmap_scale(size), color),
        }
    }
}

/// Integer upscale of the 8px bitmap closest to `size` without exceeding it.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn bitmap_scale(size: f32) -> u32 {
    ((size / CELL as f32).floor() as u32).max(1)
}

fn draw_bitmap(canvas: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let advance = CELL * scale;
    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(rows) = bitmap_for(ch) {
            for (row, bits) in (0u32..).zip(rows) {
                for col in 0..CELL {
                    if bits & (1 << col) != 0 {
                        fill_cell(canvas, pen_x + col * scale, y + row * scale, scale, color);
                    }
                }
            }
        }
        pen_x = pen_x.saturating_add(advance);
    }
}

/// Bitmap for `ch`, mapping typographic punctuation onto ASCII.
fn bitmap_for(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(ch).or_else(|| {
        let substitute = match ch {
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2026}' => '.',
            _ => '?',
        };
        BASIC_FONTS.get(substitute)
    })
}

fn fill_cell(canvas: &mut RgbImage, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    for py in y..y.saturating_add(scale).min(height) {
        for px in x..x.saturating_add(scale).min(width) {
            canvas.put_pixel(px, py, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_width_scales_with_size() {
        let glyphs = Glyphs::Bitmap;
        assert_eq!(glyphs.width("abc", 48.0), 3 * 8 * 6);
        assert_eq!(glyphs.width("abc", 4.0), 3 * 8);
        assert_eq!(glyphs.width("", 48.0), 0);
    }

    #[test]
    fn bitmap_draw_stays_inside_cell() {
        let bg = Rgb([0, 0, 0]);
        let mut canvas = RgbImage::from_pixel(100, 100, bg);
        Glyphs::Bitmap.draw(&mut canvas, "Hi", 10, 20, 16.0, Rgb([255, 255, 255]));
        let mut inked = 0;
        for (x, y, px) in canvas.enumerate_pixels() {
            if *px != bg {
                inked += 1;
                assert!((10..10 + 32).contains(&x), "x={x}");
                assert!((20..20 + 16).contains(&y), "y={y}");
            }
        }
        assert!(inked > 0);
    }

    #[test]
    fn bitmap_draw_clips_at_canvas_edge() {
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        Glyphs::Bitmap.draw(&mut canvas, "WWWW", 4, 4, 32.0, Rgb([255, 255, 255]));
    }

    #[test]
    fn em_dash_has_a_shape() {
        assert_eq!(bitmap_for('\u{2014}'), BASIC_FONTS.get('-'));
        assert!(bitmap_for('\u{4E16}').is_some());
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let err = Glyphs::load(&FontChoice::File("/nonexistent/font.ttf".into())).err().unwrap();
        assert!(matches!(err, RenderError::Font { .. }));
    }

    #[test]
    fn invalid_font_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        let err = Glyphs::load(&FontChoice::File(path)).err().unwrap();
        assert!(err.to_string().contains("bad.ttf"));
    }

    #[test]
    fn auto_never_fails() {
        assert!(Glyphs::load(&FontChoice::Auto).is_ok());
    }
}
