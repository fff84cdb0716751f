//! TrueType watermark text rasterization using fontdue (pure Rust)

use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};
use std::fs;
use std::path::PathBuf;

/// Rasterized text as an alpha-coverage bitmap. Color and opacity are
/// applied later by the compositor, so coverage is all the font layer emits.
pub struct TextBitmap {
    pub width: usize,
    pub height: usize,
    /// Row-major coverage values, 0 = transparent, 255 = fully covered
    pub coverage: Vec<u8>,
}

impl TextBitmap {
    fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            coverage: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Watermark font loaded once at startup and shared by all render passes
pub struct WatermarkFont {
    font: Font,
}

impl WatermarkFont {
    /// Load a TrueType font from a file path
    pub fn from_path(path: PathBuf) -> Result<Self> {
        let font_data = fs::read(&path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;

        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to parse font: {}", e))?;

        Ok(Self { font })
    }

    /// Try to find and load a common system font. Bold faces are preferred
    /// since the watermark is drawn at bold weight.
    pub fn from_system_font() -> Result<Self> {
        const FONT_PATH: Option<&str> = option_env!("FONT_PATH");
        if let Some(configured) = FONT_PATH {
            if let Ok(font) = Self::from_path(PathBuf::from(configured)) {
                return Ok(font);
            }
        }

        let font_paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
            "C:\\Windows\\Fonts\\arialbd.ttf",
        ];

        for path in &font_paths {
            if let Ok(font) = Self::from_path(PathBuf::from(path)) {
                return Ok(font);
            }
        }

        Err(anyhow::anyhow!(
            "Could not find any system fonts. Tried FONT_PATH ({:?}) and hardcoded paths: {:?}",
            FONT_PATH,
            font_paths
        ))
    }

    /// Rasterize a line of text at the given pixel size into a coverage bitmap
    pub fn rasterize(&self, text: &str, px: f32) -> TextBitmap {
        if text.is_empty() || px <= 0.0 {
            return TextBitmap::empty();
        }

        // Layout glyphs along a shared baseline
        let mut glyphs = Vec::new();
        let mut pen_x = 0.0f32;
        let mut max_ascent = 0i32;
        let mut max_descent = 0i32;

        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, px);

            let ascent = metrics.height as i32 + metrics.ymin;
            let descent = -metrics.ymin;
            max_ascent = max_ascent.max(ascent);
            max_descent = max_descent.max(descent);

            glyphs.push((pen_x as i32, metrics, bitmap));
            pen_x += metrics.advance_width;
        }

        let width = pen_x.ceil() as usize;
        let height = (max_ascent + max_descent).max(0) as usize;
        if width == 0 || height == 0 {
            return TextBitmap::empty();
        }

        let mut coverage = vec![0u8; width * height];

        for (x_offset, metrics, bitmap) in glyphs {
            // Position glyph relative to the baseline at max_ascent from the top
            let baseline_y = max_ascent - (metrics.height as i32 + metrics.ymin);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let px_x = x_offset + gx as i32;
                    let px_y = baseline_y + gy as i32;

                    if px_x < 0 || px_y < 0 || px_x >= width as i32 || px_y >= height as i32 {
                        continue;
                    }

                    let value = bitmap[gy * metrics.width + gx];
                    let dst = &mut coverage[(px_y as usize) * width + (px_x as usize)];
                    // Glyphs can overlap at tight kerning; keep the denser coverage
                    *dst = (*dst).max(value);
                }
            }
        }

        TextBitmap {
            width,
            height,
            coverage,
        }
    }
}
