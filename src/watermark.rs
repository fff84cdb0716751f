//! Watermark anchor geometry and text compositing
//!
//! The watermark is drawn directly into the owned RGBA surface: bold white
//! text at a configured opacity, centered on an anchor point derived from
//! the surface dimensions. Font size is a fixed fraction of the larger
//! dimension so the mark scales with the image.

use serde::{Serialize, Serializer};
use std::str::FromStr;

use crate::constants::watermark::{CORNER_INSET_X, CORNER_INSET_Y, FONT_SCALE};
use crate::font::WatermarkFont;
use crate::types::Dimensions;

/// Recognized watermark anchors. Manifest values outside this set fall back
/// to [`WatermarkPosition::BottomRight`] at the configuration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatermarkPosition {
    TopLeft,
    TopCenter,
    TopRight,
    Center,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl WatermarkPosition {
    pub const ALL: [WatermarkPosition; 7] = [
        WatermarkPosition::TopLeft,
        WatermarkPosition::TopCenter,
        WatermarkPosition::TopRight,
        WatermarkPosition::Center,
        WatermarkPosition::BottomLeft,
        WatermarkPosition::BottomCenter,
        WatermarkPosition::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatermarkPosition::TopLeft => "top-left",
            WatermarkPosition::TopCenter => "top-center",
            WatermarkPosition::TopRight => "top-right",
            WatermarkPosition::Center => "center",
            WatermarkPosition::BottomLeft => "bottom-left",
            WatermarkPosition::BottomCenter => "bottom-center",
            WatermarkPosition::BottomRight => "bottom-right",
        }
    }
}

impl FromStr for WatermarkPosition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-left" => Ok(WatermarkPosition::TopLeft),
            "top-center" => Ok(WatermarkPosition::TopCenter),
            "top-right" => Ok(WatermarkPosition::TopRight),
            "center" => Ok(WatermarkPosition::Center),
            "bottom-left" => Ok(WatermarkPosition::BottomLeft),
            "bottom-center" => Ok(WatermarkPosition::BottomCenter),
            "bottom-right" => Ok(WatermarkPosition::BottomRight),
            _ => Err(()),
        }
    }
}

impl Serialize for WatermarkPosition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Watermark font size for a surface: 5% of the larger dimension
pub fn font_size_for(dims: Dimensions) -> f32 {
    dims.max_side() as f32 * FONT_SCALE
}

/// Anchor point the watermark text is centered on.
///
/// Corners are inset `2×fontSize` horizontally and `1.5×fontSize` vertically;
/// edge-center anchors sit on the horizontal midline `1.5×fontSize` from the
/// edge; `center` is the geometric center of the surface.
pub fn anchor_point(
    position: WatermarkPosition,
    dims: Dimensions,
    font_size: f32,
) -> (f32, f32) {
    let w = dims.width as f32;
    let h = dims.height as f32;
    let inset_x = font_size * CORNER_INSET_X;
    let inset_y = font_size * CORNER_INSET_Y;

    match position {
        WatermarkPosition::TopLeft => (inset_x, inset_y),
        WatermarkPosition::TopCenter => (w / 2.0, inset_y),
        WatermarkPosition::TopRight => (w - inset_x, inset_y),
        WatermarkPosition::Center => (w / 2.0, h / 2.0),
        WatermarkPosition::BottomLeft => (inset_x, h - inset_y),
        WatermarkPosition::BottomCenter => (w / 2.0, h - inset_y),
        WatermarkPosition::BottomRight => (w - inset_x, h - inset_y),
    }
}

/// Alpha applied to a watermark pixel: the configured opacity scaled by the
/// glyph coverage. Full coverage yields the configured opacity exactly.
pub fn watermark_alpha(opacity: f32, coverage: u8) -> f32 {
    opacity * (coverage as f32 / 255.0)
}

/// Composite `text` onto an RGBA surface, centered on the configured anchor.
/// Empty text draws nothing. Pixels falling outside the surface are clipped.
pub fn draw_watermark(
    rgba: &mut [u8],
    dims: Dimensions,
    font: &WatermarkFont,
    text: &str,
    opacity: f32,
    position: WatermarkPosition,
) {
    if text.is_empty() {
        return;
    }

    let font_size = font_size_for(dims);
    let bitmap = font.rasterize(text, font_size);
    if bitmap.is_empty() {
        return;
    }

    let (anchor_x, anchor_y) = anchor_point(position, dims, font_size);
    let origin_x = (anchor_x - bitmap.width as f32 / 2.0).round() as i64;
    let origin_y = (anchor_y - bitmap.height as f32 / 2.0).round() as i64;

    let surf_w = dims.width as i64;
    let surf_h = dims.height as i64;

    for by in 0..bitmap.height {
        for bx in 0..bitmap.width {
            let coverage = bitmap.coverage[by * bitmap.width + bx];
            if coverage == 0 {
                continue;
            }

            let x = origin_x + bx as i64;
            let y = origin_y + by as i64;
            if x < 0 || y < 0 || x >= surf_w || y >= surf_h {
                continue;
            }

            let alpha = watermark_alpha(opacity, coverage);
            let idx = ((y as usize) * dims.width as usize + x as usize) * 4;
            // White text blended src-over; the surface stays opaque
            for channel in &mut rgba[idx..idx + 3] {
                let base = *channel as f32;
                *channel = (255.0 * alpha + base * (1.0 - alpha)).round() as u8;
            }
        }
    }
}
