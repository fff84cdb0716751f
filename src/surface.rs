//! Composited surface ownership
//!
//! The surface is the only image-like object ever handed to the display
//! layer: an exclusively owned RGBA buffer sized to the source image's
//! natural dimensions, with the watermark already baked in. The original
//! resource bytes are dropped after decode; nothing fetchable remains. The
//! obscured (blurred) variant used by the `Obscured` state is precomputed at
//! composition time so state transitions never re-render pixels.

use crate::constants::protection::{BLUR_PASSES, BLUR_RADIUS};
use crate::font::WatermarkFont;
use crate::loader::DecodedImage;
use crate::types::Dimensions;
use crate::watermark::{self, WatermarkPosition};

pub struct CompositedSurface {
    dims: Dimensions,
    rgba: Vec<u8>,
    obscured: Vec<u8>,
}

impl CompositedSurface {
    /// Build the surface from a decoded image: draw the image 1:1, composite
    /// the watermark (empty text draws nothing), then derive the blurred
    /// variant.
    pub fn compose(
        image: DecodedImage,
        font: &WatermarkFont,
        text: &str,
        opacity: f32,
        position: WatermarkPosition,
    ) -> Self {
        let dims = Dimensions::new(image.width, image.height);
        let mut rgba = image.rgba;

        watermark::draw_watermark(&mut rgba, dims, font, text, opacity, position);

        let obscured = box_blur(&rgba, dims, BLUR_RADIUS, BLUR_PASSES);

        Self {
            dims,
            rgba,
            obscured,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn obscured_pixels(&self) -> &[u8] {
        &self.obscured
    }
}

/// Separable box blur over an opaque RGBA buffer. Repeated passes push the
/// kernel toward gaussian; strong enough that the obscured surface carries
/// no recoverable detail at typical photo resolutions.
fn box_blur(rgba: &[u8], dims: Dimensions, radius: usize, passes: usize) -> Vec<u8> {
    let w = dims.width as usize;
    let h = dims.height as usize;
    if w == 0 || h == 0 || radius == 0 {
        return rgba.to_vec();
    }

    let mut current = rgba.to_vec();
    let mut scratch = vec![0u8; current.len()];

    for _ in 0..passes {
        blur_axis(&current, &mut scratch, w, h, radius, true);
        blur_axis(&scratch, &mut current, w, h, radius, false);
    }

    current
}

fn blur_axis(src: &[u8], dst: &mut [u8], w: usize, h: usize, radius: usize, horizontal: bool) {
    let (outer, inner) = if horizontal { (h, w) } else { (w, h) };

    let index = |line: usize, pos: usize| -> usize {
        if horizontal {
            (line * w + pos) * 4
        } else {
            (pos * w + line) * 4
        }
    };

    for line in 0..outer {
        for pos in 0..inner {
            let lo = pos.saturating_sub(radius);
            let hi = (pos + radius).min(inner - 1);
            let count = (hi - lo + 1) as u32;

            let mut acc = [0u32; 4];
            for sample in lo..=hi {
                let base = index(line, sample);
                for (channel, total) in acc.iter_mut().enumerate() {
                    *total += src[base + channel] as u32;
                }
            }

            let base = index(line, pos);
            for (channel, total) in acc.iter().enumerate() {
                dst[base + channel] = (total / count) as u8;
            }
        }
    }
}
