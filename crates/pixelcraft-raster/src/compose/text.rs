// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text rendering seam. Font rasterisation is the host's job; compositing
// code only sees the `GlyphRenderer` trait.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::Rgba;
use imageproc::drawing::{draw_text_mut, text_size};
use pixelcraft_core::error::{PixelCraftError, Result};
use pixelcraft_core::{Color, TextStyle};
use tracing::{debug, instrument};

use crate::codec::PixelBuffer;

/// Measures and draws single lines of text.
pub trait GlyphRenderer {
    /// Pixel width and height of `text` at font size `size`.
    fn measure(&self, text: &str, size: f32) -> (u32, u32);

    /// Draw `text` filled with `color`, top-left corner at (`x`, `y`).
    fn draw(&self, canvas: &mut PixelBuffer, text: &str, x: i32, y: i32, size: f32, color: Color);
}

/// A TrueType/OpenType face rendered through `imageproc`.
pub struct FontFace {
    font: FontVec,
}

impl FontFace {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(data)
            .map_err(|err| PixelCraftError::Font(format!("invalid font data: {err}")))?;
        Ok(Self { font })
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        debug!(bytes = data.len(), "Font file read");
        Self::from_bytes(data)
    }
}

impl GlyphRenderer for FontFace {
    fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, text)
    }

    fn draw(&self, canvas: &mut PixelBuffer, text: &str, x: i32, y: i32, size: f32, color: Color) {
        draw_text_mut(
            canvas,
            Rgba(color.to_array()),
            x,
            y,
            PxScale::from(size),
            &self.font,
            text,
        );
    }
}

/// Outline radius in whole pixels for a style's stroke width.
pub fn stroke_radius(style: &TextStyle) -> i32 {
    if style.stroke_width > 0.0 {
        (style.stroke_width / 2.0).ceil() as i32
    } else {
        0
    }
}

/// Draw a line of text with an outline: the stroke colour is stamped at
/// every offset within the stroke radius, then the fill goes on top.
pub fn draw_outlined_text(
    canvas: &mut PixelBuffer,
    renderer: &dyn GlyphRenderer,
    text: &str,
    x: i32,
    y: i32,
    style: &TextStyle,
) {
    let radius = stroke_radius(style);
    if radius > 0 {
        let outline = style.outline_color();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if (dx, dy) == (0, 0) || dx * dx + dy * dy > radius * radius {
                    continue;
                }
                renderer.draw(canvas, text, x + dx, y + dy, style.size, outline);
            }
        }
    }
    renderer.draw(canvas, text, x, y, style.size, style.color);
}
