// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text and image watermarks placed on the nine-point anchor grid.

use image::imageops::{self, FilterType};
use pixelcraft_core::{Align, Anchor, Dimensions, TextStyle};
use tracing::{debug, info, instrument};

use super::blend::draw_over;
use super::text::{GlyphRenderer, draw_outlined_text, stroke_radius};
use crate::codec::{PixelBuffer, dimensions};

/// Top-left position of an `item` anchored inside `canvas`.
///
/// Start-aligned axes sit `padding` pixels from the near edge, end-aligned
/// axes `padding` pixels from the far edge, middle axes are centred.
/// Items larger than the canvas yield negative offsets.
pub fn anchor_origin(anchor: Anchor, canvas: Dimensions, item: Dimensions, padding: u32) -> (i64, i64) {
    let (horizontal, vertical) = anchor.alignment();
    (
        axis_origin(horizontal, canvas.width, item.width, padding),
        axis_origin(vertical, canvas.height, item.height, padding),
    )
}

fn axis_origin(align: Align, canvas: u32, item: u32, padding: u32) -> i64 {
    let (canvas, item, padding) = (canvas as i64, item as i64, padding as i64);
    match align {
        Align::Start => padding,
        Align::Middle => (canvas - item) / 2,
        Align::End => canvas - item - padding,
    }
}

/// Stamp outlined `text` at `anchor` with global `opacity`.
///
/// The text is drawn onto its own transparent layer first so the opacity
/// applies to fill and outline together.
#[instrument(skip(buffer, renderer, style), fields(width = buffer.width(), height = buffer.height()))]
pub fn apply_text_watermark(
    buffer: &PixelBuffer,
    text: &str,
    style: &TextStyle,
    anchor: Anchor,
    opacity: f32,
    padding: u32,
    renderer: &dyn GlyphRenderer,
) -> PixelBuffer {
    let (text_w, text_h) = renderer.measure(text, style.size);
    let margin = stroke_radius(style).max(0) as u32;
    let item = Dimensions::new(text_w + 2 * margin, text_h + 2 * margin);

    let mut layer = PixelBuffer::new(item.width.max(1), item.height.max(1));
    draw_outlined_text(&mut layer, renderer, text, margin as i32, margin as i32, style);

    let (x, y) = anchor_origin(anchor, dimensions(buffer), item, padding);
    info!(x, y, ?anchor, "Placing text watermark");

    let mut out = buffer.clone();
    draw_over(&mut out, &layer, x, y, opacity);
    out
}

/// Composite an image watermark at `anchor` with global `opacity`.
///
/// With `scale` the overlay is resized to that fraction of the canvas width,
/// keeping its aspect ratio.
#[instrument(skip(buffer, mark), fields(width = buffer.width(), height = buffer.height()))]
pub fn apply_image_watermark(
    buffer: &PixelBuffer,
    mark: &PixelBuffer,
    scale: Option<f32>,
    anchor: Anchor,
    opacity: f32,
    padding: u32,
) -> PixelBuffer {
    let scaled;
    let overlay = match scale {
        Some(fraction) if fraction > 0.0 && mark.width() > 0 => {
            let target_w = ((buffer.width() as f32 * fraction).round() as u32).max(1);
            let target_h =
                ((mark.height() as f64 * target_w as f64 / mark.width() as f64).round() as u32).max(1);
            debug!(target_w, target_h, "Scaling watermark image");
            scaled = imageops::resize(mark, target_w, target_h, FilterType::Lanczos3);
            &scaled
        }
        _ => mark,
    };

    let (x, y) = anchor_origin(anchor, dimensions(buffer), dimensions(overlay), padding);
    info!(x, y, ?anchor, "Placing image watermark");

    let mut out = buffer.clone();
    draw_over(&mut out, overlay, x, y, opacity);
    out
}

#[cfg(test)]
mod tests {
    use super::super::text::testing::BlockGlyphs;
    use super::*;
    use image::Rgba;
    use pixelcraft_core::Color;

    #[test]
    fn corner_anchors_respect_padding() {
        let canvas = Dimensions::new(200, 100);
        let item = Dimensions::new(50, 20);
        assert_eq!(anchor_origin(Anchor::TopLeft, canvas, item, 20), (20, 20));
        assert_eq!(anchor_origin(Anchor::BottomRight, canvas, item, 20), (130, 60));
        assert_eq!(anchor_origin(Anchor::Center, canvas, item, 20), (75, 40));
        assert_eq!(anchor_origin(Anchor::TopCenter, canvas, item, 20), (75, 20));
        assert_eq!(anchor_origin(Anchor::CenterRight, canvas, item, 20), (130, 40));
    }

    #[test]
    fn every_anchor_keeps_a_small_item_inside() {
        let canvas = Dimensions::new(300, 300);
        let item = Dimensions::new(40, 40);
        for anchor in Anchor::ALL {
            let (x, y) = anchor_origin(anchor, canvas, item, 20);
            assert!(x >= 0 && y >= 0, "{anchor:?}");
            assert!(x + 40 <= 300 && y + 40 <= 300, "{anchor:?}");
        }
    }

    #[test]
    fn image_watermark_at_full_opacity_replaces_pixels() {
        let base = PixelBuffer::from_pixel(50, 50, Rgba([0, 0, 0, 255]));
        let mark = PixelBuffer::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let out = apply_image_watermark(&base, &mark, None, Anchor::BottomRight, 1.0, 5);
        assert_eq!(out.get_pixel(40, 40).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(34, 34).0, [0, 0, 0, 255]);
        assert_eq!(out.dimensions(), base.dimensions());
    }

    #[test]
    fn image_watermark_scale_is_relative_to_canvas_width() {
        let base = PixelBuffer::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let mark = PixelBuffer::from_pixel(10, 5, Rgba([255, 255, 255, 255]));
        let out = apply_image_watermark(&base, &mark, Some(0.5), Anchor::TopLeft, 1.0, 0);
        assert_eq!(out.get_pixel(49, 24).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(49, 26).0, [0, 0, 0, 255]);
        assert_eq!(out.get_pixel(51, 10).0, [0, 0, 0, 255]);
    }

    #[test]
    fn zero_opacity_watermark_changes_nothing() {
        let base = PixelBuffer::from_pixel(30, 30, Rgba([9, 9, 9, 255]));
        let style = TextStyle {
            size: 8.0,
            color: Color::WHITE,
            stroke_color: None,
            stroke_width: 2.0,
        };
        let out = apply_text_watermark(&base, "hi", &style, Anchor::Center, 0.0, 4, &BlockGlyphs);
        assert_eq!(out, base);
    }

    #[test]
    fn text_watermark_lands_in_the_anchored_corner() {
        let base = PixelBuffer::from_pixel(60, 40, Rgba([0, 0, 255, 255]));
        let style = TextStyle {
            size: 10.0,
            color: Color::WHITE,
            stroke_color: None,
            stroke_width: 0.0,
        };
        let out = apply_text_watermark(&base, "AB", &style, Anchor::TopLeft, 1.0, 2, &BlockGlyphs);
        // "AB" is 10x10 at (2, 2).
        assert_eq!(out.get_pixel(3, 3).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(50, 30).0, [0, 0, 255, 255]);
    }
}
