// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source-over alpha compositing on straight (non-premultiplied) RGBA.

use image::Rgba;
use pixelcraft_core::{Color, Rect};

use crate::codec::PixelBuffer;

/// Composite `src` over `dst` with an extra global `opacity` in 0.0-1.0.
pub fn blend_pixel(dst: &mut Rgba<u8>, src: Rgba<u8>, opacity: f32) {
    let src_alpha = src.0[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0);
    if src_alpha <= 0.0 {
        return;
    }
    let dst_alpha = dst.0[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    for channel in 0..3 {
        let s = src.0[channel] as f32;
        let d = dst.0[channel] as f32;
        let value = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        dst.0[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Draw `src` onto `dst` with its top-left corner at (`x`, `y`).
///
/// Parts falling outside `dst` are clipped; the offset may be negative.
pub fn draw_over(dst: &mut PixelBuffer, src: &PixelBuffer, x: i64, y: i64, opacity: f32) {
    let (dst_w, dst_h) = (dst.width() as i64, dst.height() as i64);
    for (sx, sy, pixel) in src.enumerate_pixels() {
        let tx = x + sx as i64;
        let ty = y + sy as i64;
        if tx < 0 || ty < 0 || tx >= dst_w || ty >= dst_h {
            continue;
        }
        blend_pixel(dst.get_pixel_mut(tx as u32, ty as u32), *pixel, opacity);
    }
}

/// Overwrite a rectangle with a solid colour, clipped to the buffer.
pub fn fill_rect(dst: &mut PixelBuffer, rect: Rect, color: Color) {
    let right = rect.right().min(dst.width());
    let bottom = rect.bottom().min(dst.height());
    let fill = Rgba(color.to_array());
    for y in rect.y..bottom {
        for x in rect.x..right {
            dst.put_pixel(x, y, fill);
        }
    }
}
