// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Heuristic background removal. Three methods, all of which only ever lower
// alpha: colour-distance keying, an edge band, and corner-colour fading.

use image::Rgba;
use pixelcraft_core::{BackgroundMethod, BackgroundParams, Color};
use tracing::{info, instrument};

use crate::codec::PixelBuffer;

/// Tolerance is a percentage; this maps 100% onto the RGB cube diagonal
/// (sqrt(3 * 255^2) ~= 441.67).
pub const DISTANCE_PER_PERCENT: f64 = 4.41;

/// Alpha subtracted per matching corner by the smart method.
pub const SMART_ALPHA_STEP: u8 = 128;

/// Euclidean distance between two colours in RGB space, ignoring alpha.
pub fn color_distance(pixel: &Rgba<u8>, target: [u8; 3]) -> f64 {
    let [r, g, b, _] = pixel.0;
    let dr = r as f64 - target[0] as f64;
    let dg = g as f64 - target[1] as f64;
    let db = b as f64 - target[2] as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Lower alpha on background-looking pixels.
///
/// Returns the new buffer and how many pixels had their alpha lowered.
/// Dimensions and RGB values are untouched.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn remove_background(buffer: &PixelBuffer, params: &BackgroundParams) -> (PixelBuffer, u64) {
    let mut out = buffer.clone();
    let affected = match params.method {
        BackgroundMethod::Color => remove_color(&mut out, params.color, params.tolerance),
        BackgroundMethod::Edges => remove_edges(&mut out, params.tolerance),
        BackgroundMethod::Smart => remove_smart(&mut out, params.tolerance),
    };
    info!(method = ?params.method, affected, "Background removal complete");
    (out, affected)
}

/// Clear every pixel within `tolerance * 4.41` of `target`.
fn remove_color(buffer: &mut PixelBuffer, target: Color, tolerance: u8) -> u64 {
    let threshold = tolerance as f64 * DISTANCE_PER_PERCENT;
    let target = [target.r, target.g, target.b];
    let mut affected = 0;
    for pixel in buffer.pixels_mut() {
        if color_distance(pixel, target) < threshold {
            if pixel.0[3] != 0 {
                affected += 1;
            }
            pixel.0[3] = 0;
        }
    }
    affected
}

/// Clear a band `sensitivity / 10` pixels wide along all four edges.
fn remove_edges(buffer: &mut PixelBuffer, sensitivity: u8) -> u64 {
    let band = sensitivity as f64 / 10.0;
    let (width, height) = (buffer.width() as f64, buffer.height() as f64);
    let mut affected = 0;
    for (x, y, pixel) in buffer.enumerate_pixels_mut() {
        let (x, y) = (x as f64, y as f64);
        let in_band = x < band || y < band || x > width - band || y > height - band;
        if in_band {
            if pixel.0[3] != 0 {
                affected += 1;
            }
            pixel.0[3] = 0;
        }
    }
    affected
}

/// Sample the first and last pixel as background references. For each
/// reference in turn, pixels closer than `threshold * 2` lose
/// [`SMART_ALPHA_STEP`] of alpha, so a pixel matching both ends up clear.
fn remove_smart(buffer: &mut PixelBuffer, threshold: u8) -> u64 {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return 0;
    }
    let first = buffer.get_pixel(0, 0).0;
    let last = buffer.get_pixel(width - 1, height - 1).0;
    let corners = [[first[0], first[1], first[2]], [last[0], last[1], last[2]]];
    let limit = threshold as f64 * 2.0;

    let mut affected = 0;
    for pixel in buffer.pixels_mut() {
        let original = pixel.0[3];
        for corner in corners {
            if color_distance(pixel, corner) < limit {
                pixel.0[3] = pixel.0[3].saturating_sub(SMART_ALPHA_STEP);
            }
        }
        if pixel.0[3] < original {
            affected += 1;
        }
    }
    affected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(method: BackgroundMethod, color: Color, tolerance: u8) -> BackgroundParams {
        BackgroundParams {
            method,
            color,
            tolerance,
        }
    }

    /// White field with a black 4x4 square in the middle.
    fn subject_on_white() -> PixelBuffer {
        PixelBuffer::from_fn(10, 10, |x, y| {
            if (3..7).contains(&x) && (3..7).contains(&y) {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    #[test]
    fn color_key_clears_matching_pixels_only() {
        let source = subject_on_white();
        let (out, affected) =
            remove_background(&source, &params(BackgroundMethod::Color, Color::WHITE, 10));
        assert_eq!(affected, 84);
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 0]);
        assert_eq!(out.get_pixel(5, 5).0, [0, 0, 0, 255]);
        assert_eq!(out.dimensions(), source.dimensions());
    }

    #[test]
    fn color_key_never_reaches_the_opposite_corner_of_the_cube() {
        let source = PixelBuffer::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        let (out, affected) =
            remove_background(&source, &params(BackgroundMethod::Color, Color::WHITE, 99));
        assert_eq!(affected, 0);
        assert_eq!(out, source);
    }

    #[test]
    fn edge_band_clears_border_pixels() {
        let source = PixelBuffer::from_pixel(20, 20, Rgba([10, 20, 30, 255]));
        let (out, _) = remove_background(&source, &params(BackgroundMethod::Edges, Color::WHITE, 30));
        // band = 3px
        assert_eq!(out.get_pixel(2, 10).0[3], 0);
        assert_eq!(out.get_pixel(3, 10).0[3], 255);
        assert_eq!(out.get_pixel(10, 17).0[3], 255);
        assert_eq!(out.get_pixel(10, 18).0[3], 0);
        assert_eq!(out.get_pixel(10, 10).0[3], 255);
    }

    #[test]
    fn smart_fades_by_corner_match_count() {
        let mut source = PixelBuffer::from_pixel(4, 4, Rgba([100, 100, 100, 255]));
        // Bottom-right reference differs from the top-left one.
        source.put_pixel(3, 3, Rgba([200, 0, 0, 255]));
        source.put_pixel(1, 1, Rgba([0, 0, 255, 255]));

        let (out, affected) = remove_background(&source, &params(BackgroundMethod::Smart, Color::WHITE, 20));
        assert_eq!(out.get_pixel(0, 0).0[3], 127);
        assert_eq!(out.get_pixel(3, 3).0[3], 127);
        assert_eq!(out.get_pixel(1, 1).0[3], 255);
        assert_eq!(affected, 15);
    }

    #[test]
    fn smart_clears_pixels_matching_both_corners() {
        let source = PixelBuffer::from_pixel(3, 3, Rgba([50, 60, 70, 255]));
        let (out, affected) = remove_background(&source, &params(BackgroundMethod::Smart, Color::WHITE, 5));
        assert!(out.pixels().all(|p| p.0[3] == 0));
        assert_eq!(affected, 9);
    }

    #[test]
    fn alpha_is_monotone_and_rgb_untouched() {
        let source = PixelBuffer::from_fn(8, 8, |x, y| Rgba([(x * 30) as u8, (y * 30) as u8, 128, 200]));
        for method in [BackgroundMethod::Color, BackgroundMethod::Edges, BackgroundMethod::Smart] {
            let (out, _) = remove_background(&source, &params(method, Color::rgb(0, 0, 128), 40));
            for (before, after) in source.pixels().zip(out.pixels()) {
                assert!(after.0[3] <= before.0[3]);
                assert_eq!(before.0[..3], after.0[..3]);
            }
        }
    }
}
