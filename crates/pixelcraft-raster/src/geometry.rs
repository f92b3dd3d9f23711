// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry engine: resize, crop, and rotate/flip via an affine map onto a
// canvas sized to the rotated bounding box.

use image::imageops::{self, FilterType};
use image::Rgba;
use pixelcraft_core::error::{PixelCraftError, Result};
use pixelcraft_core::{CropParams, Dimensions, Rect, ResizeMode, RotateParams};
use tracing::{debug, info, instrument};

use crate::codec::{PixelBuffer, dimensions};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// -- Resize -------------------------------------------------------------------

/// Compute the output size for a resize request.
///
/// With `keep_aspect` the image is fitted inside the requested box: when the
/// box is wider than the source aspect the height is kept and the width
/// derived, otherwise the width is kept and the height derived.
pub fn fit_dimensions(source: Dimensions, mode: ResizeMode) -> Result<Dimensions> {
    match mode {
        ResizeMode::Dimensions {
            width,
            height,
            keep_aspect,
        } => {
            if width == 0 || height == 0 {
                return Err(PixelCraftError::invalid(format!(
                    "resize target must be positive, got {width}x{height}"
                )));
            }
            if !keep_aspect {
                return Ok(Dimensions::new(width, height));
            }
            let aspect = source.aspect_ratio();
            let requested = width as f64 / height as f64;
            let fitted = if requested > aspect {
                Dimensions::new(round_dim(height as f64 * aspect), height)
            } else {
                Dimensions::new(width, round_dim(width as f64 / aspect))
            };
            Ok(fitted)
        }
        ResizeMode::Percentage { percent } => {
            if !percent.is_finite() || percent <= 0.0 {
                return Err(PixelCraftError::invalid(format!(
                    "resize percentage must be positive, got {percent}"
                )));
            }
            Ok(Dimensions::new(
                round_dim(source.width as f64 * percent / 100.0),
                round_dim(source.height as f64 * percent / 100.0),
            ))
        }
    }
}

fn round_dim(value: f64) -> u32 {
    value.round().clamp(1.0, u32::MAX as f64) as u32
}

/// Resample `buffer` to the size [`fit_dimensions`] computes, with Lanczos3.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn resize(buffer: &PixelBuffer, mode: ResizeMode) -> Result<PixelBuffer> {
    let target = fit_dimensions(dimensions(buffer), mode)?;
    info!(to = %target, "Resizing image");
    if target == dimensions(buffer) {
        return Ok(buffer.clone());
    }
    Ok(imageops::resize(
        buffer,
        target.width,
        target.height,
        FilterType::Lanczos3,
    ))
}

// -- Crop ---------------------------------------------------------------------

/// Clamp a user crop rectangle against the source bounds.
///
/// The origin is clamped to `[0, source - requested]` and the extent to what
/// remains right of and below the clamped origin. An empty result is an
/// [`PixelCraftError::InvalidParameter`].
pub fn clamp_crop(source: Dimensions, params: CropParams) -> Result<Rect> {
    let (x, width) = clamp_axis(params.x, params.width, source.width);
    let (y, height) = clamp_axis(params.y, params.height, source.height);
    if width == 0 || height == 0 {
        return Err(PixelCraftError::invalid(format!(
            "crop {}x{} at ({}, {}) leaves no pixels inside a {source} image",
            params.width, params.height, params.x, params.y
        )));
    }
    Ok(Rect::new(x, y, width, height))
}

fn clamp_axis(origin: i64, extent: i64, bound: u32) -> (u32, u32) {
    let bound = bound as i64;
    let wanted = extent.max(0);
    let start = origin.clamp(0, (bound - wanted).max(0));
    let length = wanted.min(bound - start);
    (start as u32, length as u32)
}

/// Copy the clamped crop region into a new buffer.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn crop(buffer: &PixelBuffer, params: CropParams) -> Result<PixelBuffer> {
    let rect = clamp_crop(dimensions(buffer), params)?;
    info!(x = rect.x, y = rect.y, w = rect.width, h = rect.height, "Cropping image");
    Ok(imageops::crop_imm(buffer, rect.x, rect.y, rect.width, rect.height).to_image())
}

// -- Affine transforms --------------------------------------------------------

/// A 2x3 affine matrix in canvas convention:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Clockwise rotation in image space (y grows downwards).
    pub fn rotate(radians: f64) -> Self {
        let (sin, cos) = snapped_sin_cos(radians);
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Matrix product `self * inner`: maps through `inner` first, then `self`.
    pub fn compose(self, inner: Affine) -> Self {
        Self {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Inverse map, or `None` for a singular matrix.
    pub fn invert(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Self {
            a,
            b,
            c,
            d,
            e: -(a * self.e + c * self.f),
            f: -(b * self.e + d * self.f),
        })
    }
}

/// sin/cos with values within rounding noise of 0 or +-1 snapped exactly,
/// so quarter turns produce exact bounds and pixel-exact output.
fn snapped_sin_cos(radians: f64) -> (f64, f64) {
    let snap = |v: f64| {
        for target in [-1.0, 0.0, 1.0] {
            if (v - target).abs() < 1e-12 {
                return target;
            }
        }
        v
    };
    let (sin, cos) = radians.sin_cos();
    (snap(sin), snap(cos))
}

// -- Rotate / flip ------------------------------------------------------------

/// Bounding box of a `source`-sized rectangle rotated by `angle_degrees`.
pub fn rotated_bounds(source: Dimensions, angle_degrees: f64) -> Dimensions {
    let (sin, cos) = snapped_sin_cos(angle_degrees.to_radians());
    let (w, h) = (source.width as f64, source.height as f64);
    let width = w * cos.abs() + h * sin.abs();
    let height = w * sin.abs() + h * cos.abs();
    Dimensions::new(ceil_dim(width), ceil_dim(height))
}

fn ceil_dim(value: f64) -> u32 {
    (value - 1e-9).ceil().clamp(1.0, u32::MAX as f64) as u32
}

/// Map from source to output coordinates:
/// translate to the output center, flip, rotate, translate the source center
/// to the origin.
pub fn rotation_matrix(source: Dimensions, output: Dimensions, params: &RotateParams) -> Affine {
    let flip_x = if params.flip_horizontal { -1.0 } else { 1.0 };
    let flip_y = if params.flip_vertical { -1.0 } else { 1.0 };
    Affine::translate(output.width as f64 / 2.0, output.height as f64 / 2.0)
        .compose(Affine::scale(flip_x, flip_y))
        .compose(Affine::rotate(params.angle_degrees.to_radians()))
        .compose(Affine::translate(
            -(source.width as f64) / 2.0,
            -(source.height as f64) / 2.0,
        ))
}

fn is_quarter_turn(angle_degrees: f64) -> bool {
    let turns = angle_degrees / 90.0;
    (turns - turns.round()).abs() < 1e-9
}

/// Rotate by an arbitrary angle and optionally flip, expanding the canvas to
/// the rotated bounds. Uncovered output pixels are transparent.
///
/// Quarter turns sample with nearest neighbour and are lossless; other angles
/// use bilinear sampling.
#[instrument(skip(buffer, params), fields(
    width = buffer.width(),
    height = buffer.height(),
    angle = params.angle_degrees,
    flip_h = params.flip_horizontal,
    flip_v = params.flip_vertical
))]
pub fn rotate_flip(buffer: &PixelBuffer, params: &RotateParams) -> Result<PixelBuffer> {
    if !params.angle_degrees.is_finite() {
        return Err(PixelCraftError::invalid("rotation angle must be finite"));
    }
    let source = dimensions(buffer);
    let output = rotated_bounds(source, params.angle_degrees);
    let inverse = rotation_matrix(source, output, params)
        .invert()
        .ok_or_else(|| PixelCraftError::invalid("rotation matrix is not invertible"))?;

    let nearest = is_quarter_turn(params.angle_degrees);
    info!(to = %output, nearest, "Rotating image");

    let rotated = PixelBuffer::from_fn(output.width, output.height, |x, y| {
        let (sx, sy) = inverse.apply(x as f64 + 0.5, y as f64 + 0.5);
        if nearest {
            sample_nearest(buffer, sx, sy)
        } else {
            sample_bilinear(buffer, sx - 0.5, sy - 0.5)
        }
    });
    debug!("Rotation complete");
    Ok(rotated)
}

fn sample_nearest(buffer: &PixelBuffer, x: f64, y: f64) -> Rgba<u8> {
    let (ix, iy) = (x.floor(), y.floor());
    if ix < 0.0 || iy < 0.0 || ix >= buffer.width() as f64 || iy >= buffer.height() as f64 {
        return TRANSPARENT;
    }
    *buffer.get_pixel(ix as u32, iy as u32)
}

/// Bilinear sample at continuous pixel coordinates, treating everything
/// outside the buffer as transparent. Interpolates premultiplied colour so
/// edges do not darken.
fn sample_bilinear(buffer: &PixelBuffer, x: f64, y: f64) -> Rgba<u8> {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (w, h) = (buffer.width() as i64, buffer.height() as i64);

    let mut acc = [0.0f64; 4];
    for (dx, dy, weight) in [
        (0, 0, (1.0 - fx) * (1.0 - fy)),
        (1, 0, fx * (1.0 - fy)),
        (0, 1, (1.0 - fx) * fy),
        (1, 1, fx * fy),
    ] {
        let px = x0 as i64 + dx;
        let py = y0 as i64 + dy;
        if weight == 0.0 || px < 0 || py < 0 || px >= w || py >= h {
            continue;
        }
        let [r, g, b, a] = buffer.get_pixel(px as u32, py as u32).0;
        let alpha = a as f64 * weight;
        acc[0] += r as f64 * alpha;
        acc[1] += g as f64 * alpha;
        acc[2] += b as f64 * alpha;
        acc[3] += alpha;
    }

    if acc[3] <= 0.0 {
        return TRANSPARENT;
    }
    let channel = |v: f64| (v / acc[3]).round().clamp(0.0, 255.0) as u8;
    Rgba([
        channel(acc[0]),
        channel(acc[1]),
        channel(acc[2]),
        acc[3].round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, ((x + y) * 3) as u8, 255])
        })
    }

    fn rotate(angle: f64, flip_h: bool, flip_v: bool) -> RotateParams {
        RotateParams {
            angle_degrees: angle,
            flip_horizontal: flip_h,
            flip_vertical: flip_v,
        }
    }

    #[test]
    fn keep_aspect_fits_inside_the_box() {
        let source = Dimensions::new(1000, 500);
        let mode = ResizeMode::Dimensions {
            width: 400,
            height: 400,
            keep_aspect: true,
        };
        assert_eq!(fit_dimensions(source, mode).unwrap(), Dimensions::new(400, 200));

        let tall = Dimensions::new(500, 1000);
        assert_eq!(fit_dimensions(tall, mode).unwrap(), Dimensions::new(200, 400));
    }

    #[test]
    fn keep_aspect_preserves_ratio_within_one_pixel() {
        let source = Dimensions::new(1920, 1080);
        let out = fit_dimensions(
            source,
            ResizeMode::Dimensions {
                width: 333,
                height: 777,
                keep_aspect: true,
            },
        )
        .unwrap();
        let expected_height = out.width as f64 / source.aspect_ratio();
        assert!((out.height as f64 - expected_height).abs() <= 1.0);
        assert!(out.width <= 333 && out.height <= 777);
    }

    #[test]
    fn stretch_and_percentage_modes() {
        let source = Dimensions::new(200, 100);
        let stretch = ResizeMode::Dimensions {
            width: 50,
            height: 70,
            keep_aspect: false,
        };
        assert_eq!(fit_dimensions(source, stretch).unwrap(), Dimensions::new(50, 70));
        let half = ResizeMode::Percentage { percent: 50.0 };
        assert_eq!(fit_dimensions(source, half).unwrap(), Dimensions::new(100, 50));
        assert!(fit_dimensions(source, ResizeMode::Percentage { percent: 0.0 }).is_err());
    }

    #[test]
    fn resize_produces_requested_size() {
        let out = resize(
            &gradient(20, 10),
            ResizeMode::Dimensions {
                width: 8,
                height: 8,
                keep_aspect: true,
            },
        )
        .unwrap();
        assert_eq!(dimensions(&out), Dimensions::new(8, 4));
    }

    #[test]
    fn crop_clamps_into_bounds() {
        let source = Dimensions::new(100, 80);
        let rect = clamp_crop(
            source,
            CropParams {
                x: 90,
                y: -5,
                width: 30,
                height: 200,
            },
        )
        .unwrap();
        assert_eq!(rect, Rect::new(70, 0, 30, 80));
        assert!(rect.right() <= source.width && rect.bottom() <= source.height);
    }

    #[test]
    fn empty_crop_is_rejected() {
        let err = clamp_crop(
            Dimensions::new(10, 10),
            CropParams {
                x: 0,
                y: 0,
                width: 0,
                height: 5,
            },
        )
        .unwrap_err();
        assert!(matches!(err, PixelCraftError::InvalidParameter(_)));
    }

    #[test]
    fn crop_copies_the_region() {
        let source = gradient(10, 10);
        let out = crop(
            &source,
            CropParams {
                x: 2,
                y: 3,
                width: 4,
                height: 5,
            },
        )
        .unwrap();
        assert_eq!(dimensions(&out), Dimensions::new(4, 5));
        assert_eq!(out.get_pixel(0, 0), source.get_pixel(2, 3));
        assert_eq!(out.get_pixel(3, 4), source.get_pixel(5, 7));
    }

    #[test]
    fn matrix_inverse_round_trips_points() {
        let m = rotation_matrix(
            Dimensions::new(30, 20),
            rotated_bounds(Dimensions::new(30, 20), 33.0),
            &rotate(33.0, true, false),
        );
        let inv = m.invert().unwrap();
        let (x, y) = m.apply(7.0, 11.0);
        let (bx, by) = inv.apply(x, y);
        assert!((bx - 7.0).abs() < 1e-9 && (by - 11.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_for_quarter_and_oblique_turns() {
        let source = Dimensions::new(40, 10);
        assert_eq!(rotated_bounds(source, 0.0), source);
        assert_eq!(rotated_bounds(source, 90.0), Dimensions::new(10, 40));
        assert_eq!(rotated_bounds(source, 180.0), source);
        assert_eq!(rotated_bounds(source, -270.0), Dimensions::new(10, 40));
        let oblique = rotated_bounds(Dimensions::new(10, 10), 45.0);
        assert_eq!(oblique, Dimensions::new(15, 15));
    }

    #[test]
    fn zero_rotation_is_pixel_identical() {
        let source = gradient(9, 6);
        let out = rotate_flip(&source, &rotate(0.0, false, false)).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn full_turns_keep_the_source_size() {
        let source = gradient(7, 3);
        for angle in [360.0, -360.0, 720.0] {
            assert_eq!(rotated_bounds(Dimensions::new(7, 3), angle), Dimensions::new(7, 3));
            let out = rotate_flip(&source, &rotate(angle, false, false)).unwrap();
            assert_eq!(out.dimensions(), (7, 3), "angle {angle}");
            assert_eq!(out, source, "angle {angle}");
        }
    }

    #[test]
    fn quarter_turn_matches_image_rotate90() {
        let source = gradient(7, 4);
        let out = rotate_flip(&source, &rotate(90.0, false, false)).unwrap();
        assert_eq!(out, imageops::rotate90(&source));
    }

    #[test]
    fn flips_match_imageops() {
        let source = gradient(5, 3);
        let h = rotate_flip(&source, &rotate(0.0, true, false)).unwrap();
        assert_eq!(h, imageops::flip_horizontal(&source));
        let v = rotate_flip(&source, &rotate(0.0, false, true)).unwrap();
        assert_eq!(v, imageops::flip_vertical(&source));
        let both = rotate_flip(&source, &rotate(180.0, true, true)).unwrap();
        assert_eq!(both, source);
    }

    #[test]
    fn oblique_rotation_leaves_transparent_corners() {
        let source = PixelBuffer::from_pixel(20, 20, Rgba([200, 10, 10, 255]));
        let out = rotate_flip(&source, &rotate(45.0, false, false)).unwrap();
        assert_eq!(dimensions(&out), Dimensions::new(29, 29));
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        let center = out.get_pixel(14, 14);
        assert_eq!(center.0, [200, 10, 10, 255]);
    }

    #[test]
    fn non_finite_angle_is_invalid() {
        let err = rotate_flip(&gradient(2, 2), &rotate(f64::NAN, false, false)).unwrap_err();
        assert!(matches!(err, PixelCraftError::InvalidParameter(_)));
    }
}
