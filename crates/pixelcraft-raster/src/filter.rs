// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-pixel adjustment filters, the 3x3 sharpen kernel, and upscaling.

use image::imageops::{self, FilterType};
use image::Rgba;
use imageproc::filter::gaussian_blur_f32;
use pixelcraft_core::error::{PixelCraftError, Result};
use pixelcraft_core::{Dimensions, FilterChain, ScaleMethod};
use tracing::{debug, info, instrument};

use crate::codec::{PixelBuffer, dimensions};

type Mat3 = [[f32; 3]; 3];

/// One colour step of a filter chain, evaluated on normalised RGB.
#[derive(Debug, Clone, Copy)]
enum ColorStep {
    /// `v * slope + intercept` on every channel.
    Linear { slope: f32, intercept: f32 },
    Matrix(Mat3),
}

impl ColorStep {
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = match self {
            Self::Linear { slope, intercept } => rgb.map(|v| v * slope + intercept),
            Self::Matrix(m) => [0, 1, 2].map(|row| {
                m[row][0] * rgb[0] + m[row][1] * rgb[1] + m[row][2] * rgb[2]
            }),
        };
        out.map(|v| v.clamp(0.0, 1.0))
    }
}

fn saturate_matrix(s: f32) -> Mat3 {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_matrix(degrees: f32) -> Mat3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

fn grayscale_matrix(amount: f32) -> Mat3 {
    let g = 1.0 - amount;
    [
        [0.2126 + 0.7874 * g, 0.7152 - 0.7152 * g, 0.0722 - 0.0722 * g],
        [0.2126 - 0.2126 * g, 0.7152 + 0.2848 * g, 0.0722 - 0.0722 * g],
        [0.2126 - 0.2126 * g, 0.7152 - 0.7152 * g, 0.0722 + 0.9278 * g],
    ]
}

fn sepia_matrix(amount: f32) -> Mat3 {
    let g = 1.0 - amount;
    [
        [0.393 + 0.607 * g, 0.769 - 0.769 * g, 0.189 - 0.189 * g],
        [0.349 - 0.349 * g, 0.686 + 0.314 * g, 0.168 - 0.168 * g],
        [0.272 - 0.272 * g, 0.534 - 0.534 * g, 0.131 + 0.869 * g],
    ]
}

/// Translate a chain into ordered colour steps, skipping identity entries.
fn color_steps(chain: &FilterChain) -> Vec<ColorStep> {
    let mut steps = Vec::new();
    if chain.brightness != 0.0 {
        steps.push(ColorStep::Linear {
            slope: 1.0 + chain.brightness / 100.0,
            intercept: 0.0,
        });
    }
    if chain.contrast != 0.0 {
        let c = 1.0 + chain.contrast / 100.0;
        steps.push(ColorStep::Linear {
            slope: c,
            intercept: 0.5 * (1.0 - c),
        });
    }
    if chain.saturation != 0.0 {
        steps.push(ColorStep::Matrix(saturate_matrix(1.0 + chain.saturation / 100.0)));
    }
    if chain.hue % 360.0 != 0.0 {
        steps.push(ColorStep::Matrix(hue_matrix(chain.hue)));
    }
    if chain.grayscale > 0.0 {
        steps.push(ColorStep::Matrix(grayscale_matrix(chain.grayscale / 100.0)));
    }
    if chain.sepia > 0.0 {
        steps.push(ColorStep::Matrix(sepia_matrix(chain.sepia / 100.0)));
    }
    if chain.invert > 0.0 {
        let amount = chain.invert / 100.0;
        steps.push(ColorStep::Linear {
            slope: 1.0 - 2.0 * amount,
            intercept: amount,
        });
    }
    steps
}

/// Apply an adjustment chain. Blur runs first, then the colour steps in
/// brightness, contrast, saturate, hue, grayscale, sepia, invert order.
/// Alpha is never touched by the colour steps.
#[instrument(skip(buffer, chain), fields(width = buffer.width(), height = buffer.height(), filters = %chain))]
pub fn apply_filters(buffer: &PixelBuffer, chain: &FilterChain) -> PixelBuffer {
    if chain.is_identity() {
        debug!("Identity filter chain, copying buffer");
        return buffer.clone();
    }
    info!("Applying filter chain");

    let mut out = if chain.blur > 0.0 {
        gaussian_blur_f32(buffer, chain.blur)
    } else {
        buffer.clone()
    };

    let steps = color_steps(chain);
    if steps.is_empty() {
        return out;
    }
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let mut rgb = [r, g, b].map(|c| c as f32 / 255.0);
        for step in &steps {
            rgb = step.apply(rgb);
        }
        let [r, g, b] = rgb.map(|c| (c * 255.0).round() as u8);
        *pixel = Rgba([r, g, b, a]);
    }
    out
}

// -- Sharpen ------------------------------------------------------------------

const SHARPEN_KERNEL: [[i32; 3]; 3] = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];

/// Convolve the RGB channels with a 3x3 sharpen kernel.
///
/// The one-pixel border and the alpha channel are copied unchanged.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn sharpen(buffer: &PixelBuffer) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    let mut out = buffer.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = [0i32; 3];
            for (ky, row) in SHARPEN_KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    if *weight == 0 {
                        continue;
                    }
                    let src = buffer.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1);
                    for (channel, sum) in acc.iter_mut().enumerate() {
                        *sum += weight * src.0[channel] as i32;
                    }
                }
            }
            let alpha = buffer.get_pixel(x, y).0[3];
            let [r, g, b] = acc.map(|v| v.clamp(0, 255) as u8);
            out.put_pixel(x, y, Rgba([r, g, b, alpha]));
        }
    }
    out
}

// -- Upscale ------------------------------------------------------------------

fn filter_type(method: ScaleMethod) -> FilterType {
    match method {
        ScaleMethod::Nearest => FilterType::Nearest,
        ScaleMethod::Bilinear => FilterType::Triangle,
        ScaleMethod::Bicubic => FilterType::CatmullRom,
    }
}

/// Enlarge by `factor` with the chosen resampling method, optionally
/// sharpening the result.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn upscale(
    buffer: &PixelBuffer,
    factor: f32,
    method: ScaleMethod,
    sharpen_after: bool,
) -> Result<PixelBuffer> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(PixelCraftError::invalid(format!(
            "upscale factor must be positive, got {factor}"
        )));
    }
    let target = upscaled_dimensions(dimensions(buffer), factor);
    info!(to = %target, ?method, "Upscaling image");

    let resized = imageops::resize(buffer, target.width, target.height, filter_type(method));
    Ok(if sharpen_after {
        sharpen(&resized)
    } else {
        resized
    })
}

/// Output size of an upscale by `factor`, each side rounded and at least 1.
pub fn upscaled_dimensions(source: Dimensions, factor: f32) -> Dimensions {
    Dimensions::new(scaled(source.width, factor), scaled(source.height, factor))
}

fn scaled(dim: u32, factor: f32) -> u32 {
    (dim as f64 * factor as f64).round().clamp(1.0, u32::MAX as f64) as u32
}
