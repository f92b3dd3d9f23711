// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Parameter validation. Runs before any file is decoded; a rejected request
// never touches pixel data.

use pixelcraft_core::error::{PixelCraftError, Result};
use pixelcraft_core::{
    CollageParams, Dimensions, MemeParams, PipelineConfig, ResizeMode, TextStyle,
    TransformRequest, WatermarkContent,
};

pub const MIN_UPSCALE_FACTOR: f32 = 1.0;
pub const MAX_UPSCALE_FACTOR: f32 = 8.0;

/// Reject out-of-range parameters for `request`. Output sizes that do not
/// depend on the source are checked against `config.max_output_pixels` here.
pub fn validate(request: &TransformRequest, config: &PipelineConfig) -> Result<()> {
    match request {
        TransformRequest::Compress(params) => check_quality(params.quality),
        TransformRequest::Convert(params) => params.quality.map_or(Ok(()), check_quality),
        TransformRequest::Resize(params) => match params.mode {
            ResizeMode::Dimensions { width, height, .. } => {
                if width == 0 || height == 0 {
                    return Err(PixelCraftError::invalid(format!(
                        "resize dimensions must be positive, got {width}x{height}"
                    )));
                }
                check_output_size(Dimensions::new(width, height), config)
            }
            ResizeMode::Percentage { percent } => {
                if !percent.is_finite() || percent <= 0.0 {
                    return Err(PixelCraftError::invalid(format!(
                        "resize percentage must be positive, got {percent}"
                    )));
                }
                Ok(())
            }
        },
        TransformRequest::Crop(params) => {
            if params.width <= 0 || params.height <= 0 {
                return Err(PixelCraftError::invalid(format!(
                    "crop area must be positive, got {}x{}",
                    params.width, params.height
                )));
            }
            Ok(())
        }
        TransformRequest::Rotate(params) => {
            if !params.angle_degrees.is_finite() {
                return Err(PixelCraftError::invalid("rotation angle must be a finite number"));
            }
            Ok(())
        }
        TransformRequest::Upscale(params) => {
            let factor = params.factor;
            if !factor.is_finite() || !(MIN_UPSCALE_FACTOR..=MAX_UPSCALE_FACTOR).contains(&factor) {
                return Err(PixelCraftError::invalid(format!(
                    "upscale factor must be between {MIN_UPSCALE_FACTOR} and {MAX_UPSCALE_FACTOR}, got {factor}"
                )));
            }
            Ok(())
        }
        TransformRequest::BackgroundRemove(params) => {
            if !(1..=100).contains(&params.tolerance) {
                return Err(PixelCraftError::invalid(format!(
                    "tolerance must be between 1 and 100, got {}",
                    params.tolerance
                )));
            }
            Ok(())
        }
        TransformRequest::Watermark(params) => {
            check_opacity(params.opacity)?;
            match &params.content {
                WatermarkContent::Text { text, style } => {
                    if text.trim().is_empty() {
                        return Err(PixelCraftError::invalid("watermark text is empty"));
                    }
                    check_style(style)
                }
                WatermarkContent::Image { source, scale } => {
                    if source.data.is_empty() {
                        return Err(PixelCraftError::invalid(format!(
                            "watermark image {:?} has no data",
                            source.original_name
                        )));
                    }
                    if let Some(scale) = scale {
                        if !scale.is_finite() || *scale <= 0.0 || *scale > 1.0 {
                            return Err(PixelCraftError::invalid(format!(
                                "watermark scale must be in (0, 1], got {scale}"
                            )));
                        }
                    }
                    Ok(())
                }
            }
        }
        TransformRequest::Collage(params) => check_collage(params, config),
        TransformRequest::Meme(params) => check_meme(params),
        TransformRequest::Adjust(params) => params.filters.validate(),
    }
}

fn check_quality(quality: u8) -> Result<()> {
    if quality > 100 {
        return Err(PixelCraftError::invalid(format!(
            "quality must be between 0 and 100, got {quality}"
        )));
    }
    Ok(())
}

fn check_opacity(opacity: f32) -> Result<()> {
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(PixelCraftError::invalid(format!(
            "opacity must be between 0 and 1, got {opacity}"
        )));
    }
    Ok(())
}

fn check_style(style: &TextStyle) -> Result<()> {
    if !style.size.is_finite() || style.size <= 0.0 {
        return Err(PixelCraftError::invalid(format!(
            "font size must be positive, got {}",
            style.size
        )));
    }
    if !style.stroke_width.is_finite() || style.stroke_width < 0.0 {
        return Err(PixelCraftError::invalid(format!(
            "stroke width must not be negative, got {}",
            style.stroke_width
        )));
    }
    Ok(())
}

/// Reject an output buffer larger than the configured pixel budget.
pub fn check_output_size(output: Dimensions, config: &PipelineConfig) -> Result<()> {
    if output.pixel_count() > config.max_output_pixels {
        return Err(PixelCraftError::invalid(format!(
            "output {output} exceeds the limit of {} pixels",
            config.max_output_pixels
        )));
    }
    Ok(())
}

fn check_collage(params: &CollageParams, config: &PipelineConfig) -> Result<()> {
    if params.output_width == 0 || params.output_height == 0 {
        return Err(PixelCraftError::invalid(format!(
            "collage size must be positive, got {}x{}",
            params.output_width, params.output_height
        )));
    }
    check_output_size(Dimensions::new(params.output_width, params.output_height), config)
}

fn check_meme(params: &MemeParams) -> Result<()> {
    check_style(&params.style)?;
    for (name, percent) in [
        ("top", params.top_anchor_percent),
        ("bottom", params.bottom_anchor_percent),
    ] {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(PixelCraftError::invalid(format!(
                "{name} text position must be between 0 and 100 percent, got {percent}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelcraft_core::{
        Anchor, BackgroundMethod, BackgroundParams, Color, CollageLayout, CompressParams,
        CropParams, ResizeParams, RotateParams, SourceAsset, UpscaleParams, WatermarkParams,
    };

    fn style() -> TextStyle {
        TextStyle {
            size: 24.0,
            color: Color::WHITE,
            stroke_color: None,
            stroke_width: 2.0,
        }
    }

    #[test]
    fn accepts_reasonable_requests() {
        let requests = [
            TransformRequest::Compress(CompressParams {
                quality: 0,
                format: None,
            }),
            TransformRequest::Resize(ResizeParams {
                mode: ResizeMode::Percentage { percent: 50.0 },
            }),
            TransformRequest::Crop(CropParams {
                x: -10,
                y: 5000,
                width: 10,
                height: 10,
            }),
            TransformRequest::Rotate(RotateParams {
                angle_degrees: -725.0,
                flip_horizontal: false,
                flip_vertical: true,
            }),
            TransformRequest::Upscale(UpscaleParams {
                factor: 8.0,
                method: Default::default(),
                sharpen: true,
            }),
        ];
        for request in &requests {
            assert!(validate(request, &PipelineConfig::default()).is_ok(), "{request:?}");
        }
    }

    #[test]
    fn rejects_non_positive_resize() {
        let request = TransformRequest::Resize(ResizeParams {
            mode: ResizeMode::Dimensions {
                width: 0,
                height: 100,
                keep_aspect: true,
            },
        });
        let err = validate(&request, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PixelCraftError::InvalidParameter(_)));
    }

    #[test]
    fn rejects_zero_area_crop() {
        let request = TransformRequest::Crop(CropParams {
            x: 0,
            y: 0,
            width: 10,
            height: 0,
        });
        assert!(validate(&request, &PipelineConfig::default()).is_err());
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        let bad = [
            TransformRequest::Compress(CompressParams {
                quality: 101,
                format: None,
            }),
            TransformRequest::Upscale(UpscaleParams {
                factor: 0.5,
                method: Default::default(),
                sharpen: false,
            }),
            TransformRequest::BackgroundRemove(BackgroundParams {
                method: BackgroundMethod::Color,
                color: Color::WHITE,
                tolerance: 0,
            }),
            TransformRequest::Rotate(RotateParams {
                angle_degrees: f64::INFINITY,
                flip_horizontal: false,
                flip_vertical: false,
            }),
        ];
        for request in &bad {
            assert!(validate(request, &PipelineConfig::default()).is_err(), "{request:?}");
        }
    }

    #[test]
    fn watermark_needs_text_and_sane_opacity() {
        let text = |text: &str, opacity: f32| {
            TransformRequest::Watermark(WatermarkParams {
                content: WatermarkContent::Text {
                    text: text.into(),
                    style: style(),
                },
                anchor: Anchor::BottomRight,
                opacity,
            })
        };
        assert!(validate(&text("(c) me", 0.5), &PipelineConfig::default()).is_ok());
        assert!(validate(&text("   ", 0.5), &PipelineConfig::default()).is_err());
        assert!(validate(&text("(c) me", 1.5), &PipelineConfig::default()).is_err());
    }

    #[test]
    fn image_watermark_needs_bytes() {
        let request = TransformRequest::Watermark(WatermarkParams {
            content: WatermarkContent::Image {
                source: SourceAsset::new(Vec::new(), "image/png", "logo.png"),
                scale: None,
            },
            anchor: Anchor::TopLeft,
            opacity: 1.0,
        });
        assert!(validate(&request, &PipelineConfig::default()).is_err());
    }

    #[test]
    fn collage_canvas_must_be_positive() {
        let request = TransformRequest::Collage(CollageParams {
            layout: CollageLayout::Grid3x3,
            background: Color::WHITE,
            spacing: 0,
            border: None,
            corner_radius: 0,
            output_width: 0,
            output_height: 600,
            format: None,
        });
        assert!(validate(&request, &PipelineConfig::default()).is_err());
    }

    #[test]
    fn fixed_output_sizes_are_bounded() {
        let config = PipelineConfig {
            max_output_pixels: 10_000,
            ..Default::default()
        };
        let resize = |width, height| {
            TransformRequest::Resize(ResizeParams {
                mode: ResizeMode::Dimensions {
                    width,
                    height,
                    keep_aspect: false,
                },
            })
        };
        assert!(validate(&resize(100, 100), &config).is_ok());
        assert!(validate(&resize(101, 100), &config).is_err());
        assert!(validate(&resize(u32::MAX, u32::MAX), &PipelineConfig::default()).is_err());

        let collage = TransformRequest::Collage(CollageParams {
            layout: CollageLayout::Grid2x2,
            background: Color::WHITE,
            spacing: 0,
            border: None,
            corner_radius: 0,
            output_width: u32::MAX,
            output_height: u32::MAX,
            format: None,
        });
        let err = validate(&collage, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PixelCraftError::InvalidParameter(_)));
    }

    #[test]
    fn output_size_limit_is_inclusive() {
        let config = PipelineConfig {
            max_output_pixels: 50,
            ..Default::default()
        };
        assert!(check_output_size(Dimensions::new(10, 5), &config).is_ok());
        assert!(check_output_size(Dimensions::new(10, 6), &config).is_err());
    }

    #[test]
    fn meme_anchor_percent_is_bounded() {
        let request = TransformRequest::Meme(MemeParams {
            top_text: "top".into(),
            bottom_text: String::new(),
            style: style(),
            top_anchor_percent: 120.0,
            bottom_anchor_percent: 90.0,
        });
        assert!(validate(&request, &PipelineConfig::default()).is_err());
    }
}
