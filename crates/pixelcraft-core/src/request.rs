// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transform requests. One tagged variant per operation, carrying the
// parameters the user chose for a batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PixelCraftError;
use crate::filters::FilterChain;
use crate::types::{Anchor, Color, OutputFormat, ScaleMethod, SourceAsset};

/// The operation to run over every file in a batch.
///
/// Serialized as an internally tagged JSON object:
///
/// ```json
/// { "op": "resize", "mode": { "dimensions": { "width": 800, "height": 600, "keep_aspect": true } } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum TransformRequest {
    Compress(CompressParams),
    Resize(ResizeParams),
    Crop(CropParams),
    Rotate(RotateParams),
    Upscale(UpscaleParams),
    BackgroundRemove(BackgroundParams),
    Watermark(WatermarkParams),
    Collage(CollageParams),
    Meme(MemeParams),
    Convert(ConvertParams),
    Adjust(AdjustParams),
}

impl TransformRequest {
    /// Short operation name, used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compress(_) => "compress",
            Self::Resize(_) => "resize",
            Self::Crop(_) => "crop",
            Self::Rotate(_) => "rotate",
            Self::Upscale(_) => "upscale",
            Self::BackgroundRemove(_) => "background-remove",
            Self::Watermark(_) => "watermark",
            Self::Collage(_) => "collage",
            Self::Meme(_) => "meme",
            Self::Convert(_) => "convert",
            Self::Adjust(_) => "adjust",
        }
    }

    /// Suffix inserted before the extension of each output file name.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            Self::Compress(_) => "_compressed",
            Self::Resize(_) => "_resized",
            Self::Crop(_) => "_cropped",
            Self::Rotate(_) => "_rotated",
            Self::Upscale(_) => "_upscaled",
            Self::BackgroundRemove(_) => "_no_bg",
            Self::Watermark(_) => "_watermarked",
            Self::Collage(_) => "_collage",
            Self::Meme(_) => "_meme",
            Self::Convert(_) => "_converted",
            Self::Adjust(_) => "_edited",
        }
    }
}

// -- Compress / Convert -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressParams {
    /// Encoder quality, 0-100. Ignored by lossless formats.
    pub quality: u8,
    /// Re-encode into this format instead of the source format.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertParams {
    pub format: OutputFormat,
    #[serde(default)]
    pub quality: Option<u8>,
}

// -- Geometry -----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeParams {
    pub mode: ResizeMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeMode {
    /// Target box in pixels. With `keep_aspect` the image is fitted inside
    /// the box instead of stretched to it.
    Dimensions {
        width: u32,
        height: u32,
        keep_aspect: bool,
    },
    /// Scale both sides by the same percentage.
    Percentage { percent: f64 },
}

/// Crop rectangle as entered by the user. Values may be out of range; they
/// are clamped against the decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropParams {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotateParams {
    pub angle_degrees: f64,
    #[serde(default)]
    pub flip_horizontal: bool,
    #[serde(default)]
    pub flip_vertical: bool,
}

// -- Filters ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpscaleParams {
    pub factor: f32,
    #[serde(default)]
    pub method: ScaleMethod,
    #[serde(default)]
    pub sharpen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustParams {
    pub filters: FilterChain,
}

// -- Background removal -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMethod {
    /// Clear pixels close to a chosen color.
    Color,
    /// Clear a border band along all four edges.
    Edges,
    /// Fade pixels resembling the corner colors.
    Smart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundParams {
    pub method: BackgroundMethod,
    /// Target color for [`BackgroundMethod::Color`].
    #[serde(default = "default_background_color")]
    pub color: Color,
    /// 1-100. Doubles as edge sensitivity and smart threshold.
    pub tolerance: u8,
}

fn default_background_color() -> Color {
    Color::WHITE
}

// -- Text ---------------------------------------------------------------------

/// Fill/outline styling shared by watermark and meme text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    /// Outline color; defaults to the contrasting color of `color`.
    #[serde(default)]
    pub stroke_color: Option<Color>,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
}

fn default_stroke_width() -> f32 {
    2.0
}

impl TextStyle {
    pub fn outline_color(&self) -> Color {
        self.stroke_color.unwrap_or_else(|| self.color.contrasting())
    }
}

// -- Watermark ----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WatermarkContent {
    Text { text: String, style: TextStyle },
    Image {
        source: SourceAsset,
        /// Overlay width as a fraction of the canvas width; native size when absent.
        #[serde(default)]
        scale: Option<f32>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkParams {
    pub content: WatermarkContent,
    pub anchor: Anchor,
    /// Global alpha, 0.0-1.0.
    pub opacity: f32,
}

// -- Collage ------------------------------------------------------------------

/// Named collage layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CollageLayout {
    Grid2x2,
    Grid3x3,
    Grid4x4,
    Horizontal,
    Vertical,
    Mosaic,
    Magazine,
    Polaroid,
}

impl CollageLayout {
    pub const ALL: [CollageLayout; 8] = [
        Self::Grid2x2,
        Self::Grid3x3,
        Self::Grid4x4,
        Self::Horizontal,
        Self::Vertical,
        Self::Mosaic,
        Self::Magazine,
        Self::Polaroid,
    ];

    /// How many images the layout can place. Grids hold one image per cell.
    /// Strips stop at 6 so cells stay usable. Mosaic fills a 3x3 grid with a
    /// 2x2 featured block (1 + 5). Magazine has one featured cell plus a side
    /// stack of 4. Polaroid frames are laid out in at most a 3x3 grid.
    pub fn max_images(&self) -> usize {
        match self {
            Self::Grid2x2 => 4,
            Self::Grid3x3 => 9,
            Self::Grid4x4 => 16,
            Self::Horizontal | Self::Vertical => 6,
            Self::Mosaic => 6,
            Self::Magazine => 5,
            Self::Polaroid => 9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid2x2 => "grid-2x2",
            Self::Grid3x3 => "grid-3x3",
            Self::Grid4x4 => "grid-4x4",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Mosaic => "mosaic",
            Self::Magazine => "magazine",
            Self::Polaroid => "polaroid",
        }
    }
}

impl fmt::Display for CollageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollageLayout {
    type Err = PixelCraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|layout| layout.as_str() == s)
            .ok_or_else(|| PixelCraftError::UnsupportedOperation(format!("unknown collage layout {s:?}")))
    }
}

impl TryFrom<String> for CollageLayout {
    type Error = PixelCraftError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CollageLayout> for String {
    fn from(layout: CollageLayout) -> Self {
        layout.as_str().to_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBorder {
    pub width: u32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollageParams {
    pub layout: CollageLayout,
    pub background: Color,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub border: Option<CellBorder>,
    #[serde(default)]
    pub corner_radius: u32,
    pub output_width: u32,
    pub output_height: u32,
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

// -- Meme ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeParams {
    #[serde(default)]
    pub top_text: String,
    #[serde(default)]
    pub bottom_text: String,
    pub style: TextStyle,
    /// Vertical center of the top block, as a percent of canvas height.
    #[serde(default = "default_top_anchor")]
    pub top_anchor_percent: f32,
    /// Vertical center of the bottom block, as a percent of canvas height.
    #[serde(default = "default_bottom_anchor")]
    pub bottom_anchor_percent: f32,
}

fn default_top_anchor() -> f32 {
    10.0
}

fn default_bottom_anchor() -> f32 {
    90.0
}
