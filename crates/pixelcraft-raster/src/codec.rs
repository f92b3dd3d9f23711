// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PixelBuffer codec. Turns uploaded blobs into RGBA buffers and back.
// The host's decode/encode capability sits behind the `ImageCodec` trait so
// the transforms never touch a concrete codec.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use pixelcraft_core::error::{PixelCraftError, Result};
use pixelcraft_core::{Dimensions, OutputFormat, PipelineConfig};
use tracing::{debug, instrument};

/// A decoded raster: flat RGBA8, row-major, origin top-left.
pub type PixelBuffer = RgbaImage;

/// Dimensions of a buffer as the shared core type.
pub fn dimensions(buffer: &PixelBuffer) -> Dimensions {
    Dimensions::new(buffer.width(), buffer.height())
}

/// Decode and encode capability provided by the host environment.
pub trait ImageCodec {
    /// Decode an encoded blob into an RGBA buffer.
    ///
    /// Fails with [`PixelCraftError::Decode`] on unsupported or corrupt input.
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer>;

    /// Encode a buffer into `format`. `quality` (0-100) applies to lossy formats.
    ///
    /// Fails with [`PixelCraftError::Encode`] if the format cannot be produced.
    fn encode(&self, buffer: &PixelBuffer, format: OutputFormat, quality: u8) -> Result<Vec<u8>>;
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct ImageCrateCodec {
    /// Header dimensions above this pixel count are refused before decoding.
    max_decoded_pixels: u64,
}

impl ImageCrateCodec {
    pub fn new(max_decoded_pixels: u64) -> Self {
        Self { max_decoded_pixels }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_decoded_pixels)
    }

    /// Read width and height from the header without decoding pixel data.
    fn probe_dimensions(data: &[u8]) -> Result<(u32, u32)> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| PixelCraftError::Decode(format!("unrecognised image data: {err}")))?
            .into_dimensions()
            .map_err(|err| PixelCraftError::Decode(format!("unreadable image header: {err}")))
    }
}

impl Default for ImageCrateCodec {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl ImageCodec for ImageCrateCodec {
    #[instrument(skip_all, fields(data_len = data.len()))]
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        let (width, height) = Self::probe_dimensions(data)?;
        if width == 0 || height == 0 {
            return Err(PixelCraftError::Decode("image has no pixels".into()));
        }
        let pixels = width as u64 * height as u64;
        if pixels > self.max_decoded_pixels {
            return Err(PixelCraftError::Decode(format!(
                "{width}x{height} exceeds the {} pixel limit",
                self.max_decoded_pixels
            )));
        }

        let image = image::load_from_memory(data)
            .map_err(|err| PixelCraftError::Decode(format!("failed to decode image: {err}")))?;
        debug!(width, height, "Image decoded from bytes");
        Ok(image.into_rgba8())
    }

    #[instrument(skip(self, buffer), fields(width = buffer.width(), height = buffer.height()))]
    fn encode(&self, buffer: &PixelBuffer, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel; drop it.
                let rgb = DynamicImage::ImageRgba8(buffer.clone()).to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
                rgb.write_with_encoder(encoder)
                    .map_err(|err| PixelCraftError::Encode(format!("JPEG encoding failed: {err}")))?;
            }
            OutputFormat::Png | OutputFormat::Webp | OutputFormat::Gif | OutputFormat::Bmp => {
                buffer
                    .write_to(&mut Cursor::new(&mut out), image_format(format))
                    .map_err(|err| {
                        PixelCraftError::Encode(format!("{} encoding failed: {err}", format.extension()))
                    })?;
            }
        }
        debug!(bytes = out.len(), format = format.extension(), "Image encoded");
        Ok(out)
    }
}

fn image_format(format: OutputFormat) -> ImageFormat {
    match format {
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Jpeg => ImageFormat::Jpeg,
        OutputFormat::Webp => ImageFormat::WebP,
        OutputFormat::Gif => ImageFormat::Gif,
        OutputFormat::Bmp => ImageFormat::Bmp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checkerboard(width: u32, height: u32) -> PixelBuffer {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 128])
            }
        })
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let codec = ImageCrateCodec::default();
        let source = checkerboard(7, 5);
        let bytes = codec.encode(&source, OutputFormat::Png, 100).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, source);
    }

    #[test]
    fn jpeg_round_trip_preserves_dimensions() {
        let codec = ImageCrateCodec::default();
        let source = checkerboard(33, 17);
        let bytes = codec.encode(&source, OutputFormat::Jpeg, 100).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(dimensions(&decoded), Dimensions::new(33, 17));
        // Alpha is gone after a JPEG trip.
        assert!(decoded.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn every_output_format_encodes() {
        let codec = ImageCrateCodec::default();
        let source = checkerboard(4, 4);
        for format in [
            OutputFormat::Png,
            OutputFormat::Jpeg,
            OutputFormat::Webp,
            OutputFormat::Gif,
            OutputFormat::Bmp,
        ] {
            let bytes = codec.encode(&source, format, 80).unwrap();
            let decoded = codec.decode(&bytes).unwrap();
            assert_eq!(dimensions(&decoded), Dimensions::new(4, 4), "{format:?}");
        }
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let codec = ImageCrateCodec::default();
        let err = codec.decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PixelCraftError::Decode(_)));
    }

    #[test]
    fn pixel_limit_is_enforced_from_the_header() {
        let bytes = ImageCrateCodec::default()
            .encode(&checkerboard(20, 20), OutputFormat::Png, 100)
            .unwrap();
        let strict = ImageCrateCodec::new(100);
        let err = strict.decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("pixel limit"));
    }
}
