// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PixelCraft raster engine: codec seam, geometry, adjustment filters,
// background removal, and compositing over RGBA pixel buffers.

pub mod background;
pub mod codec;
pub mod compose;
pub mod filter;
pub mod geometry;

pub use background::remove_background;
pub use codec::{ImageCodec, ImageCrateCodec, PixelBuffer, dimensions};
pub use compose::collage::{CollagePlacement, compose_collage};
pub use compose::meme::{MemeLayout, render_meme};
pub use compose::text::{FontFace, GlyphRenderer};
pub use compose::watermark::{apply_image_watermark, apply_text_watermark};
pub use filter::{apply_filters, sharpen, upscale, upscaled_dimensions};
pub use geometry::{crop, fit_dimensions, resize, rotate_flip, rotated_bounds};
