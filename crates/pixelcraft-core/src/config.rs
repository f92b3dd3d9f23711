// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Tunables shared by every batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Uploads larger than this many bytes fail without being decoded.
    pub max_file_size: u64,
    /// Decoded images over this many pixels are rejected from the header.
    pub max_decoded_pixels: u64,
    /// Upper bound on the pixel count of any buffer a transform allocates.
    pub max_output_pixels: u64,
    /// Encoder quality used when a request does not name one.
    pub default_quality: u8,
    /// Distance in pixels between a watermark and the canvas edges.
    pub watermark_padding: u32,
    /// Horizontal margin subtracted from the canvas width when wrapping meme text.
    pub wrap_margin: u32,
    /// Line advance as a multiple of the font size.
    pub line_height: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50_000_000,
            max_decoded_pixels: 100_000_000,
            max_output_pixels: 100_000_000,
            default_quality: 90,
            watermark_padding: 20,
            wrap_margin: 40,
            line_height: 1.2,
        }
    }
}
