// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Meme captions: greedy word wrap and vertically centred text blocks.

use pixelcraft_core::MemeParams;
use tracing::{debug, instrument};

use super::text::{GlyphRenderer, draw_outlined_text};
use crate::codec::PixelBuffer;

/// Wrapped lines of the rendered top and bottom captions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemeLayout {
    pub top: Vec<String>,
    pub bottom: Vec<String>,
}

/// Greedy word wrap. A line is broken only when appending the next word
/// would push its measured width past `max_width`; a single word wider than
/// the limit stays on its own line.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut line = first.to_owned();
    for word in words {
        let candidate = format!("{line} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_owned()));
        } else {
            line = candidate;
        }
    }
    lines.push(line);
    lines
}

/// Top edge of a block of `lines` lines centred on `center_y`.
pub fn block_top(center_y: f32, lines: usize, line_height: f32) -> f32 {
    center_y - lines as f32 * line_height / 2.0
}

/// Draw the upper-cased top and bottom captions, each wrapped to the canvas
/// width minus `wrap_margin` and centred horizontally.
#[instrument(skip(buffer, params, renderer), fields(width = buffer.width(), height = buffer.height()))]
pub fn render_meme(
    buffer: &PixelBuffer,
    params: &MemeParams,
    renderer: &dyn GlyphRenderer,
    wrap_margin: u32,
    line_height: f32,
) -> (PixelBuffer, MemeLayout) {
    let style = &params.style;
    let max_width = buffer.width().saturating_sub(wrap_margin) as f32;
    let advance = style.size * line_height;
    let measure = |line: &str| renderer.measure(line, style.size).0 as f32;

    let layout = MemeLayout {
        top: wrap_text(&params.top_text.to_uppercase(), max_width, measure),
        bottom: wrap_text(&params.bottom_text.to_uppercase(), max_width, measure),
    };

    let mut out = buffer.clone();
    let height = buffer.height() as f32;
    for (lines, percent) in [
        (&layout.top, params.top_anchor_percent),
        (&layout.bottom, params.bottom_anchor_percent),
    ] {
        let top = block_top(height * percent / 100.0, lines.len(), advance);
        for (i, line) in lines.iter().enumerate() {
            let (text_w, text_h) = renderer.measure(line, style.size);
            let line_center = top + advance * (i as f32 + 0.5);
            let x = (buffer.width() as f32 - text_w as f32) / 2.0;
            let y = line_center - text_h as f32 / 2.0;
            draw_outlined_text(&mut out, renderer, line, x.round() as i32, y.round() as i32, style);
        }
    }
    debug!(
        top_lines = layout.top.len(),
        bottom_lines = layout.bottom.len(),
        "Meme captions drawn"
    );
    (out, layout)
}
