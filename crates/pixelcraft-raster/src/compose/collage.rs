// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collage layout and rendering. Every layout resolves to a list of cell
// rectangles; each image is aspect-fill cropped into its cell.

use image::imageops::{self, FilterType};
use image::Rgba;
use pixelcraft_core::error::{PixelCraftError, Result};
use pixelcraft_core::{CellBorder, CollageLayout, CollageParams, Color, Dimensions, Rect};
use tracing::{debug, info, instrument, warn};

use super::blend::{blend_pixel, fill_rect};
use crate::codec::{PixelBuffer, dimensions};

/// How many images made it into the collage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollagePlacement {
    pub placed: usize,
    pub dropped: usize,
}

// -- Layout -------------------------------------------------------------------

/// Cell rectangles for `count` images. Images beyond the layout's capacity
/// get no cell. Cells never overlap and always lie inside the canvas.
pub fn layout_cells(
    layout: CollageLayout,
    count: usize,
    canvas: Dimensions,
    spacing: u32,
) -> Result<Vec<Rect>> {
    let n = count.min(layout.max_images());
    if n == 0 {
        return Ok(Vec::new());
    }

    let cells = match layout {
        CollageLayout::Grid2x2 => grid(2, 2, canvas, spacing)?,
        CollageLayout::Grid3x3 => grid(3, 3, canvas, spacing)?,
        CollageLayout::Grid4x4 => grid(4, 4, canvas, spacing)?,
        CollageLayout::Horizontal => grid(n as u32, 1, canvas, spacing)?,
        CollageLayout::Vertical => grid(1, n as u32, canvas, spacing)?,
        CollageLayout::Mosaic => mosaic(canvas, spacing)?,
        CollageLayout::Magazine => magazine(n, canvas, spacing)?,
        CollageLayout::Polaroid => {
            // Near-square grid; nine frames fit in 3x3.
            let cols = (n as f64).sqrt().ceil() as u32;
            let rows = (n as u32).div_ceil(cols);
            grid(cols, rows, canvas, spacing)?
        }
    };
    Ok(cells.into_iter().take(n).collect())
}

/// Split `total` pixels into `parts` spans separated by `spacing`.
/// Returns (offset, length) per span; the last span absorbs rounding.
fn spans(total: u32, parts: u32, spacing: u32) -> Result<Vec<(u32, u32)>> {
    let gaps = spacing as u64 * (parts as u64 - 1);
    if gaps >= total as u64 || (total as u64 - gaps) < parts as u64 {
        return Err(PixelCraftError::invalid(format!(
            "spacing {spacing}px leaves no room for {parts} cells in {total}px"
        )));
    }
    let available = total - gaps as u32;
    let base = available / parts;
    let mut offset = 0;
    let mut out = Vec::with_capacity(parts as usize);
    for i in 0..parts {
        let length = if i == parts - 1 {
            available - base * (parts - 1)
        } else {
            base
        };
        out.push((offset, length));
        offset += length + spacing;
    }
    Ok(out)
}

fn grid(cols: u32, rows: u32, canvas: Dimensions, spacing: u32) -> Result<Vec<Rect>> {
    let xs = spans(canvas.width, cols, spacing)?;
    let ys = spans(canvas.height, rows, spacing)?;
    Ok(ys
        .iter()
        .flat_map(|&(y, h)| xs.iter().map(move |&(x, w)| Rect::new(x, y, w, h)))
        .collect())
}

/// 3x3 grid where the first image spans the top-left 2x2 block and up to
/// five more fill the remaining cells.
fn mosaic(canvas: Dimensions, spacing: u32) -> Result<Vec<Rect>> {
    let cells = grid(3, 3, canvas, spacing)?;
    let (top_left, bottom_right) = (cells[0], cells[4]);
    let featured = Rect::new(
        top_left.x,
        top_left.y,
        bottom_right.right() - top_left.x,
        bottom_right.bottom() - top_left.y,
    );
    let mut out = vec![featured];
    out.extend([2, 5, 6, 7, 8].map(|i| cells[i]));
    Ok(out)
}

/// One featured image on the left two thirds, the rest stacked on the right.
fn magazine(n: usize, canvas: Dimensions, spacing: u32) -> Result<Vec<Rect>> {
    if n == 1 {
        return Ok(vec![Rect::new(0, 0, canvas.width, canvas.height)]);
    }
    let columns = spans(canvas.width, 3, spacing)?;
    let featured_width = columns[1].0 + columns[1].1;
    let side_x = columns[2].0;
    let side_width = columns[2].1;

    let mut out = vec![Rect::new(0, 0, featured_width, canvas.height)];
    for (y, h) in spans(canvas.height, (n - 1) as u32, spacing)? {
        out.push(Rect::new(side_x, y, side_width, h));
    }
    Ok(out)
}

/// Source region that fills a `cell` without distortion: the image is
/// scaled to cover the cell and the overflow on one axis is cropped evenly.
pub fn aspect_fill_crop(source: Dimensions, cell: Dimensions) -> Rect {
    let image_aspect = source.aspect_ratio();
    let cell_aspect = cell.aspect_ratio();
    if image_aspect > cell_aspect {
        let visible = ((source.height as f64 * cell_aspect).round() as u32).clamp(1, source.width);
        Rect::new((source.width - visible) / 2, 0, visible, source.height)
    } else {
        let visible = ((source.width as f64 / cell_aspect).round() as u32).clamp(1, source.height);
        Rect::new(0, (source.height - visible) / 2, source.width, visible)
    }
}

// -- Rendering ----------------------------------------------------------------

/// Whether pixel (`x`, `y`) of a `width` x `height` box lies inside the box
/// with its corners rounded to `radius`.
fn inside_rounded(x: u32, y: u32, width: u32, height: u32, radius: u32) -> bool {
    let r = radius.min(width / 2).min(height / 2) as f64;
    if r <= 0.0 {
        return true;
    }
    let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
    let (w, h) = (width as f64, height as f64);
    let cx = px.clamp(r, w - r);
    let cy = py.clamp(r, h - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

/// Polaroid frame: white card with the photo inset, deeper at the bottom.
fn polaroid_inset(cell: Rect) -> Rect {
    let pad = (cell.width.min(cell.height) / 20).max(2);
    let bottom = pad * 4;
    if cell.width <= pad * 2 || cell.height <= pad + bottom {
        return cell;
    }
    Rect::new(
        cell.x + pad,
        cell.y + pad,
        cell.width - pad * 2,
        cell.height - pad - bottom,
    )
}

fn draw_cell_image(canvas: &mut PixelBuffer, image: &PixelBuffer, cell: Rect, radius: u32) {
    let crop = aspect_fill_crop(dimensions(image), Dimensions::new(cell.width, cell.height));
    let region = imageops::crop_imm(image, crop.x, crop.y, crop.width, crop.height).to_image();
    let fitted = imageops::resize(&region, cell.width, cell.height, FilterType::Triangle);
    for (x, y, pixel) in fitted.enumerate_pixels() {
        if !inside_rounded(x, y, cell.width, cell.height, radius) {
            continue;
        }
        blend_pixel(canvas.get_pixel_mut(cell.x + x, cell.y + y), *pixel, 1.0);
    }
}

fn stroke_cell(canvas: &mut PixelBuffer, cell: Rect, border: CellBorder, radius: u32) {
    let bw = border.width;
    if bw == 0 {
        return;
    }
    let color = Rgba(border.color.to_array());
    let inner_w = cell.width.saturating_sub(bw * 2);
    let inner_h = cell.height.saturating_sub(bw * 2);
    let inner_radius = radius.saturating_sub(bw);
    for y in 0..cell.height {
        for x in 0..cell.width {
            if !inside_rounded(x, y, cell.width, cell.height, radius) {
                continue;
            }
            let in_inner = x >= bw
                && y >= bw
                && x - bw < inner_w
                && y - bw < inner_h
                && inside_rounded(x - bw, y - bw, inner_w, inner_h, inner_radius);
            if !in_inner {
                blend_pixel(canvas.get_pixel_mut(cell.x + x, cell.y + y), color, 1.0);
            }
        }
    }
}

/// Render `images` onto a fresh canvas according to `params`.
///
/// Images past the layout capacity are dropped and counted.
#[instrument(skip(images, params), fields(layout = %params.layout, images = images.len()))]
pub fn compose_collage(
    images: &[PixelBuffer],
    params: &CollageParams,
) -> Result<(PixelBuffer, CollagePlacement)> {
    if params.output_width == 0 || params.output_height == 0 {
        return Err(PixelCraftError::invalid(format!(
            "collage canvas must be positive, got {}x{}",
            params.output_width, params.output_height
        )));
    }
    let canvas_dims = Dimensions::new(params.output_width, params.output_height);
    let cells = layout_cells(params.layout, images.len(), canvas_dims, params.spacing)?;

    let placement = CollagePlacement {
        placed: cells.len(),
        dropped: images.len() - cells.len(),
    };
    if placement.dropped > 0 {
        warn!(
            dropped = placement.dropped,
            capacity = params.layout.max_images(),
            "Collage layout is full, extra images dropped"
        );
    }
    info!(placed = placement.placed, size = %canvas_dims, "Composing collage");

    let mut canvas = PixelBuffer::from_pixel(
        canvas_dims.width,
        canvas_dims.height,
        Rgba(params.background.to_array()),
    );

    for (image, cell) in images.iter().zip(&cells) {
        let photo = if params.layout == CollageLayout::Polaroid {
            fill_rect(&mut canvas, *cell, Color::WHITE);
            polaroid_inset(*cell)
        } else {
            *cell
        };
        draw_cell_image(&mut canvas, image, photo, params.corner_radius);
        if let Some(border) = params.border {
            stroke_cell(&mut canvas, *cell, border, params.corner_radius);
        }
        debug!(x = cell.x, y = cell.y, w = cell.width, h = cell.height, "Cell drawn");
    }
    Ok((canvas, placement))
}
