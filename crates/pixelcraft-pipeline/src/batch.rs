// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch orchestrator: apply one TransformRequest to a list of files,
// strictly in order, one file at a time. A failing file is recorded and the
// batch moves on; only request validation can abort a run.

use chrono::Utc;
use pixelcraft_core::error::{PixelCraftError, Result};
use pixelcraft_core::human_errors::summarize_outcome;
use pixelcraft_core::integrity::short_hash;
use pixelcraft_core::{
    BatchOutcome, BatchState, CollageParams, Dimensions, FailureRecord, Metrics, OperationStats,
    OutputFormat, PipelineConfig, SourceAsset, TransformRequest, TransformResult,
    WatermarkContent,
};
use pixelcraft_raster::compose::collage::layout_cells;
use pixelcraft_raster::{
    GlyphRenderer, ImageCodec, PixelBuffer, apply_filters, apply_image_watermark,
    apply_text_watermark, compose_collage, crop, dimensions, fit_dimensions, remove_background,
    render_meme, resize, rotate_flip, rotated_bounds, upscale, upscaled_dimensions,
};
use tracing::{debug, info, instrument, warn};

use crate::naming::output_name;
use crate::validate::{check_output_size, validate};

/// A transformed buffer plus how to encode it.
struct Rendered {
    buffer: PixelBuffer,
    format: OutputFormat,
    quality: u8,
    stats: OperationStats,
}

/// Runs batches against a host codec.
///
/// The pipeline holds no per-batch state; every `run_batch` call starts
/// from `Idle` and owns its buffers until the call returns.
pub struct Pipeline<C: ImageCodec> {
    codec: C,
    config: PipelineConfig,
    renderer: Option<Box<dyn GlyphRenderer>>,
}

impl<C: ImageCodec> Pipeline<C> {
    // -- Construction ---------------------------------------------------------

    pub fn new(codec: C, config: PipelineConfig) -> Self {
        Self {
            codec,
            config,
            renderer: None,
        }
    }

    /// Attach the text renderer used by text watermarks and memes.
    pub fn with_renderer(mut self, renderer: impl GlyphRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // -- Batch entry point ----------------------------------------------------

    /// Apply `request` to every file in `files`, in order.
    ///
    /// Returns `Err` only when the request itself is unusable (invalid
    /// parameters, or a text operation without a renderer); no file has been
    /// decoded at that point. Per-file problems end up in
    /// [`BatchOutcome::failures`].
    #[instrument(skip_all, fields(op = request.name(), files = files.len()))]
    pub fn run_batch(&self, files: &[SourceAsset], request: &TransformRequest) -> Result<BatchOutcome> {
        validate(request, &self.config)?;
        if needs_renderer(request) && self.renderer.is_none() {
            return Err(PixelCraftError::Font(
                "text operations need a font, but none was loaded".into(),
            ));
        }
        if let TransformRequest::Collage(params) = request {
            let canvas = Dimensions::new(params.output_width, params.output_height);
            layout_cells(params.layout, files.len(), canvas, params.spacing)?;
        }

        let mut outcome = BatchOutcome::new(request.name());
        outcome.state = BatchState::Running;
        info!(batch = %outcome.id, "Batch started");

        match request {
            TransformRequest::Collage(params) => self.run_collage(files, request, params, &mut outcome),
            _ => {
                for file in files {
                    match self.process_file(file, request) {
                        Ok(result) => outcome.results.push(result),
                        Err(err) => {
                            warn!(file = %file.original_name, error = %err, "File failed, continuing");
                            outcome.failures.push(FailureRecord::new(file, &err));
                        }
                    }
                }
            }
        }

        outcome.state = if outcome.failures.is_empty() {
            BatchState::Completed
        } else {
            BatchState::PartiallyCompleted
        };
        outcome.finished_at = Some(Utc::now());
        info!(
            batch = %outcome.id,
            state = ?outcome.state,
            summary = %summarize_outcome(&outcome),
            "Batch finished"
        );
        Ok(outcome)
    }

    // -- Per-file work --------------------------------------------------------

    fn check_size(&self, file: &SourceAsset) -> Result<()> {
        let size = file.byte_size();
        if size > self.config.max_file_size {
            return Err(PixelCraftError::FileTooLarge {
                size,
                limit: self.config.max_file_size,
            });
        }
        Ok(())
    }

    fn load(&self, file: &SourceAsset) -> Result<PixelBuffer> {
        self.check_size(file)?;
        let buffer = self.codec.decode(&file.data)?;
        debug!(size = %dimensions(&buffer), "Source decoded");
        Ok(buffer)
    }

    fn renderer(&self) -> Result<&dyn GlyphRenderer> {
        self.renderer
            .as_deref()
            .ok_or_else(|| PixelCraftError::Font("no font loaded".into()))
    }

    #[instrument(skip_all, fields(file = %file.original_name, hash = short_hash(&file.content_hash)))]
    fn process_file(&self, file: &SourceAsset, request: &TransformRequest) -> Result<TransformResult> {
        let source = self.load(file)?;
        let source_format = file.format().unwrap_or(OutputFormat::Png);
        let rendered = self.transform(source, source_format, request)?;

        let output = self.codec.encode(&rendered.buffer, rendered.format, rendered.quality)?;
        let stats = match rendered.stats {
            OperationStats::Compression { .. } => OperationStats::Compression {
                reduction_percent: reduction_percent(file.byte_size(), output.len() as u64),
            },
            other => other,
        };
        let result = TransformResult {
            output_name: output_name(&file.original_name, request, rendered.format),
            mime_type: rendered.format.mime_type().to_owned(),
            sources: vec![file.original_name.clone()],
            metrics: Metrics {
                dimensions: dimensions(&rendered.buffer),
                byte_size: output.len() as u64,
                source_byte_size: file.byte_size(),
                stats,
            },
            output,
        };
        info!(
            output = %result.output_name,
            size = %result.metrics.dimensions,
            bytes = result.metrics.byte_size,
            "File transformed"
        );
        Ok(result)
    }

    /// Run the pixel stage of `request` on a decoded source.
    fn transform(
        &self,
        source: PixelBuffer,
        source_format: OutputFormat,
        request: &TransformRequest,
    ) -> Result<Rendered> {
        let quality = self.config.default_quality;
        let geometry = |buffer: PixelBuffer, before: Dimensions| Rendered {
            buffer,
            format: source_format,
            quality,
            stats: OperationStats::Geometry { source: before },
        };
        let source_dims = dimensions(&source);
        self.check_planned_output(source_dims, request)?;

        let rendered = match request {
            TransformRequest::Compress(params) => Rendered {
                buffer: source,
                format: params.format.unwrap_or(source_format),
                quality: params.quality,
                stats: OperationStats::Compression {
                    reduction_percent: 0.0,
                },
            },
            TransformRequest::Convert(params) => Rendered {
                buffer: source,
                format: params.format,
                quality: params.quality.unwrap_or(quality),
                stats: OperationStats::None,
            },
            TransformRequest::Resize(params) => geometry(resize(&source, params.mode)?, source_dims),
            TransformRequest::Crop(params) => geometry(crop(&source, *params)?, source_dims),
            TransformRequest::Rotate(params) => geometry(rotate_flip(&source, params)?, source_dims),
            TransformRequest::Upscale(params) => geometry(
                upscale(&source, params.factor, params.method, params.sharpen)?,
                source_dims,
            ),
            TransformRequest::Adjust(params) => Rendered {
                buffer: apply_filters(&source, &params.filters),
                format: source_format,
                quality,
                stats: OperationStats::None,
            },
            TransformRequest::BackgroundRemove(params) => {
                let (buffer, affected) = remove_background(&source, params);
                Rendered {
                    buffer,
                    // Transparency needs an alpha-capable container.
                    format: OutputFormat::Png,
                    quality: 100,
                    stats: OperationStats::BackgroundRemoval {
                        affected_pixels: affected,
                    },
                }
            }
            TransformRequest::Watermark(params) => {
                let padding = self.config.watermark_padding;
                let buffer = match &params.content {
                    WatermarkContent::Text { text, style } => apply_text_watermark(
                        &source,
                        text,
                        style,
                        params.anchor,
                        params.opacity,
                        padding,
                        self.renderer()?,
                    ),
                    WatermarkContent::Image { source: mark, scale } => {
                        // Borrowed for this file only; decoded afresh each time.
                        let overlay = self.load(mark)?;
                        apply_image_watermark(&source, &overlay, *scale, params.anchor, params.opacity, padding)
                    }
                };
                Rendered {
                    buffer,
                    format: source_format,
                    quality,
                    stats: OperationStats::None,
                }
            }
            TransformRequest::Meme(params) => {
                let (buffer, layout) = render_meme(
                    &source,
                    params,
                    self.renderer()?,
                    self.config.wrap_margin,
                    self.config.line_height,
                );
                Rendered {
                    buffer,
                    format: source_format,
                    quality,
                    stats: OperationStats::Meme {
                        top_lines: layout.top.len(),
                        bottom_lines: layout.bottom.len(),
                    },
                }
            }
            TransformRequest::Collage(_) => {
                return Err(PixelCraftError::UnsupportedOperation(
                    "collages are composed from the whole batch, not per file".into(),
                ));
            }
        };
        Ok(rendered)
    }

    /// Refuse a transform whose output size, derived from the source, would
    /// exceed the pixel budget. Runs before the output buffer is allocated.
    fn check_planned_output(&self, source: Dimensions, request: &TransformRequest) -> Result<()> {
        let planned = match request {
            TransformRequest::Resize(params) => fit_dimensions(source, params.mode)?,
            TransformRequest::Upscale(params) => upscaled_dimensions(source, params.factor),
            TransformRequest::Rotate(params) => rotated_bounds(source, params.angle_degrees),
            _ => return Ok(()),
        };
        check_output_size(planned, &self.config)
    }

    // -- Collage --------------------------------------------------------------

    /// Decode files in order until the layout is full, then compose and
    /// encode a single output listing every placed file as a source.
    /// Undecodable files, and files left over once the layout is full,
    /// become failures.
    fn run_collage(
        &self,
        files: &[SourceAsset],
        request: &TransformRequest,
        params: &CollageParams,
        outcome: &mut BatchOutcome,
    ) {
        let capacity = params.layout.max_images();
        let mut images = Vec::with_capacity(files.len().min(capacity));
        let mut used = Vec::with_capacity(files.len().min(capacity));
        for file in files {
            if images.len() == capacity {
                let err = PixelCraftError::UnsupportedOperation(format!(
                    "the {} layout is full after {capacity} images",
                    params.layout.as_str()
                ));
                debug!(file = %file.original_name, "Collage layout full, file not placed");
                outcome.failures.push(FailureRecord::new(file, &err));
                continue;
            }
            match self.load(file) {
                Ok(image) => {
                    images.push(image);
                    used.push(file);
                }
                Err(err) => {
                    warn!(file = %file.original_name, error = %err, "Collage image failed, skipping");
                    outcome.failures.push(FailureRecord::new(file, &err));
                }
            }
        }
        if images.is_empty() {
            debug!("No collage images decoded, nothing to compose");
            return;
        }

        let format = params.format.unwrap_or(OutputFormat::Png);
        let composed = compose_collage(&images, params).and_then(|(canvas, placement)| {
            let output = self.codec.encode(&canvas, format, self.config.default_quality)?;
            Ok((canvas, placement, output))
        });
        match composed {
            Ok((canvas, placement, output)) => {
                let source_bytes = used.iter().map(|file| file.byte_size()).sum();
                let first_name = used.first().map_or("collage", |file| file.original_name.as_str());
                outcome.results.push(TransformResult {
                    output_name: output_name(first_name, request, format),
                    mime_type: format.mime_type().to_owned(),
                    sources: used.iter().map(|file| file.original_name.clone()).collect(),
                    metrics: Metrics {
                        dimensions: dimensions(&canvas),
                        byte_size: output.len() as u64,
                        source_byte_size: source_bytes,
                        stats: OperationStats::Collage {
                            placed: placement.placed,
                            dropped: placement.dropped,
                        },
                    },
                    output,
                });
            }
            Err(err) => {
                warn!(error = %err, "Collage could not be produced");
                for file in used {
                    outcome.failures.push(FailureRecord::new(file, &err));
                }
            }
        }
    }
}

fn needs_renderer(request: &TransformRequest) -> bool {
    match request {
        TransformRequest::Meme(_) => true,
        TransformRequest::Watermark(params) => {
            matches!(params.content, WatermarkContent::Text { .. })
        }
        _ => false,
    }
}

/// Percent of `source` bytes saved by the output; negative when it grew.
fn reduction_percent(source: u64, output: u64) -> f64 {
    if source == 0 {
        return 0.0;
    }
    (source as f64 - output as f64) / source as f64 * 100.0
}
