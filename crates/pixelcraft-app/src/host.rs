// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filesystem host: reads uploads and the request from disk, runs the
// batch, and writes outputs plus the optional JSON report.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pixelcraft_core::error::{PixelCraftError, Result};
use pixelcraft_core::human_errors::format_file_size;
use pixelcraft_core::{
    BatchOutcome, BatchState, FailureRecord, PipelineConfig, SourceAsset, TransformRequest,
    WatermarkContent,
};
use pixelcraft_pipeline::{Pipeline, ToolKind, filter_uploads};
use pixelcraft_raster::{FontFace, ImageCrateCodec};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;

// -- Configuration ------------------------------------------------------------

/// Load the pipeline configuration, falling back to defaults when the file
/// is missing or unreadable.
pub fn load_config(path: Option<&Path>) -> PipelineConfig {
    let Some(path) = path else {
        return PipelineConfig::default();
    };
    match read_config(path) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Config not loaded, using defaults");
            PipelineConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Result<PipelineConfig> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

// -- Inputs -------------------------------------------------------------------

/// MIME type guessed from the file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

pub fn read_source(path: &Path) -> Result<SourceAsset> {
    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!(file = %name, size = %format_file_size(data.len() as u64), "Source read");
    Ok(SourceAsset::new(data, mime_for_path(path), name))
}

/// Read every input. A path that cannot be read becomes a failure record
/// instead of stopping the run.
pub fn read_sources(paths: &[PathBuf]) -> (Vec<SourceAsset>, Vec<FailureRecord>) {
    let mut sources = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match read_source(path) {
            Ok(source) => sources.push(source),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Input not readable, skipping");
                unreadable.push(FailureRecord::unread(path.display().to_string(), &err));
            }
        }
    }
    (sources, unreadable)
}

/// Parse a request document. An image watermark given by name only is read
/// from disk, relative to the request file.
pub fn load_request(path: &Path) -> Result<TransformRequest> {
    let data = std::fs::read_to_string(path)?;
    let mut request: TransformRequest = serde_json::from_str(&data)?;

    if let TransformRequest::Watermark(params) = &mut request {
        if let WatermarkContent::Image { source, .. } = &mut params.content {
            if source.data.is_empty() {
                let base = path.parent().unwrap_or(Path::new("."));
                let mark_path = base.join(&source.original_name);
                let data = std::fs::read(&mark_path)?;
                info!(path = %mark_path.display(), "Watermark image loaded");
                *source = SourceAsset::new(data, source.mime_type.clone(), source.original_name.clone());
            }
        }
    }
    Ok(request)
}

// -- Outputs ------------------------------------------------------------------

/// Write every result into `dir`. Names already used in this batch get a
/// numeric suffix instead of being overwritten.
pub fn write_outputs(outcome: &BatchOutcome, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(outcome.results.len());
    for result in &outcome.results {
        let name = unique_name(&result.output_name, &mut used);
        let path = dir.join(&name);
        std::fs::write(&path, &result.output)?;
        debug!(path = %path.display(), bytes = result.output.len(), "Output written");
        written.push(path);
    }
    Ok(written)
}

fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_owned()) {
        return name.to_owned();
    }
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, ""));
    let mut n = 2;
    loop {
        let candidate = if ext.is_empty() {
            format!("{stem}-{n}")
        } else {
            format!("{stem}-{n}.{ext}")
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

pub fn write_report(outcome: &BatchOutcome, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(path, json)?;
    Ok(())
}

// -- Run ----------------------------------------------------------------------

/// Execute one invocation end to end.
pub fn run(args: &CliArgs) -> Result<BatchOutcome> {
    let config = load_config(args.config.as_deref());
    let request = load_request(&args.request)?;
    let (sources, unreadable) = read_sources(&args.files);

    let (accepted, filtered) = filter_uploads(sources, ToolKind::for_request(&request));
    if filtered > 0 {
        info!(filtered, "Skipped files this tool does not accept");
    }

    let mut pipeline = Pipeline::new(ImageCrateCodec::from_config(&config), config);
    if let Some(font) = &args.font {
        pipeline = pipeline.with_renderer(FontFace::open(font)?);
    }

    let mut outcome = pipeline.run_batch(&accepted, &request)?;
    if !unreadable.is_empty() {
        outcome.failures.extend(unreadable);
        outcome.state = BatchState::PartiallyCompleted;
    }
    let written = write_outputs(&outcome, &args.out)?;
    info!(
        dir = %args.out.display(),
        files = written.len(),
        bytes = %format_file_size(outcome.total_output_bytes()),
        "Outputs written"
    );
    if let Some(report) = &args.report {
        write_report(&outcome, report)?;
    }
    Ok(outcome)
}

/// Errors caused by the request or its settings rather than by the files.
pub fn is_usage_error(err: &PixelCraftError) -> bool {
    matches!(
        err,
        PixelCraftError::InvalidParameter(_) | PixelCraftError::Serialization(_)
    )
}
