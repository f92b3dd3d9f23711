// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output file naming.

use pixelcraft_core::{OutputFormat, TransformRequest};

/// Derive the download name for one output.
///
/// The operation suffix goes between the stem and the extension. The
/// original extension is kept when it already names `format` (so `.jpeg`
/// stays `.jpeg`), otherwise it is replaced. Collages are always
/// `collage.<ext>`.
pub fn output_name(original: &str, request: &TransformRequest, format: OutputFormat) -> String {
    if matches!(request, TransformRequest::Collage(_)) {
        return format!("collage.{}", format.extension());
    }

    let (stem, extension) = match original.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (original, None),
    };
    let extension = extension
        .filter(|ext| OutputFormat::from_extension(ext) == Some(format))
        .unwrap_or(format.extension());
    let stem = if stem.is_empty() { "image" } else { stem };
    format!("{stem}{}.{extension}", request.name_suffix())
}
