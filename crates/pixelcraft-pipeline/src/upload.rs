// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload boundary: per-tool MIME allow-lists. Files outside a tool's list
// are dropped from the working set without an error.

use pixelcraft_core::{SourceAsset, TransformRequest};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The tool a batch was started from. Each tool accepts its own set of
/// upload types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Compress,
    Resize,
    Crop,
    Rotate,
    Upscale,
    BackgroundRemove,
    Watermark,
    Collage,
    Meme,
    Convert,
    Adjust,
}

const BACKGROUND_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];
const RESIZE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/svg+xml"];

impl ToolKind {
    pub fn for_request(request: &TransformRequest) -> Self {
        match request {
            TransformRequest::Compress(_) => Self::Compress,
            TransformRequest::Resize(_) => Self::Resize,
            TransformRequest::Crop(_) => Self::Crop,
            TransformRequest::Rotate(_) => Self::Rotate,
            TransformRequest::Upscale(_) => Self::Upscale,
            TransformRequest::BackgroundRemove(_) => Self::BackgroundRemove,
            TransformRequest::Watermark(_) => Self::Watermark,
            TransformRequest::Collage(_) => Self::Collage,
            TransformRequest::Meme(_) => Self::Meme,
            TransformRequest::Convert(_) => Self::Convert,
            TransformRequest::Adjust(_) => Self::Adjust,
        }
    }

    /// Explicit allow-list, or `None` when any `image/*` type is accepted.
    pub fn allowed_mime_types(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::BackgroundRemove => Some(BACKGROUND_TYPES),
            Self::Resize => Some(RESIZE_TYPES),
            _ => None,
        }
    }

    pub fn accepts(&self, mime_type: &str) -> bool {
        let mime = mime_type.trim().to_ascii_lowercase();
        match self.allowed_mime_types() {
            Some(list) => list.contains(&mime.as_str()),
            None => mime.starts_with("image/"),
        }
    }
}

/// Keep the files `tool` accepts, in their original order, and count the
/// ones that were filtered out.
pub fn filter_uploads(files: Vec<SourceAsset>, tool: ToolKind) -> (Vec<SourceAsset>, usize) {
    let total = files.len();
    let accepted: Vec<SourceAsset> = files
        .into_iter()
        .filter(|file| {
            let ok = tool.accepts(&file.mime_type);
            if !ok {
                warn!(
                    file = %file.original_name,
                    mime = %file.mime_type,
                    ?tool,
                    "Upload type not accepted, skipping"
                );
            }
            ok
        })
        .collect();
    let filtered = total - accepted.len();
    (accepted, filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, mime: &str) -> SourceAsset {
        SourceAsset::new(vec![1, 2, 3], mime, name)
    }

    #[test]
    fn background_removal_only_takes_jpeg_png_gif() {
        let tool = ToolKind::BackgroundRemove;
        assert!(tool.accepts("image/png"));
        assert!(tool.accepts("IMAGE/JPEG"));
        assert!(!tool.accepts("image/webp"));
        assert!(!tool.accepts("image/svg+xml"));
    }

    #[test]
    fn resize_also_takes_svg() {
        assert!(ToolKind::Resize.accepts("image/svg+xml"));
        assert!(!ToolKind::Resize.accepts("image/bmp"));
    }

    #[test]
    fn generic_tools_take_any_image() {
        for tool in [ToolKind::Compress, ToolKind::Watermark, ToolKind::Collage, ToolKind::Meme] {
            assert!(tool.accepts("image/webp"), "{tool:?}");
            assert!(!tool.accepts("application/pdf"), "{tool:?}");
        }
    }

    #[test]
    fn filtering_keeps_order_and_counts_drops() {
        let files = vec![
            asset("a.png", "image/png"),
            asset("b.pdf", "application/pdf"),
            asset("c.webp", "image/webp"),
            asset("d.jpg", "image/jpeg"),
        ];
        let (kept, filtered) = filter_uploads(files, ToolKind::BackgroundRemove);
        let names: Vec<_> = kept.iter().map(|f| f.original_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "d.jpg"]);
        assert_eq!(filtered, 2);
    }

    #[test]
    fn tool_follows_request_variant() {
        let request: TransformRequest =
            serde_json::from_str(r#"{"op":"background-remove","method":"edges","tolerance":10}"#).unwrap();
        assert_eq!(ToolKind::for_request(&request), ToolKind::BackgroundRemove);
    }
}
