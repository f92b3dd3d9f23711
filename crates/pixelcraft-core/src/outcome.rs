// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transform results and batch outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PixelCraftError};
use crate::types::{BatchId, Dimensions, SourceAsset};

/// Operation-specific statistics attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OperationStats {
    None,
    Compression {
        /// Percent of the source byte size saved; negative when the output grew.
        reduction_percent: f64,
    },
    Geometry {
        source: Dimensions,
    },
    BackgroundRemoval {
        /// Pixels whose alpha the heuristic lowered.
        affected_pixels: u64,
    },
    Collage {
        placed: usize,
        dropped: usize,
    },
    Meme {
        top_lines: usize,
        bottom_lines: usize,
    },
}

/// Size and statistics describing one output blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub dimensions: Dimensions,
    pub byte_size: u64,
    pub source_byte_size: u64,
    pub stats: OperationStats,
}

/// One successfully produced output. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    #[serde(skip)]
    pub output: Vec<u8>,
    pub output_name: String,
    pub mime_type: String,
    /// Original names of the files this output was made from. One name,
    /// except for a collage.
    pub sources: Vec<String>,
    pub metrics: Metrics,
}

/// A file that could not be processed, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub original_name: String,
    pub content_hash: String,
    pub kind: ErrorKind,
    pub reason: String,
}

impl FailureRecord {
    pub fn new(asset: &SourceAsset, error: &PixelCraftError) -> Self {
        Self {
            original_name: asset.original_name.clone(),
            content_hash: asset.content_hash.clone(),
            kind: error.kind(),
            reason: error.to_string(),
        }
    }

    /// A file whose bytes were never read, so it has no content hash.
    pub fn unread(original_name: impl Into<String>, error: &PixelCraftError) -> Self {
        Self {
            original_name: original_name.into(),
            content_hash: String::new(),
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

/// Lifecycle of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchState {
    Idle,
    Running,
    /// Every file succeeded (or there were none).
    Completed,
    /// At least one file failed. Also the terminal state when all failed.
    PartiallyCompleted,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyCompleted)
    }
}

/// Everything a batch run produced, in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub id: BatchId,
    pub operation: String,
    pub state: BatchState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub results: Vec<TransformResult>,
    pub failures: Vec<FailureRecord>,
}

impl BatchOutcome {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            id: BatchId::new(),
            operation: operation.into(),
            state: BatchState::Idle,
            started_at: Utc::now(),
            finished_at: None,
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Input files that ended up in a result. Together with [`failed`]
    /// this always accounts for every file of a finished batch.
    ///
    /// [`failed`]: Self::failed
    pub fn succeeded(&self) -> usize {
        self.results.iter().map(|r| r.sources.len()).sum()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total_output_bytes(&self) -> u64 {
        self.results.iter().map(|r| r.metrics.byte_size).sum()
    }
}
