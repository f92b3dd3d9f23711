// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for PixelCraft.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for all PixelCraft operations.
#[derive(Debug, Error)]
pub enum PixelCraftError {
    // -- Codec errors --
    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),

    // -- Request errors --
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("file is {size} bytes, over the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    // -- Text rendering --
    #[error("font error: {0}")]
    Font(String),

    // -- Host I/O --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a [`PixelCraftError`], stored on failure
/// records so reports can group failures without carrying the error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Decode,
    Encode,
    InvalidParameter,
    UnsupportedOperation,
    FileTooLarge,
    Font,
    Io,
    Serialization,
}

impl PixelCraftError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Decode,
            Self::Encode(_) => ErrorKind::Encode,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::Font(_) => ErrorKind::Font,
            Self::Io(_) => ErrorKind::Io,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Shorthand for building an `InvalidParameter` error.
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidParameter(detail.into())
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PixelCraftError>;
