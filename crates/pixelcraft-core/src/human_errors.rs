// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages and batch summaries.
//
// Every technical error is mapped to plain English with a clear suggestion,
// so the host can show "why did this file fail" without leaking codec jargon.

use crate::error::{ErrorKind, PixelCraftError};
use crate::outcome::BatchOutcome;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user must change something (pick another file, fix a setting).
    ActionRequired,
    /// Cannot be fixed by the user; the host lacks the capability.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `PixelCraftError` into a `HumanError`.
pub fn humanize_error(err: &PixelCraftError) -> HumanError {
    match err {
        PixelCraftError::FileTooLarge { limit, .. } => HumanError {
            message: "This file is too big.".into(),
            suggestion: format!(
                "Files can be up to {}. Try a smaller version of the image.",
                format_file_size(*limit)
            ),
            severity: Severity::ActionRequired,
        },
        PixelCraftError::InvalidParameter(detail) => HumanError {
            message: "One of the settings isn't valid.".into(),
            suggestion: format!("Check the options and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },
        other => humanize_kind(other.kind()),
    }
}

/// Plain-language description for an error kind, used when only a
/// [`FailureRecord`](crate::FailureRecord) is at hand.
pub fn humanize_kind(kind: ErrorKind) -> HumanError {
    match kind {
        ErrorKind::Decode => HumanError {
            message: "We couldn't read this image.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::ActionRequired,
        },
        ErrorKind::Encode => HumanError {
            message: "We couldn't save the result in that format.".into(),
            suggestion: "Pick a different output format, such as PNG.".into(),
            severity: Severity::Permanent,
        },
        ErrorKind::InvalidParameter => HumanError {
            message: "One of the settings isn't valid.".into(),
            suggestion: "Check the options and try again.".into(),
            severity: Severity::ActionRequired,
        },
        ErrorKind::UnsupportedOperation => HumanError {
            message: "That option isn't available.".into(),
            suggestion: "Choose one of the listed tools or layouts.".into(),
            severity: Severity::Permanent,
        },
        ErrorKind::FileTooLarge => HumanError {
            message: "This file is too big.".into(),
            suggestion: "Try a smaller version of the image.".into(),
            severity: Severity::ActionRequired,
        },
        ErrorKind::Font => HumanError {
            message: "The text couldn't be drawn.".into(),
            suggestion: "Choose a different font file.".into(),
            severity: Severity::ActionRequired,
        },
        ErrorKind::Io | ErrorKind::Serialization => HumanError {
            message: "Something went wrong reading or writing files.".into(),
            suggestion: "Check that the files exist and that you can write to the output folder.".into(),
            severity: Severity::Permanent,
        },
    }
}

/// One-line batch summary, e.g. `"3 succeeded, 1 failed"`.
pub fn summarize_outcome(outcome: &BatchOutcome) -> String {
    format!("{} succeeded, {} failed", outcome.succeeded(), outcome.failed())
}

/// Format a byte count for display: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".into();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}
