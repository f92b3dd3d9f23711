// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PixelCraft core: types, requests, outcomes, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod filters;
pub mod human_errors;
pub mod integrity;
pub mod outcome;
pub mod request;
pub mod types;

pub use config::PipelineConfig;
pub use error::{ErrorKind, PixelCraftError, Result};
pub use filters::FilterChain;
pub use outcome::*;
pub use request::*;
pub use types::*;
