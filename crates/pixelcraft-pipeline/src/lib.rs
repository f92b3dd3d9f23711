// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PixelCraft pipeline: upload filtering, request validation, output naming,
// and the sequential batch orchestrator.

pub mod batch;
pub mod naming;
pub mod upload;
pub mod validate;

pub use batch::Pipeline;
pub use naming::output_name;
pub use upload::{ToolKind, filter_uploads};
pub use validate::{check_output_size, validate};
