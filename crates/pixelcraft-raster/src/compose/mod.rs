// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositor: alpha blending, text rendering, watermarks, collages, and
// meme captions.

pub mod blend;
pub mod collage;
pub mod meme;
pub mod text;
pub mod watermark;
