// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adjustment filter chain: the numeric parameters behind the photo editor,
// and their CSS-like string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PixelCraftError, Result};

/// A set of independent per-pixel adjustments applied in a single pass.
///
/// Brightness, contrast, and saturation are signed percent offsets from the
/// identity (0 leaves the image alone, -100 removes the quantity entirely).
/// Hue is a rotation in degrees, blur a Gaussian radius in pixels, and
/// grayscale/sepia/invert are mix amounts from 0 to 100 percent.
///
/// The string form mirrors CSS filter syntax:
///
/// ```
/// use pixelcraft_core::FilterChain;
///
/// let chain: FilterChain = "brightness(110%) sepia(40%)".parse().unwrap();
/// assert_eq!(chain.brightness, 10.0);
/// assert_eq!(chain.to_string(), "brightness(110%) sepia(40%)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterChain {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub hue: f32,
    pub blur: f32,
    pub grayscale: f32,
    pub sepia: f32,
    pub invert: f32,
}

impl FilterChain {
    /// Whether applying the chain would leave every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        [
            self.brightness,
            self.contrast,
            self.saturation,
            self.hue % 360.0,
            self.blur,
            self.grayscale,
            self.sepia,
            self.invert,
        ]
        .iter()
        .all(|v| v.abs() <= f32::EPSILON)
    }

    /// Reject values outside the ranges the editor exposes.
    pub fn validate(&self) -> Result<()> {
        let signed = [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
        ];
        for (name, value) in signed {
            if !value.is_finite() || !(-100.0..=100.0).contains(&value) {
                return Err(PixelCraftError::invalid(format!(
                    "{name} must be between -100 and 100 percent, got {value}"
                )));
            }
        }
        let amounts = [
            ("grayscale", self.grayscale),
            ("sepia", self.sepia),
            ("invert", self.invert),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(PixelCraftError::invalid(format!(
                    "{name} must be between 0 and 100 percent, got {value}"
                )));
            }
        }
        if !self.hue.is_finite() {
            return Err(PixelCraftError::invalid("hue must be a finite angle"));
        }
        if !self.blur.is_finite() || !(0.0..=50.0).contains(&self.blur) {
            return Err(PixelCraftError::invalid(format!(
                "blur radius must be between 0 and 50 px, got {}",
                self.blur
            )));
        }
        Ok(())
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.brightness != 0.0 {
            parts.push(format!("brightness({}%)", 100.0 + self.brightness));
        }
        if self.contrast != 0.0 {
            parts.push(format!("contrast({}%)", 100.0 + self.contrast));
        }
        if self.saturation != 0.0 {
            parts.push(format!("saturate({}%)", 100.0 + self.saturation));
        }
        if self.hue != 0.0 {
            parts.push(format!("hue-rotate({}deg)", self.hue));
        }
        if self.blur != 0.0 {
            parts.push(format!("blur({}px)", self.blur));
        }
        if self.grayscale != 0.0 {
            parts.push(format!("grayscale({}%)", self.grayscale));
        }
        if self.sepia != 0.0 {
            parts.push(format!("sepia({}%)", self.sepia));
        }
        if self.invert != 0.0 {
            parts.push(format!("invert({}%)", self.invert));
        }
        if parts.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

impl FromStr for FilterChain {
    type Err = PixelCraftError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chain = FilterChain::default();
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "none" {
            return Ok(chain);
        }

        for token in trimmed.split_whitespace() {
            let (name, rest) = token
                .split_once('(')
                .ok_or_else(|| PixelCraftError::invalid(format!("malformed filter {token:?}")))?;
            let raw = rest
                .strip_suffix(')')
                .ok_or_else(|| PixelCraftError::invalid(format!("unclosed filter {token:?}")))?;
            let number = raw.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
            let value: f32 = number
                .parse()
                .map_err(|_| PixelCraftError::invalid(format!("bad value in {token:?}")))?;

            match name {
                "brightness" => chain.brightness = value - 100.0,
                "contrast" => chain.contrast = value - 100.0,
                "saturate" => chain.saturation = value - 100.0,
                "hue-rotate" => chain.hue = value,
                "blur" => chain.blur = value,
                "grayscale" => chain.grayscale = value,
                "sepia" => chain.sepia = value,
                "invert" => chain.invert = value,
                other => {
                    return Err(PixelCraftError::UnsupportedOperation(format!(
                        "unknown filter {other:?}"
                    )));
                }
            }
        }
        Ok(chain)
    }
}
