// SPDX-License-Identifier: MIT

//!
//! The piecewise law used to keep zoom-sensitive sizes steady on screen
//!

use serde::{Deserialize, Serialize};

/// A size that shrinks as `base / scale` while zooming in, until the scale
/// reaches `upper_threshold`, after which it stays at `base / upper_threshold`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleLaw {
    /// The size at a scale of 1
    pub base: f64,

    /// The scale from which the size stops shrinking
    pub upper_threshold: f64,
}

impl ScaleLaw {
    pub const fn new(base: f64, upper_threshold: f64) -> Self {
        Self {
            base,
            upper_threshold,
        }
    }

    /// Whether `base >= 0` and `upper_threshold > 0`, both finite
    pub fn is_valid(&self) -> bool {
        self.base >= 0.0
            && self.base.is_finite()
            && self.upper_threshold > 0.0
            && self.upper_threshold.is_finite()
    }

    /// The size at the given (positive) scale
    pub fn at(&self, scale: f64) -> f64 {
        debug_assert!(scale > 0.0, "scale must be positive");
        if scale < self.upper_threshold {
            self.base / scale
        } else {
            self.base / self.upper_threshold
        }
    }
}
