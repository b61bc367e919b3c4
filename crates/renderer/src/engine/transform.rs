// SPDX-License-Identifier: MIT

//!
//! The live pan/zoom transform
//!

use serde::{Deserialize, Serialize};

/// The allowed range of the zoom scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl ZoomBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Bring `scale` into range.  Never panics, even for bounds that failed
    /// validation.
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }

    /// Whether `0 < min <= max`, both finite
    pub fn is_valid(&self) -> bool {
        self.min > 0.0 && self.min <= self.max && self.max.is_finite()
    }
}

/// Pan offset and zoom scale applied to the whole scene.  A point `p` in
/// scene coordinates is drawn at `p * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// The same transform with its scale clamped into `bounds`
    pub fn clamped(mut self, bounds: ZoomBounds) -> Self {
        self.scale = bounds.clamp(self.scale);
        self
    }

    /// Viewport x -> scene x
    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.translate_x) / self.scale
    }

    /// Viewport y -> scene y
    pub fn invert_y(&self, y: f64) -> f64 {
        (y - self.translate_y) / self.scale
    }

    /// Scene x -> viewport x
    pub fn apply_x(&self, x: f64) -> f64 {
        x * self.scale + self.translate_x
    }

    /// Scene y -> viewport y
    pub fn apply_y(&self, y: f64) -> f64 {
        y * self.scale + self.translate_y
    }

    /// Move by a viewport delta
    pub fn panned(mut self, dx: f64, dy: f64) -> Self {
        self.translate_x += dx;
        self.translate_y += dy;
        self
    }

    /// Multiply the scale by `factor` (clamped to `bounds`), keeping the
    /// viewport point (`x`, `y`) fixed so it appears as though we are zooming
    /// around the pointer
    pub fn zoomed_at(mut self, factor: f64, x: f64, y: f64, bounds: ZoomBounds) -> Self {
        let scale = bounds.clamp(self.scale * factor);
        let factor = scale / self.scale;
        self.translate_x = x - ((x - self.translate_x) * factor);
        self.translate_y = y - ((y - self.translate_y) * factor);
        self.scale = scale;
        self
    }

    /// The value of an SVG `transform` attribute
    pub fn to_svg(&self) -> String {
        format!(
            "translate({},{}) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}
