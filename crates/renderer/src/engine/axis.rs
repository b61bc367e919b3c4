// SPDX-License-Identifier: MIT

//!
//! The shared time axis
//!

use chronolane_core::{Extent, TimePoint};
use thiserror::Error;

/// Errors that can arise when building an [`AxisMapper`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AxisError {
    /// The margins leave no room for the axis
    #[error("Viewport width {width} leaves no room between margins {left} and {right}")]
    NoRoom { width: f64, left: f64, right: f64 },
}

/// Maps absolute time onto the horizontal pixel axis shared by every track.
///
/// Fixed for the session once built.  Pan and zoom are applied to the
/// rendered scene, never to this mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapper {
    domain: Extent,
    range_start: f64,
    range_end: f64,
}

impl AxisMapper {
    /// Map `domain` onto `[left_margin, width - right_margin]`
    pub fn new(
        domain: Extent,
        width: f64,
        left_margin: f64,
        right_margin: f64,
    ) -> Result<Self, AxisError> {
        let range_start = left_margin;
        let range_end = width - right_margin;
        if range_end <= range_start || !range_end.is_finite() {
            return Err(AxisError::NoRoom {
                width,
                left: left_margin,
                right: right_margin,
            });
        }
        Ok(Self {
            domain,
            range_start,
            range_end,
        })
    }

    pub fn domain(&self) -> Extent {
        self.domain
    }

    /// `(start, end)` pixel positions of the domain's min and max
    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Time -> pixel x (linear, strictly increasing, extrapolated outside of
    /// the domain)
    pub fn map_global(&self, instant: TimePoint) -> f64 {
        self.range_start + self.domain.fraction_of(instant) * (self.range_end - self.range_start)
    }

    /// Pixel x -> time (the inverse of [`AxisMapper::map_global`], to the
    /// nearest millisecond)
    pub fn invert(&self, x: f64) -> TimePoint {
        let fraction = (x - self.range_start) / (self.range_end - self.range_start);
        let millis =
            self.domain.min().as_millis() as f64 + fraction * self.domain.span_millis() as f64;
        TimePoint::from_millis_f64(millis)
    }
}
