// SPDX-License-Identifier: MIT

//!
//! Track layout
//!

use crate::{AxisMapper, Point};
use chronolane_core::{Extent, TimePoint};

/// Tracks are drawn strictly horizontally.  A non-zero slope would tilt each
/// track in proportion to its distance from the start of the axis.
pub const TRACK_SLOPE: f64 = 0.0;

/// A track's local linear mapping (time -> position), anchored to its own
/// span on the shared axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLayout {
    extent: Extent,
    x_start: f64,
    x_end: f64,
    y_start: f64,
}

impl TrackLayout {
    /// Place a track spanning `extent` at `v_pos` (a fraction of the viewport
    /// height)
    pub fn new(axis: &AxisMapper, extent: Extent, v_pos: f64, viewport_height: f64) -> Self {
        let x_start = axis.map_global(extent.min());
        let x_end = axis.map_global(extent.max());

        // Horizontal distance from the start of the shared axis
        let origin_offset = x_start - axis.map_global(axis.domain().min());

        Self {
            extent,
            x_start,
            x_end,
            y_start: v_pos * viewport_height + TRACK_SLOPE * origin_offset,
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn x_start(&self) -> f64 {
        self.x_start
    }

    pub fn x_end(&self) -> f64 {
        self.x_end
    }

    /// The start of the baseline
    pub fn start(&self) -> Point {
        Point::new(self.x_start, self.y_start)
    }

    /// The end of the baseline
    pub fn end(&self) -> Point {
        let dx = self.x_end - self.x_start;
        Point::new(self.x_end, self.y_start + TRACK_SLOPE * dx)
    }

    /// Where `instant` sits on the track
    pub fn position_on_line(&self, instant: TimePoint) -> Point {
        let fraction = self.extent.fraction_of(instant);
        let dx = self.x_end - self.x_start;
        Point::new(
            self.x_start + fraction * dx,
            self.y_start + fraction * TRACK_SLOPE * dx,
        )
    }
}
