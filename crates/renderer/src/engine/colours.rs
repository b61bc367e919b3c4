// SPDX-License-Identifier: MIT

//!
//! Colours
//!

use crate::colour::Colour;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The colours of the grid lines, one per tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridColours {
    pub decade: Colour,
    pub half_decade: Colour,
    pub year: Colour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineColours {
    /// Track baselines
    pub baseline: Colour,

    /// Event ticks
    pub tick: Colour,

    /// Labels (event, date, period, track, and grid labels)
    pub text: Colour,

    /// Periods without their own `color`
    pub period: Colour,

    /// Decade grid lines.  Half-decade and year lines are lightened versions.
    pub grid: Colour,
}

impl TimelineColours {
    /// Derive the three grid line colours from the decade colour
    pub fn grid_colours(&self) -> GridColours {
        let half_decade = Colour::lightened_colour(self.grid);
        GridColours {
            decade: self.grid,
            half_decade,
            year: Colour::lightened_colour(half_decade),
        }
    }
}

impl Default for TimelineColours {
    fn default() -> Self {
        Self {
            baseline: Colour::from_rgb(0x33, 0x33, 0x33),
            tick: Colour::from_rgb(0x22, 0x22, 0x22),
            text: Colour::from_rgb(0, 0, 0),
            period: Colour::from_rgb(0x80, 0x80, 0x80),
            grid: Colour::from_rgb(0x99, 0x99, 0x99),
        }
    }
}
