// SPDX-License-Identifier: MIT

//!
//! The date grid: one vertical line per year over (and well beyond) the
//! visible time window
//!

use super::helpers::{ceiling_to_decade, floor_to_decade};
use crate::colour::Colour;
use crate::{AxisMapper, GridColours, Transform, ViewConfig};
use chronolane_core::{MAX_YEAR, MIN_YEAR, TimePoint};
use serde::Serialize;

/// Grid year labels read bottom-to-top
pub const GRID_LABEL_ROTATION: f64 = -90.0;

/// Grid lines reach this many viewport heights above and below the origin
pub const GRID_LINE_REACH: f64 = 5.0;

/// The most lines drawn in one regeneration.  Wider windows keep only every
/// 10th (or 100th, ...) year.
pub const MAX_GRID_LINES: i32 = 1000;

/// The styling tier of a year line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GridTier {
    Decade,
    HalfDecade,
    Year,
}

impl GridTier {
    pub fn of_year(year: i32) -> Self {
        if year.rem_euclid(10) == 0 {
            GridTier::Decade
        } else if year.rem_euclid(5) == 0 {
            GridTier::HalfDecade
        } else {
            GridTier::Year
        }
    }

    /// The class given to lines of this tier
    pub fn line_class(&self) -> &'static str {
        match self {
            GridTier::Decade => "grid-line-primary",
            GridTier::HalfDecade => "grid-line-secondary",
            GridTier::Year => "grid-line-ternary",
        }
    }

    pub fn colour(&self, colours: &GridColours) -> Colour {
        match self {
            GridTier::Decade => colours.decade,
            GridTier::HalfDecade => colours.half_decade,
            GridTier::Year => colours.year,
        }
    }
}

/// A year label, drawn rotated about its own anchor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// A vertical line at the start of a year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLine {
    pub year: i32,
    pub x: f64,
    pub y1: f64,
    pub y2: f64,
    pub tier: GridTier,
    pub label: Option<GridLabel>,
}

/// The visible time window: what the viewport's left and right edges map to
/// once the transform is undone
pub fn visible_window(axis: &AxisMapper, transform: &Transform, width: f64) -> (TimePoint, TimePoint) {
    (
        axis.invert(transform.invert_x(0.0)),
        axis.invert(transform.invert_x(width)),
    )
}

/// The smallest power of ten that keeps `start..=end` within
/// [`MAX_GRID_LINES`]
fn year_stride(start: i32, end: i32) -> i32 {
    let mut stride = 1;
    while (end - start) / stride + 1 > MAX_GRID_LINES {
        stride *= 10;
    }
    stride
}

/// Generate every grid line for the visible window.  Lines are generated from
/// the decade at or before `visible_min` to the decade at or after
/// `visible_max`, extended by the configured overscan on both sides and cut
/// to the supported year range.  Labels are kept at the top of the viewport
/// whatever the vertical pan.
pub fn generate_grid(
    axis: &AxisMapper,
    visible_min: TimePoint,
    visible_max: TimePoint,
    transform: &Transform,
    height: f64,
    config: &ViewConfig,
) -> Vec<GridLine> {
    let start_year = floor_to_decade(visible_min.year())
        .saturating_sub(config.grid_overscan_years)
        .max(MIN_YEAR);
    let end_year = ceiling_to_decade(visible_max.year())
        .saturating_add(config.grid_overscan_years)
        .min(MAX_YEAR);
    if start_year > end_year {
        return Vec::new();
    }
    let stride = year_stride(start_year, end_year);
    let first_year = (start_year + stride - 1).div_euclid(stride) * stride;
    let label_y = config.grid_label_top - transform.translate_y / transform.scale;

    (first_year..=end_year)
        .step_by(stride as usize)
        .map(|year| {
            let x = axis.map_global(TimePoint::start_of_year(year));
            let tier = GridTier::of_year(year);
            let labelled = match tier {
                GridTier::Decade => true,
                GridTier::HalfDecade => config.label_half_decades,
                GridTier::Year => false,
            };
            GridLine {
                year,
                x,
                y1: -height * GRID_LINE_REACH,
                y2: height * GRID_LINE_REACH,
                tier,
                label: labelled.then(|| GridLabel {
                    x: x + config.grid_label_dx,
                    y: label_y,
                    text: year.to_string(),
                }),
            }
        })
        .collect()
}
