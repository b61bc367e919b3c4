// SPDX-License-Identifier: MIT

//!
//! Layout params
//!

use crate::ScaleLaw;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// How far below the period bar its label sits, as a multiple of the tick
/// length
pub const PERIOD_LABEL_DROP: f64 = 1.125;

/// How far below the tick an event's date sits, as a multiple of the label
/// offset
pub const DATE_LABEL_DROP: f64 = 15.0 / 25.0;

/// The laws for every zoom-sensitive size.  These are set by users directly
/// and are never altered by zooming.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalableLayoutParams {
    pub tick_width: ScaleLaw,
    pub tick_length: ScaleLaw,
    pub label_offset: ScaleLaw,
    pub font_size: ScaleLaw,
    pub baseline_width: ScaleLaw,
}

/// The sizes derived from [`ScalableLayoutParams`] for one scale.  These are
/// not to be set by users directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomedLayoutParams {
    pub tick_width: f64,
    pub tick_length: f64,
    pub label_offset: f64,
    pub font_size: f64,
    pub baseline_width: f64,
}

impl ScalableLayoutParams {
    /// Evaluate every law at `scale`
    pub fn at(&self, scale: f64) -> ZoomedLayoutParams {
        ZoomedLayoutParams {
            tick_width: self.tick_width.at(scale),
            tick_length: self.tick_length.at(scale),
            label_offset: self.label_offset.at(scale),
            font_size: self.font_size.at(scale),
            baseline_width: self.baseline_width.at(scale),
        }
    }
}

impl ZoomedLayoutParams {
    /// Period bars are drawn half as thick as a tick is long
    pub fn period_bar_width(&self) -> f64 {
        self.tick_length * 0.5
    }

    pub fn period_label_drop(&self) -> f64 {
        self.tick_length * PERIOD_LABEL_DROP
    }

    pub fn date_label_drop(&self) -> f64 {
        self.label_offset * DATE_LABEL_DROP
    }
}
