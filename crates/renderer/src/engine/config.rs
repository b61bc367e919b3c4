// SPDX-License-Identifier: MIT

//!
//! View configuration
//!

use crate::{ScalableLayoutParams, ScaleLaw, TimelineColours, ZoomBounds};
use chronolane_core::DateLocale;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can arise when loading a [`ViewConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Zoom bounds [{min}, {max}] must satisfy 0 < min <= max")]
    ZoomBounds { min: f64, max: f64 },

    #[error("Size `{name}` needs a base >= 0 and an upper threshold > 0, got {law:?}")]
    ScaleLaw { name: &'static str, law: ScaleLaw },

    #[error("`{name}` must be a finite number >= 0, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Every tunable of the timeline view.  Missing fields take their default
/// value when deserialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    /// The right margin.  The left margin is twice this.
    pub margin: f64,

    /// The allowed zoom range
    pub zoom_bounds: ZoomBounds,

    /// The zoom-sensitive sizes
    pub layout: ScalableLayoutParams,

    /// Rotation (degrees) of event labels
    pub event_label_rotation: f64,

    /// Horizontal nudge of event date labels from the tick
    pub event_date_dx: f64,

    /// How far left of a track's start its label is drawn
    pub track_label_gap: f64,

    /// Stroke width of a hovered period bar
    pub period_hover_width: f64,

    /// Years of grid drawn beyond each edge of the visible window
    pub grid_overscan_years: i32,

    /// Horizontal offset of a grid label from its line
    pub grid_label_dx: f64,

    /// Distance of grid labels from the top of the viewport
    pub grid_label_top: f64,

    /// Whether half-decade grid lines are labelled
    pub label_half_decades: bool,

    /// Locale of event date labels
    pub date_locale: DateLocale,

    pub colours: TimelineColours,
}

impl ViewConfig {
    /// Zoom range [1, 10], labels at -45°, the font size stops shrinking at
    /// 6x and everything else at 5x.  Half-decade lines are labelled.
    pub fn pinned_view() -> Self {
        Self {
            margin: 50.0,
            zoom_bounds: ZoomBounds::new(1.0, 10.0),
            layout: ScalableLayoutParams {
                tick_width: ScaleLaw::new(3.0, 5.0),
                tick_length: ScaleLaw::new(30.0, 5.0),
                label_offset: ScaleLaw::new(25.0, 5.0),
                font_size: ScaleLaw::new(18.0, 6.0),
                baseline_width: ScaleLaw::new(5.0, 5.0),
            },
            event_label_rotation: -45.0,
            event_date_dx: 0.0,
            track_label_gap: 40.0,
            period_hover_width: 6.0,
            grid_overscan_years: 100,
            grid_label_dx: 14.0,
            grid_label_top: 20.0,
            label_half_decades: true,
            date_locale: DateLocale::Hungarian,
            colours: TimelineColours::default(),
        }
    }

    /// Zoom range [0.5, 10], labels at -22.5°, every size stops shrinking at
    /// 5x.  Half-decade lines are not labelled.
    pub fn wide_zoom() -> Self {
        Self {
            zoom_bounds: ZoomBounds::new(0.5, 10.0),
            layout: ScalableLayoutParams {
                tick_width: ScaleLaw::new(5.0, 5.0),
                tick_length: ScaleLaw::new(25.0, 5.0),
                label_offset: ScaleLaw::new(25.0, 5.0),
                font_size: ScaleLaw::new(14.0, 5.0),
                baseline_width: ScaleLaw::new(7.0, 5.0),
            },
            event_label_rotation: -22.5,
            event_date_dx: 4.0,
            label_half_decades: false,
            ..Self::pinned_view()
        }
    }

    /// Parse and validate a (possibly partial) JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ViewConfig = serde_json::from_str(json)?;
        config.validate()?;
        info!("View config loaded = {config:?}");
        Ok(config)
    }

    /// Check every value a gesture could trip over
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.zoom_bounds.is_valid() {
            return Err(ConfigError::ZoomBounds {
                min: self.zoom_bounds.min,
                max: self.zoom_bounds.max,
            });
        }

        let layout = &self.layout;
        for (name, law) in [
            ("tickWidth", layout.tick_width),
            ("tickLength", layout.tick_length),
            ("labelOffset", layout.label_offset),
            ("fontSize", layout.font_size),
            ("baselineWidth", layout.baseline_width),
        ] {
            if !law.is_valid() {
                return Err(ConfigError::ScaleLaw { name, law });
            }
        }

        for (name, value) in [
            ("margin", self.margin),
            ("periodHoverWidth", self.period_hover_width),
            ("gridOverscanYears", f64::from(self.grid_overscan_years)),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::Negative { name, value });
            }
        }
        Ok(())
    }

    pub fn left_margin(&self) -> f64 {
        self.margin * 2.0
    }

    pub fn right_margin(&self) -> f64 {
        self.margin
    }
}

/// [`ViewConfig::pinned_view`] but allowing zooming out to 0.5x
impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom_bounds: ZoomBounds::new(0.5, 10.0),
            ..Self::pinned_view()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn presets_differ_where_observed() {
        let pinned = ViewConfig::pinned_view();
        let wide = ViewConfig::wide_zoom();
        assert_eq!(pinned.zoom_bounds, ZoomBounds::new(1.0, 10.0));
        assert_eq!(wide.zoom_bounds, ZoomBounds::new(0.5, 10.0));
        assert_eq!(pinned.event_label_rotation, -45.0);
        assert_eq!(wide.event_label_rotation, -22.5);
        assert_eq!(pinned.layout.font_size.upper_threshold, 6.0);
        assert_eq!(wide.layout.font_size.upper_threshold, 5.0);
    }

    #[test]
    fn default_is_pinned_view_with_zoom_out() {
        let config = ViewConfig::default();
        assert_eq!(config.zoom_bounds, ZoomBounds::new(0.5, 10.0));
        assert_eq!(config.layout, ViewConfig::pinned_view().layout);
        assert_eq!(config.left_margin(), 100.0);
        assert_eq!(config.right_margin(), 50.0);
    }

    #[test]
    fn partial_json() {
        let config = ViewConfig::from_json_str(
            r#"{"margin": 20, "layout": {
                "tickWidth": {"base": 1, "upperThreshold": 2},
                "tickLength": {"base": 10, "upperThreshold": 2},
                "labelOffset": {"base": 10, "upperThreshold": 2},
                "fontSize": {"base": 12, "upperThreshold": 3},
                "baselineWidth": {"base": 2, "upperThreshold": 2}
            }, "dateLocale": "english"}"#,
        )
        .unwrap();
        assert_eq!(config.margin, 20.0);
        assert_eq!(config.layout.font_size, ScaleLaw::new(12.0, 3.0));
        assert_eq!(config.date_locale, DateLocale::English);
        assert_eq!(config.zoom_bounds, ViewConfig::default().zoom_bounds);
    }

    #[test]
    fn presets_are_valid() {
        assert!(ViewConfig::default().validate().is_ok());
        assert!(ViewConfig::pinned_view().validate().is_ok());
        assert!(ViewConfig::wide_zoom().validate().is_ok());
    }

    #[test]
    fn inverted_zoom_bounds_are_rejected() {
        let result = ViewConfig::from_json_str(r#"{"zoomBounds": {"min": 10, "max": 1}}"#);
        assert!(matches!(
            result,
            Err(ConfigError::ZoomBounds { min, max }) if min == 10.0 && max == 1.0
        ));
        let result = ViewConfig::from_json_str(r#"{"zoomBounds": {"min": 0, "max": 10}}"#);
        assert!(matches!(result, Err(ConfigError::ZoomBounds { .. })));
        let result = ViewConfig::from_json_str(r#"{"zoomBounds": {"min": -1, "max": 10}}"#);
        assert!(matches!(result, Err(ConfigError::ZoomBounds { .. })));
    }

    #[test]
    fn bad_scale_laws_are_rejected() {
        let mut config = ViewConfig::default();
        config.layout.font_size = ScaleLaw::new(18.0, 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScaleLaw { name: "fontSize", .. })
        ));

        let mut config = ViewConfig::default();
        config.layout.tick_width = ScaleLaw::new(-3.0, 5.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScaleLaw { name: "tickWidth", .. })
        ));

        let mut config = ViewConfig::default();
        config.layout.baseline_width = ScaleLaw::new(f64::NAN, 5.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScaleLaw { name: "baselineWidth", .. })
        ));
    }

    #[test]
    fn negative_sizes_are_rejected() {
        let result = ViewConfig::from_json_str(r#"{"margin": -5}"#);
        assert!(matches!(result, Err(ConfigError::Negative { name: "margin", .. })));

        let mut config = ViewConfig::default();
        config.grid_overscan_years = -1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { name: "gridOverscanYears", .. })
        ));
    }

    #[test]
    fn malformed_json() {
        let result = ViewConfig::from_json_str("{margin");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
