// SPDX-License-Identifier: MIT

//!
//! Tracks and the items (events and periods) plotted on them
//!

use crate::{PinKey, TimePoint};
use serde::{Deserialize, Serialize};

/// The identifier of a track (the key used in the settings resource)
#[rustfmt::skip]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(derive_more::Display, derive_more::From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Per-track display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSettings {
    /// Vertical placement as a fraction of the viewport height (0 is the top)
    pub v_pos: f64,

    /// Whether to draw the track's baseline
    #[serde(default)]
    pub line: bool,

    /// Label drawn (rotated) just before the start of the track
    #[serde(default)]
    pub label: Option<String>,

    /// Whether event labels also show the event's date
    #[serde(default)]
    pub show_dates: bool,

    /// When `true` the track's ticks and labels grow and shrink with the
    /// scene instead of keeping a steady on-screen size
    #[serde(default)]
    pub scale_labels: bool,
}

impl TrackSettings {
    /// Whether the track's elements are rescaled on every zoom change
    pub fn rescales_with_zoom(&self) -> bool {
        !self.scale_labels
    }
}

/// A single instant on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub track_id: TrackId,
    pub label: String,
    pub date: TimePoint,
    pub focus: bool,
}

/// An interval on a track.  `start <= end` is expected of the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    pub track_id: TrackId,
    pub label: String,
    pub start: TimePoint,
    pub end: TimePoint,
    pub focus: bool,
    pub color: Option<String>,
}

impl Event {
    pub fn pin_key(&self) -> PinKey {
        PinKey::new(&self.track_id, &self.label)
    }
}

impl Period {
    pub fn pin_key(&self) -> PinKey {
        PinKey::new(&self.track_id, &self.label)
    }

    /// The instant halfway through the period (where its label is anchored)
    pub fn midpoint(&self) -> TimePoint {
        TimePoint::midpoint(self.start, self.end)
    }
}

/// One horizontal lane of the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: TrackId,
    pub events: Vec<Event>,
    pub periods: Vec<Period>,
    pub settings: TrackSettings,
}

impl Track {
    /// Create an empty track
    pub fn new(id: TrackId, settings: TrackSettings) -> Self {
        Self {
            id,
            events: Vec::new(),
            periods: Vec::new(),
            settings,
        }
    }

    /// Every timestamp on the track (focus ignored)
    pub fn timestamps(&self) -> impl Iterator<Item = TimePoint> + '_ {
        self.events.iter().map(|event| event.date).chain(
            self.periods
                .iter()
                .flat_map(|period| [period.start, period.end]),
        )
    }

    /// Every timestamp belonging to a focused item
    pub fn focused_timestamps(&self) -> impl Iterator<Item = TimePoint> + '_ {
        self.events
            .iter()
            .filter(|event| event.focus)
            .map(|event| event.date)
            .chain(
                self.periods
                    .iter()
                    .filter(|period| period.focus)
                    .flat_map(|period| [period.start, period.end]),
            )
    }

    /// Whether the track holds no events or periods
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.periods.is_empty()
    }
}
