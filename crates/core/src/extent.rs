// SPDX-License-Identifier: MIT

//!
//! Time extents (the earliest and latest instants of a set of items)
//!

use crate::{TimePoint, Track, TrackId};
use log::debug;
use serde::Serialize;
use thiserror::Error;

/// Errors that can arise when computing an [`Extent`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtentError {
    /// No item on any track is marked `focus`, so there is nothing to build
    /// the shared axis from
    #[error("No focused events or periods were found")]
    NoFocusedItems,

    /// The track holds no events or periods
    #[error("Track `{0}` has no events or periods")]
    EmptyTrack(TrackId),
}

/// A `[min, max]` time range with `min < max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extent {
    min: TimePoint,
    max: TimePoint,
}

impl Extent {
    /// Create the extent of the given instants.  If every instant is the same
    /// the max is advanced by one day so the extent is never zero-width.
    pub fn of<I>(instants: I) -> Option<Self>
    where
        I: IntoIterator<Item = TimePoint>,
    {
        let mut instants = instants.into_iter();
        let first = instants.next()?;
        let (min, max) = instants.fold((first, first), |(min, max), instant| {
            (min.min(instant), max.max(instant))
        });
        Some(Self::new(min, max))
    }

    /// Create an extent (the values are swapped if `min > max`, and the one
    /// day advance is applied if they're equal)
    pub fn new(min: TimePoint, max: TimePoint) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let max = if min == max {
            debug!("Degenerate extent at {min}, advancing max by one day");
            min.add_days(1)
        } else {
            max
        };
        Self { min, max }
    }

    pub fn min(&self) -> TimePoint {
        self.min
    }

    pub fn max(&self) -> TimePoint {
        self.max
    }

    /// The length of the extent in milliseconds (always positive)
    pub fn span_millis(&self) -> i64 {
        self.max.as_millis() - self.min.as_millis()
    }

    /// The position of `instant` as a fraction of the extent (0 at `min`, 1 at
    /// `max`, extrapolated outside of it)
    pub fn fraction_of(&self, instant: TimePoint) -> f64 {
        (instant.as_millis() - self.min.as_millis()) as f64 / self.span_millis() as f64
    }

    pub fn contains(&self, instant: TimePoint) -> bool {
        self.min <= instant && instant <= self.max
    }
}

/// The extent of every focused timestamp across all tracks
pub fn global_extent(tracks: &[Track]) -> Result<Extent, ExtentError> {
    Extent::of(tracks.iter().flat_map(|track| track.focused_timestamps()))
        .ok_or(ExtentError::NoFocusedItems)
}

/// The extent of every timestamp on the track (focus ignored)
pub fn local_extent(track: &Track) -> Result<Extent, ExtentError> {
    Extent::of(track.timestamps()).ok_or_else(|| ExtentError::EmptyTrack(track.id.clone()))
}
