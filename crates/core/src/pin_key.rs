// SPDX-License-Identifier: MIT

//!
//! The stable identity used to persist an item's pinned state
//!

use crate::TrackId;
use serde::{Deserialize, Serialize};

/// The separator between the track ID and the label
pub const PIN_KEY_SEPARATOR: &str = "::";

/// `trackId::label`.  Two items on the same track with the same label share a
/// key (and therefore a pinned state).
#[rustfmt::skip]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(derive_more::Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinKey(String);

impl PinKey {
    pub fn new(track_id: &TrackId, label: &str) -> Self {
        Self(format!("{track_id}{PIN_KEY_SEPARATOR}{label}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PinKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
