// SPDX-License-Identifier: MIT

//!
//! The raw (as loaded) data resources
//!

use crate::{PinKey, TrackId, TrackSettings};
use serde::{Deserialize, Serialize};

/// An item as it appears in a per-track data resource.  Dates are still text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawItem {
    Event {
        date: String,
        label: String,
        #[serde(default)]
        focus: bool,
    },
    Period {
        #[serde(rename = "dateStart")]
        date_start: String,
        #[serde(rename = "dateEnd")]
        date_end: String,
        label: String,
        #[serde(default)]
        focus: bool,
        #[serde(default)]
        color: Option<String>,
    },
}

/// The settings resource: track ID -> [`TrackSettings`].  The order of the
/// entries is the order the tracks are drawn in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsResource(Vec<(TrackId, TrackSettings)>);

impl SettingsResource {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add (or replace) the settings for a track
    pub fn insert(&mut self, id: TrackId, settings: TrackSettings) {
        match self.0.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = settings,
            None => self.0.push((id, settings)),
        }
    }

    pub fn get(&self, id: &TrackId) -> Option<&TrackSettings> {
        self.0
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, settings)| settings)
    }

    /// The track IDs, in order
    pub fn ids(&self) -> impl Iterator<Item = &TrackId> {
        self.0.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the JSON object form, keeping the key order
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<'de> Deserialize<'de> for SettingsResource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // `serde_json` is built with `preserve_order`, so the map keeps the
        // document's key order
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut settings = SettingsResource::new();
        for (id, value) in map {
            let track_settings = TrackSettings::deserialize(value).map_err(|error| {
                serde::de::Error::custom(format!("settings for track `{id}`: {error}"))
            })?;
            settings.insert(TrackId::new(id), track_settings);
        }
        Ok(settings)
    }
}

/// The optional view-state resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Keys of the labels that start pinned
    #[serde(default)]
    pub pinned_labels: Vec<PinKey>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn raw_items() {
        let json = r#"[
            {"type": "event", "date": "1900.05.01.", "label": "A", "focus": true},
            {"type": "period", "dateStart": "1950.01.01.", "dateEnd": "1960.01.01.", "label": "B", "color": "red"},
            {"type": "event", "date": "1901.05.01.", "label": "C"}
        ]"#;
        let items: Vec<RawItem> = serde_json::from_str(json).unwrap();
        assert_eq!(
            items[0],
            RawItem::Event {
                date: "1900.05.01.".to_string(),
                label: "A".to_string(),
                focus: true
            }
        );
        assert_eq!(
            items[1],
            RawItem::Period {
                date_start: "1950.01.01.".to_string(),
                date_end: "1960.01.01.".to_string(),
                label: "B".to_string(),
                focus: false,
                color: Some("red".to_string())
            }
        );
        assert!(matches!(items[2], RawItem::Event { focus: false, .. }));
    }

    #[test]
    fn unknown_item_type() {
        let json = r#"{"type": "era", "date": "1900.05.01.", "label": "A"}"#;
        assert!(serde_json::from_str::<RawItem>(json).is_err());
    }

    #[test]
    fn settings_keep_order() {
        let json = r#"{
            "zeta": {"vPos": 0.1},
            "alpha": {"vPos": 0.2, "line": true, "label": "Alpha"}
        }"#;
        let settings = SettingsResource::from_json_str(json).unwrap();
        let ids: Vec<_> = settings.ids().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
        let alpha = settings.get(&TrackId::from("alpha")).unwrap();
        assert!(alpha.line);
        assert_eq!(alpha.label.as_deref(), Some("Alpha"));
    }

    #[test]
    fn settings_errors_name_the_track() {
        let json = r#"{"broken": {"line": true}}"#;
        let error = SettingsResource::from_json_str(json).unwrap_err();
        assert!(error.to_string().contains("broken"));
    }

    #[test]
    fn view_state() {
        let view: ViewState = serde_json::from_str(r#"{"pinnedLabels": ["a::x"]}"#).unwrap();
        assert_eq!(view.pinned_labels, vec![PinKey::from("a::x")]);
        let empty: ViewState = serde_json::from_str("{}").unwrap();
        assert!(empty.pinned_labels.is_empty());
    }
}
