// SPDX-License-Identifier: MIT

//!
//! Assemble the raw resources into validated tracks
//!

use crate::{
    Event, Extent, ExtentError, Period, RawItem, SettingsResource, TimePoint, TimePointError,
    Track, TrackId, TrackSettings, ViewState, global_extent,
};
use log::{debug, info};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can arise while assembling a [`Dataset`]
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Data was loaded for a track that has no settings
    #[error("No settings found for track `{0}`")]
    MissingSettings(TrackId),

    /// A track has settings but no data was loaded for it
    #[error("No data found for track `{0}`")]
    MissingData(TrackId),

    /// An item's date couldn't be parsed.  The whole load fails.
    #[error("Item {index} of track `{track}`: {source}")]
    Item {
        track: TrackId,
        index: usize,
        #[source]
        source: TimePointError,
    },

    #[error(transparent)]
    Extent(#[from] ExtentError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Every track, ready to be laid out, and the global extent derived from them
#[derive(Debug, Clone)]
pub struct Dataset {
    tracks: Vec<Track>,
    global_extent: Extent,
    view: ViewState,
}

impl Dataset {
    /// Build the dataset.  Tracks are ordered as in `settings`.
    ///
    /// Fails if any item has a malformed date, if data and settings don't
    /// cover the same tracks, or if no item is focused.
    pub fn assemble(
        settings: SettingsResource,
        data: HashMap<TrackId, Vec<RawItem>>,
        view: Option<ViewState>,
    ) -> Result<Self, DatasetError> {
        info!("Assembling dataset for {} tracks", settings.len());

        // Fail fast on data with no settings
        if let Some(orphan) = data.keys().find(|id| settings.get(id).is_none()) {
            return Err(DatasetError::MissingSettings(orphan.clone()));
        }

        let mut data = data;
        let mut tracks = Vec::with_capacity(settings.len());
        for id in settings.ids() {
            let items = data
                .remove(id)
                .ok_or_else(|| DatasetError::MissingData(id.clone()))?;
            let track_settings = settings
                .get(id)
                .cloned()
                .ok_or_else(|| DatasetError::MissingSettings(id.clone()))?;
            let track = build_track(id.clone(), track_settings, items)?;
            debug!(
                "Track `{}`: {} events, {} periods",
                track.id,
                track.events.len(),
                track.periods.len()
            );
            tracks.push(track);
        }

        let global_extent = global_extent(&tracks)?;
        info!(
            "Global extent is {} to {}",
            global_extent.min(),
            global_extent.max()
        );

        Ok(Self {
            tracks,
            global_extent,
            view: view.unwrap_or_default(),
        })
    }

    /// Assemble from JSON text (the settings object, one items array per
    /// track, and the optional view-state object)
    pub fn from_json(
        settings: &str,
        data: &[(TrackId, &str)],
        view: Option<&str>,
    ) -> Result<Self, DatasetError> {
        let settings = SettingsResource::from_json_str(settings)?;
        let mut parsed = HashMap::new();
        for (id, json) in data {
            let items: Vec<RawItem> = serde_json::from_str(json)?;
            parsed.insert(id.clone(), items);
        }
        let view = match view {
            Some(json) => Some(serde_json::from_str(json)?),
            None => None,
        };
        Self::assemble(settings, parsed, view)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn global_extent(&self) -> Extent {
        self.global_extent
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }
}

/// Parse every item of one track
fn build_track(
    id: TrackId,
    settings: TrackSettings,
    items: Vec<RawItem>,
) -> Result<Track, DatasetError> {
    let mut track = Track::new(id, settings);
    for (index, item) in items.into_iter().enumerate() {
        let parse = |text: &str| {
            TimePoint::parse(text).map_err(|source| DatasetError::Item {
                track: track.id.clone(),
                index,
                source,
            })
        };
        match item {
            RawItem::Event { date, label, focus } => {
                let date = parse(&date)?;
                track.events.push(Event {
                    track_id: track.id.clone(),
                    label,
                    date,
                    focus,
                });
            }
            RawItem::Period {
                date_start,
                date_end,
                label,
                focus,
                color,
            } => {
                let start = parse(&date_start)?;
                let end = parse(&date_end)?;
                track.periods.push(Period {
                    track_id: track.id.clone(),
                    label,
                    start,
                    end,
                    focus,
                    color,
                });
            }
        }
    }
    Ok(track)
}

#[cfg(test)]
mod test {
    use super::*;

    const SETTINGS: &str = r#"{
        "people": {"vPos": 0.3, "line": true, "label": "People"},
        "eras": {"vPos": 0.6, "showDates": true}
    }"#;

    const PEOPLE: &str = r#"[
        {"type": "event", "date": "1900.05.01.", "label": "Born", "focus": true}
    ]"#;

    const ERAS: &str = r#"[
        {"type": "period", "dateStart": "1950.01.01.", "dateEnd": "1960.01.01.", "label": "Fifties", "focus": true},
        {"type": "event", "date": "2001.01.01.", "label": "Later"}
    ]"#;

    #[test]
    fn assemble() {
        let dataset = Dataset::from_json(
            SETTINGS,
            &[(TrackId::from("eras"), ERAS), (TrackId::from("people"), PEOPLE)],
            Some(r#"{"pinnedLabels": ["eras::Fifties"]}"#),
        )
        .unwrap();

        // Settings order is kept
        let ids: Vec<_> = dataset.tracks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["people", "eras"]);

        // Unfocused items don't widen the global extent
        let extent = dataset.global_extent();
        assert_eq!(extent.min(), TimePoint::parse("1900.05.01.").unwrap());
        assert_eq!(extent.max(), TimePoint::parse("1960.01.01.").unwrap());

        assert_eq!(dataset.view().pinned_labels.len(), 1);
        assert_eq!(dataset.tracks()[1].periods[0].pin_key().as_str(), "eras::Fifties");
    }

    #[test]
    fn missing_settings_fails_fast() {
        let error = Dataset::from_json(
            SETTINGS,
            &[
                (TrackId::from("eras"), ERAS),
                (TrackId::from("people"), PEOPLE),
                (TrackId::from("stray"), PEOPLE),
            ],
            None,
        )
        .unwrap_err();
        assert!(matches!(error, DatasetError::MissingSettings(id) if id.as_str() == "stray"));
    }

    #[test]
    fn missing_data() {
        let error =
            Dataset::from_json(SETTINGS, &[(TrackId::from("eras"), ERAS)], None).unwrap_err();
        assert!(matches!(error, DatasetError::MissingData(id) if id.as_str() == "people"));
    }

    #[test]
    fn bad_date_fails_whole_load() {
        let bad = r#"[
            {"type": "event", "date": "1900.05.01.", "label": "Ok", "focus": true},
            {"type": "event", "date": "1900/05/01", "label": "Bad"}
        ]"#;
        let error = Dataset::from_json(
            SETTINGS,
            &[(TrackId::from("eras"), ERAS), (TrackId::from("people"), bad)],
            None,
        )
        .unwrap_err();
        match error {
            DatasetError::Item { track, index, .. } => {
                assert_eq!(track.as_str(), "people");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn no_focus_is_fatal() {
        let unfocused = r#"[{"type": "event", "date": "1900.05.01.", "label": "A"}]"#;
        let error = Dataset::from_json(
            r#"{"a": {"vPos": 0.5}}"#,
            &[(TrackId::from("a"), unfocused)],
            None,
        )
        .unwrap_err();
        assert!(matches!(
            error,
            DatasetError::Extent(ExtentError::NoFocusedItems)
        ));
    }
}
