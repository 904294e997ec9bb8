//! Persisted playback record
//!
//! Two shapes of the same data:
//! - [`PlaybackRecord`]: the stored schema, keyed by user identity
//! - [`PlaybackState`]: the validated in-memory form the transition engine works on
//!
//! During the enqueue window (between a nearly-finished callback and its
//! matching finished callback) `current_token` names the look-ahead track while
//! `current_track_index` still names the audible track. `next_stream_enqueued`
//! marks that window; outside it the token always equals the media key of the
//! track at `current_track_index`.

use crate::catalog::Catalog;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validated per-user playback state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    /// Always within catalog bounds
    pub current_track_index: usize,
    pub offset_ms: u64,
    pub current_token: String,
    /// True while a look-ahead stream is queued but not yet confirmed finished
    pub next_stream_enqueued: bool,
}

impl PlaybackState {
    /// State for a user identity seen for the first time
    pub fn initial(catalog: &Catalog) -> Self {
        Self {
            current_track_index: 0,
            offset_ms: 0,
            current_token: catalog.media_key(0).to_string(),
            next_stream_enqueued: false,
        }
    }

    /// Enforce catalog bounds on state that came from outside the engine
    ///
    /// An out-of-range index (catalog shrank, record edited by hand) is clamped
    /// to the last track rather than wrapped. An empty token is re-derived from
    /// the index. With no look-ahead pending the token must name the track at
    /// the index; otherwise it is re-pointed at that track.
    pub fn normalized(mut self, catalog: &Catalog) -> Self {
        if self.current_track_index > catalog.last_index() {
            warn!(
                "Persisted track index {} outside catalog of {} tracks, clamping to {}",
                self.current_track_index,
                catalog.len(),
                catalog.last_index()
            );
            self.current_track_index = catalog.last_index();
            self.current_token = catalog.media_key(self.current_track_index).to_string();
            self.next_stream_enqueued = false;
        }

        if self.current_token.is_empty()
            || (!self.next_stream_enqueued && !self.token_matches_index(catalog))
        {
            self.current_token = catalog.media_key(self.current_track_index).to_string();
        }

        self
    }

    /// Rebuild state from a stored record, applying defaults and bounds checks
    pub fn from_record(record: &PlaybackRecord, catalog: &Catalog) -> Self {
        let settings = &record.playback_settings;

        let index = if record.track_number < 0 {
            warn!("Persisted track number {} is negative, using 0", record.track_number);
            0
        } else {
            record.track_number as usize
        };

        let offset_ms = if settings.offset_in_milliseconds < 0 {
            warn!(
                "Persisted offset {}ms is negative, using 0",
                settings.offset_in_milliseconds
            );
            0
        } else {
            settings.offset_in_milliseconds as u64
        };

        Self {
            current_track_index: index,
            offset_ms,
            current_token: settings.token.clone().unwrap_or_default(),
            next_stream_enqueued: settings.next_stream_enqueued,
        }
        .normalized(catalog)
    }

    /// True when the token names the track at `current_track_index`
    pub fn token_matches_index(&self, catalog: &Catalog) -> bool {
        catalog
            .get(self.current_track_index)
            .is_some_and(|t| t.media_key == self.current_token)
    }
}

/// Stored record schema
///
/// Field names match the layout the skill has always written, so existing
/// rows keep loading after upgrades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackRecord {
    #[serde(rename = "trackNumber", default)]
    pub track_number: i64,
    #[serde(default)]
    pub playback_settings: PlaybackSettings,
}

/// Nested playback settings of a [`PlaybackRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackSettings {
    #[serde(default)]
    pub token: Option<String>,
    /// Last signed URL handed to the playback client
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub offset_in_milliseconds: i64,
    #[serde(default)]
    pub next_stream_enqueued: bool,
}

impl PlaybackRecord {
    /// Record to store for `state`, remembering the URL most recently issued
    pub fn from_state(state: &PlaybackState, url: Option<String>) -> Self {
        Self {
            track_number: state.current_track_index as i64,
            playback_settings: PlaybackSettings {
                token: Some(state.current_token.clone()),
                url,
                offset_in_milliseconds: i64::try_from(state.offset_ms).unwrap_or(i64::MAX),
                next_stream_enqueued: state.next_stream_enqueued,
            },
        }
    }
}
