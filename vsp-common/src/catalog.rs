//! Track catalog
//!
//! The catalog is the ordered playlist the skill cycles through. It is loaded
//! once at startup from a TOML file and is read-only for the lifetime of the
//! process; indices are assigned by position (`0..N-1`).
//!
//! ```toml
//! [[tracks]]
//! title = "Borderline"
//! artist = "Removal Men"
//! media_key = "Media/RemovalMen_Borderline.mp3"
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One playable track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// Ordinal position in the catalog
    pub index: usize,
    pub title: String,
    pub artist: String,
    /// Stable storage key; doubles as the playback token
    pub media_key: String,
}

/// Track entry as written in the catalog file (no index)
#[derive(Debug, Clone, Deserialize)]
pub struct TrackEntry {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    pub media_key: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tracks: Vec<TrackEntry>,
}

/// Immutable ordered sequence of N >= 1 tracks
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build a catalog from file entries, assigning indices by position
    pub fn new(entries: Vec<TrackEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Catalog("catalog must contain at least one track".to_string()));
        }

        let mut tracks = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if entry.media_key.trim().is_empty() {
                return Err(Error::Catalog(format!("track {} has an empty media_key", index)));
            }
            tracks.push(Track {
                index,
                title: entry.title,
                artist: entry.artist,
                media_key: entry.media_key,
            });
        }

        Ok(Self { tracks })
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| Error::Catalog(format!("Failed to parse catalog: {}", e)))?;
        Self::new(file.tracks)
    }

    /// Load the catalog file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Catalog(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_toml_str(&content)?;
        info!("Loaded catalog with {} tracks from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Number of tracks (always >= 1)
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Index of the final track
    pub fn last_index(&self) -> usize {
        self.tracks.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Track at `index`, clamped to the last track when out of range
    pub fn track(&self, index: usize) -> &Track {
        &self.tracks[index.min(self.last_index())]
    }

    /// Media key of the track at `index` (clamped like [`Catalog::track`])
    pub fn media_key(&self, index: usize) -> &str {
        &self.track(index).media_key
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}
