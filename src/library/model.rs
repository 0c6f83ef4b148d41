use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Artist shown for tracks that have never been edited.
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// One playable file plus its display and lyrics metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Path relative to the scanned directory; the bare file name for a flat directory.
    pub id: String,
    /// File name without its extension.
    pub title: String,
    pub uri: PathBuf,
    pub artist: String,
    pub lyrics: Vec<String>,
}

impl Track {
    /// Overwrite the editable fields from persisted metadata.
    pub fn apply(&mut self, meta: &TrackMetadata) {
        self.artist = meta.artist.clone();
        self.lyrics = meta.lyrics.clone();
    }

    pub fn metadata(&self) -> TrackMetadata {
        TrackMetadata {
            artist: self.artist.clone(),
            lyrics: self.lyrics.clone(),
        }
    }
}

/// The user-editable part of a track, keyed by track id in the metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    #[serde(default = "unknown_artist")]
    pub artist: String,
    #[serde(default)]
    pub lyrics: Vec<String>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            artist: unknown_artist(),
            lyrics: Vec::new(),
        }
    }
}

impl TrackMetadata {
    /// Build metadata from the edit form: lyrics are one entry per line.
    pub fn from_form(artist: &str, lyrics_text: &str) -> Self {
        Self {
            artist: artist.to_string(),
            lyrics: lyrics_text.split('\n').map(str::to_string).collect(),
        }
    }
}

fn unknown_artist() -> String {
    UNKNOWN_ARTIST.to_string()
}
