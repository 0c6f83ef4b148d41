use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::ScanError;

use super::metadata::MetadataMap;
use super::model::{Track, TrackMetadata};

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Scan `dir` for audio files and merge persisted metadata by track id.
///
/// Tracks come back in file-name order. Unreadable entries below the root are
/// skipped; an unreadable root is an error.
pub fn scan(
    dir: &Path,
    settings: &LibrarySettings,
    metadata: &MetadataMap,
) -> Result<Vec<Track>, ScanError> {
    let meta = fs::metadata(dir).map_err(|e| ScanError::from_io(dir.to_path_buf(), e))?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }
    // Listing can still be refused even when stat succeeds.
    fs::read_dir(dir).map_err(|e| ScanError::from_io(dir.to_path_buf(), e))?;

    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    let mut tracks: Vec<Track> = Vec::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let Some(id) = path
            .strip_prefix(dir)
            .ok()
            .and_then(|rel| rel.to_str())
            .map(str::to_string)
        else {
            warn!(path = %path.display(), "skipping file with non-UTF-8 name");
            continue;
        };

        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        let defaults = TrackMetadata::default();
        let meta = metadata.get(&id).unwrap_or(&defaults);

        tracks.push(Track {
            id,
            title,
            uri: path.to_path_buf(),
            artist: meta.artist.clone(),
            lyrics: meta.lyrics.clone(),
        });
    }

    debug!(dir = %dir.display(), count = tracks.len(), "scan finished");
    Ok(tracks)
}
