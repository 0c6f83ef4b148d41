//! Whole-document persistence of per-track artist and lyrics.
//!
//! The document is a JSON array of `{ "id", "artist", "lyrics" }` records.
//! Extra fields (older files also carried `title` and `uri`) are ignored, and
//! an object keyed by id is accepted as well. Every write replaces the file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PersistenceError;

use super::model::TrackMetadata;

pub type MetadataMap = BTreeMap<String, TrackMetadata>;

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    id: String,
    #[serde(flatten)]
    meta: TrackMetadata,
}

/// Reads and replaces the metadata document at a fixed path.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the whole document. A missing document is created empty.
    pub fn read_all(&self) -> Result<MetadataMap, PersistenceError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "metadata document missing, creating it");
                let empty = MetadataMap::new();
                self.write_all(&empty)?;
                return Ok(empty);
            }
            Err(e) => return Err(self.io_err(e)),
        };

        let body = data.trim_start();
        if body.is_empty() {
            return Ok(MetadataMap::new());
        }

        // Dispatch on the opening bracket so parse errors keep their line and column.
        let parsed = if body.starts_with('{') {
            serde_json::from_str::<MetadataMap>(&data)
        } else {
            serde_json::from_str::<Vec<Record>>(&data)
                // Later records win, matching a find-then-replace on save.
                .map(|records| records.into_iter().map(|r| (r.id, r.meta)).collect())
        };
        parsed.map_err(|e| self.json_err(e))
    }

    /// Replace the whole document with `map`.
    ///
    /// The new content goes to a sibling temp file first so a failed write
    /// leaves the previous document in place.
    pub fn write_all(&self, map: &MetadataMap) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let records: Vec<Record> = map
            .iter()
            .map(|(id, meta)| Record {
                id: id.clone(),
                meta: meta.clone(),
            })
            .collect();
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| self.json_err(e))?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }

    /// Insert or replace the entry for `id` and rewrite the document.
    pub fn upsert(&self, id: &str, meta: TrackMetadata) -> Result<MetadataMap, PersistenceError> {
        let mut map = self.read_all()?;
        map.insert(id.to_string(), meta);
        self.write_all(&map)?;
        info!(id, path = %self.path.display(), "saved track metadata");
        Ok(map)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn json_err(&self, source: serde_json::Error) -> PersistenceError {
        PersistenceError::Json {
            path: self.path.clone(),
            source,
        }
    }

    fn io_err(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
