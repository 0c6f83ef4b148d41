//! Error types surfaced to the user as one-shot notices.
//!
//! None of these are fatal: the caller logs them, shows a notice, and keeps
//! the previous in-memory state.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while opening or driving an audio binding.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The audio file could not be opened (missing, permission denied, ...).
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file opened but could not be decoded.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// No audio output device is available.
    #[error("no audio output device: {0}")]
    Output(String),

    /// Rebuilding the sink at the new position failed; the old sink keeps playing.
    #[error("seek failed: {0}")]
    Seek(String),
}

/// Failures while scanning the music directory.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("music directory not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied for music directory: {0}")]
    PermissionDenied(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub(crate) fn from_io(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source: err },
        }
    }
}

/// Failures while reading or writing the metadata document.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed metadata document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
