//! Recording engine used by the session and app tests.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::PlaybackError;
use crate::library::{Track, UNKNOWN_ARTIST};

use super::engine::{AudioEngine, Binding, OpenRequest};
use super::types::Generation;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open {
        uri: PathBuf,
        volume: f32,
        start_ms: u64,
        generation: Generation,
    },
    Play(Generation),
    Pause(Generation),
    Seek(Generation, u64),
    Volume(Generation, f32),
    Release(Generation),
}

/// Shared handles stay with the test after the engine moves into a session.
#[derive(Default, Clone)]
pub struct FakeEngine {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub missing: Rc<RefCell<HashSet<PathBuf>>>,
    pub position_ms: Rc<Cell<u64>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `open` fail for `uri` as if the file were gone.
    pub fn fail_on(&self, uri: impl Into<PathBuf>) {
        self.missing.borrow_mut().insert(uri.into());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Open { uri, .. } => Some(uri.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct FakeBinding {
    generation: Generation,
    calls: Rc<RefCell<Vec<Call>>>,
    position_ms: Rc<Cell<u64>>,
}

impl AudioEngine for FakeEngine {
    type Binding = FakeBinding;

    fn open(&mut self, request: OpenRequest<'_>) -> Result<FakeBinding, PlaybackError> {
        if self.missing.borrow().contains(request.uri) {
            return Err(PlaybackError::Open {
                path: request.uri.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        self.calls.borrow_mut().push(Call::Open {
            uri: request.uri.to_path_buf(),
            volume: request.volume,
            start_ms: request.start_ms,
            generation: request.generation,
        });
        self.position_ms.set(request.start_ms);
        Ok(FakeBinding {
            generation: request.generation,
            calls: self.calls.clone(),
            position_ms: self.position_ms.clone(),
        })
    }
}

impl Binding for FakeBinding {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.calls.borrow_mut().push(Call::Play(self.generation));
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.calls.borrow_mut().push(Call::Pause(self.generation));
        Ok(())
    }

    fn position_ms(&self) -> u64 {
        self.position_ms.get()
    }

    fn seek(&mut self, position_ms: u64) -> Result<(), PlaybackError> {
        self.position_ms.set(position_ms);
        self.calls
            .borrow_mut()
            .push(Call::Seek(self.generation, position_ms));
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
        self.calls
            .borrow_mut()
            .push(Call::Volume(self.generation, volume));
        Ok(())
    }

    fn release(self) {
        self.calls.borrow_mut().push(Call::Release(self.generation));
    }
}

pub fn track(id: &str) -> Track {
    let title = Path::new(id)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(id)
        .to_string();
    Track {
        id: id.to_string(),
        title,
        uri: PathBuf::from("/music").join(id),
        artist: UNKNOWN_ARTIST.to_string(),
        lyrics: Vec::new(),
    }
}

pub fn catalog(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}
