//! Contract between the playback session and whatever produces sound.
//!
//! An engine opens one [`Binding`] per loaded track. Bindings push
//! [`StatusUpdate`](super::StatusUpdate)s tagged with the generation they were
//! opened with; how those updates reach the session is up to the engine
//! (the rodio engine uses an `mpsc` channel).

use std::path::Path;

use crate::error::PlaybackError;

use super::types::Generation;

/// Parameters for opening a binding.
#[derive(Debug, Clone, Copy)]
pub struct OpenRequest<'a> {
    pub uri: &'a Path,
    pub volume: f32,
    pub start_ms: u64,
    pub generation: Generation,
}

pub trait AudioEngine {
    type Binding: Binding;

    /// Open `request.uri` and return a binding that is ready but silent.
    ///
    /// Output starts on the first [`Binding::play`].
    fn open(&mut self, request: OpenRequest<'_>) -> Result<Self::Binding, PlaybackError>;
}

/// Handle to one loaded track. Commands are applied in issue order.
pub trait Binding {
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self) -> Result<(), PlaybackError>;
    /// Engine-reported playback position.
    fn position_ms(&self) -> u64;
    fn seek(&mut self, position_ms: u64) -> Result<(), PlaybackError>;
    fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError>;
    /// Stop output and free engine resources. No updates follow.
    fn release(self);
}
