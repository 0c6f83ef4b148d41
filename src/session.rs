//! Playback session: the state machine between the catalog and the audio engine.
//!
//! `PlaybackSession` owns which track is loaded, play/pause state,
//! position/duration, volume and play mode, and sequences track transitions.
//! Sound itself comes from an [`AudioEngine`] implementation.

mod engine;
mod model;
mod policy;
mod types;

pub use engine::{AudioEngine, Binding, OpenRequest};
pub use model::PlaybackSession;
pub use policy::{AdvanceTarget, resolve_advance};
pub use types::{Direction, Generation, PlayMode, PlayState, StatusUpdate};

#[cfg(test)]
pub(crate) mod fake;
