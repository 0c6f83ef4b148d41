use tracing::{debug, info, trace, warn};

use crate::error::PlaybackError;
use crate::library::{Track, TrackMetadata};

use super::engine::{AudioEngine, Binding, OpenRequest};
use super::policy::{AdvanceTarget, resolve_advance};
use super::types::{Direction, Generation, PlayMode, PlayState, StatusUpdate};

struct Bound<B> {
    generation: Generation,
    binding: B,
}

fn random_index(len: usize) -> usize {
    rand::random_range(0..len)
}

/// The single playback session: loaded track, play state, position, volume
/// and play mode, plus the transitions between tracks.
///
/// All mutation goes through the methods below; callers are expected to
/// serialize user intents and engine status updates onto one thread.
pub struct PlaybackSession<E: AudioEngine> {
    engine: E,
    bound: Option<Bound<E::Binding>>,
    last_generation: Generation,

    current: Option<Track>,
    state: PlayState,
    position_ms: u64,
    duration_ms: u64,
    volume: f32,
    mode: PlayMode,
    catalog: Vec<Track>,

    shuffle_picker: fn(usize) -> usize,
}

impl<E: AudioEngine> PlaybackSession<E> {
    pub fn new(engine: E, catalog: Vec<Track>) -> Self {
        Self {
            engine,
            bound: None,
            last_generation: Generation::default(),
            current: None,
            state: PlayState::Stopped,
            position_ms: 0,
            duration_ms: 0,
            volume: 1.0,
            mode: PlayMode::Normal,
            catalog,
            shuffle_picker: random_index,
        }
    }

    /// Replace the random source used in shuffle mode. `picker(len)` must return `< len`.
    pub fn with_shuffle_picker(mut self, picker: fn(usize) -> usize) -> Self {
        self.shuffle_picker = picker;
        self
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn play_state(&self) -> PlayState {
        self.state
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn play_mode(&self) -> PlayMode {
        self.mode
    }

    pub fn catalog(&self) -> &[Track] {
        &self.catalog
    }

    /// Generation of the live binding, if any.
    pub fn generation(&self) -> Option<Generation> {
        self.bound.as_ref().map(|b| b.generation)
    }

    /// Load `track` and start playing it from `start_ms`.
    ///
    /// The new binding is opened before the old one is released, but stays
    /// silent until the old one is gone. If opening fails nothing changes.
    pub fn load(&mut self, track: Track, start_ms: u64) -> Result<(), PlaybackError> {
        let generation = self.last_generation.next();
        self.last_generation = generation;

        let mut binding = self.engine.open(OpenRequest {
            uri: &track.uri,
            volume: self.volume,
            start_ms,
            generation,
        })?;

        if let Some(old) = self.bound.take() {
            debug!(generation = old.generation.0, "releasing previous binding");
            old.binding.release();
        }

        if let Err(e) = binding.play() {
            // The old binding is already gone; fall back to a clean stop.
            binding.release();
            self.state = PlayState::Stopped;
            self.position_ms = 0;
            self.duration_ms = 0;
            return Err(e);
        }

        info!(id = %track.id, generation = generation.0, start_ms, "loaded track");
        self.bound = Some(Bound {
            generation,
            binding,
        });
        self.current = Some(track);
        self.state = PlayState::Playing;
        self.position_ms = start_ms;
        self.duration_ms = 0;
        Ok(())
    }

    /// Pause output, remembering the engine-reported position. No-op unless playing.
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.state != PlayState::Playing {
            return Ok(());
        }
        let Some(bound) = self.bound.as_mut() else {
            return Ok(());
        };

        let position = bound.binding.position_ms();
        bound.binding.pause()?;
        self.position_ms = position;
        self.state = PlayState::Paused;
        debug!(position_ms = position, "paused");
        Ok(())
    }

    /// Continue the current track: signal the paused binding, or reload the
    /// track at the saved position when nothing is bound.
    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        if self.state == PlayState::Playing {
            return Ok(());
        }
        let Some(track) = self.current.clone() else {
            return Ok(());
        };

        if let Some(bound) = self.bound.as_mut() {
            bound.binding.play()?;
            self.state = PlayState::Playing;
            debug!("resumed");
            return Ok(());
        }

        let start_ms = self.position_ms;
        self.load(track, start_ms)
    }

    /// Pause when playing, resume otherwise.
    pub fn toggle_playback(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            PlayState::Playing => self.pause(),
            PlayState::Paused | PlayState::Stopped => self.resume(),
        }
    }

    /// Jump to `target_ms` (clamped to a known duration). No-op when nothing is bound.
    pub fn seek(&mut self, target_ms: u64) -> Result<(), PlaybackError> {
        let Some(bound) = self.bound.as_mut() else {
            return Ok(());
        };

        let target = if self.duration_ms > 0 {
            target_ms.min(self.duration_ms)
        } else {
            target_ms
        };
        bound.binding.seek(target)?;
        self.position_ms = target;
        debug!(position_ms = target, "seeked");
        Ok(())
    }

    /// Seek relative to the current position, saturating at the start.
    pub fn seek_by(&mut self, delta_ms: i64) -> Result<(), PlaybackError> {
        let base = match (&self.bound, self.state) {
            (Some(bound), PlayState::Playing) => bound.binding.position_ms(),
            _ => self.position_ms,
        };
        self.seek(base.saturating_add_signed(delta_ms))
    }

    /// Store `volume` clamped to `[0, 1]` and apply it to the live binding.
    pub fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
        if volume.is_nan() {
            return Ok(());
        }
        let volume = volume.clamp(0.0, 1.0);
        if let Some(bound) = self.bound.as_mut() {
            bound.binding.set_volume(volume)?;
        }
        self.volume = volume;
        Ok(())
    }

    /// Move to the next or previous track according to the play mode.
    ///
    /// No-op when the catalog is empty or nothing has been loaded yet.
    pub fn advance(&mut self, direction: Direction) -> Result<(), PlaybackError> {
        self.try_advance(direction).map(|_| ())
    }

    fn try_advance(&mut self, direction: Direction) -> Result<bool, PlaybackError> {
        let Some(current) = self.current.as_ref() else {
            return Ok(false);
        };

        let target = resolve_advance(
            &self.catalog,
            &current.id,
            self.mode,
            direction,
            self.shuffle_picker,
        );
        let track = match target {
            Some(AdvanceTarget::Index(i)) => self.catalog[i].clone(),
            Some(AdvanceTarget::Current) => current.clone(),
            None => return Ok(false),
        };

        debug!(?direction, mode = ?self.mode, to = %track.id, "advancing");
        self.load(track, 0)?;
        Ok(true)
    }

    /// Apply a status report from the engine.
    ///
    /// Reports from any binding other than the live one are dropped. A report
    /// of completion moves forward exactly once; if that fails the session
    /// stops and the error is returned.
    pub fn on_status_update(&mut self, update: StatusUpdate) -> Result<(), PlaybackError> {
        let Some(bound) = self.bound.as_ref() else {
            trace!(generation = update.generation.0, "dropping update, nothing bound");
            return Ok(());
        };
        if bound.generation != update.generation {
            trace!(
                generation = update.generation.0,
                live = bound.generation.0,
                "dropping stale update"
            );
            return Ok(());
        }

        self.position_ms = update.position_ms;
        self.duration_ms = update.duration_ms;

        if !update.did_finish {
            return Ok(());
        }

        debug!(generation = update.generation.0, "track finished");
        match self.try_advance(Direction::Next) {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.stop();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "auto-advance failed");
                self.stop();
                Err(e)
            }
        }
    }

    /// Cycle `Normal -> Repeat -> Shuffle -> Normal` and return the new mode.
    pub fn toggle_play_mode(&mut self) -> PlayMode {
        self.mode = self.mode.next();
        debug!(mode = ?self.mode, "play mode changed");
        self.mode
    }

    pub fn set_play_mode(&mut self, mode: PlayMode) {
        self.mode = mode;
    }

    /// Release the binding and rewind. The current track is kept so `resume` can restart it.
    pub fn stop(&mut self) {
        if let Some(old) = self.bound.take() {
            old.binding.release();
        }
        self.state = PlayState::Stopped;
        self.position_ms = 0;
        self.duration_ms = 0;
    }

    /// Swap in a freshly scanned catalog.
    pub fn replace_catalog(&mut self, catalog: Vec<Track>) {
        if let Some(current) = self.current.as_mut() {
            if let Some(fresh) = catalog.iter().find(|t| t.id == current.id) {
                current.apply(&fresh.metadata());
            }
        }
        self.catalog = catalog;
    }

    /// Reflect a saved metadata edit in the catalog and the current track.
    pub fn apply_metadata(&mut self, id: &str, meta: &TrackMetadata) {
        for track in self.catalog.iter_mut().filter(|t| t.id == id) {
            track.apply(meta);
        }
        if let Some(current) = self.current.as_mut().filter(|t| t.id == id) {
            current.apply(meta);
        }
    }
}

impl<E: AudioEngine> Drop for PlaybackSession<E> {
    fn drop(&mut self) {
        if let Some(old) = self.bound.take() {
            old.binding.release();
        }
    }
}
