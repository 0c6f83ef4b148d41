use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{OutputStream, OutputStreamBuilder};
use tracing::debug;

use crate::error::PlaybackError;
use crate::session::{AudioEngine, Binding, OpenRequest, StatusUpdate};

use super::reporter::{Reporter, millis, spawn_reporter};
use super::sink::{Playhead, create_sink_at, probe_duration};

/// `AudioEngine` backed by the default `rodio` output device.
///
/// Status updates for every binding go to the sender given at construction.
pub struct RodioEngine {
    stream: OutputStream,
    status_tx: Sender<StatusUpdate>,
    interval: Duration,
}

impl RodioEngine {
    pub fn open_default(
        status_tx: Sender<StatusUpdate>,
        interval: Duration,
    ) -> Result<Self, PlaybackError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            status_tx,
            interval,
        })
    }
}

impl AudioEngine for RodioEngine {
    type Binding = RodioBinding;

    fn open(&mut self, request: OpenRequest<'_>) -> Result<RodioBinding, PlaybackError> {
        let start = Duration::from_millis(request.start_ms);
        let (sink, decoded_total) = create_sink_at(self.stream.mixer(), request.uri, start)?;
        sink.set_volume(request.volume);

        let duration_ms = decoded_total
            .or_else(|| probe_duration(request.uri))
            .map(millis)
            .unwrap_or(0);

        let playhead = Arc::new(Mutex::new(Playhead { sink, base: start }));
        let reporter = spawn_reporter(
            playhead.clone(),
            request.generation,
            duration_ms,
            self.interval,
            self.status_tx.clone(),
        );

        debug!(
            path = %request.uri.display(),
            generation = request.generation.0,
            duration_ms,
            "opened binding"
        );

        Ok(RodioBinding {
            path: request.uri.to_path_buf(),
            mixer: self.stream.mixer().clone(),
            playhead,
            volume: request.volume,
            paused: true,
            reporter,
        })
    }
}

pub(super) fn seek_failed(position_ms: u64, err: PlaybackError) -> PlaybackError {
    PlaybackError::Seek(format!("to {position_ms} ms: {err}"))
}

/// One loaded file on the rodio mixer.
pub struct RodioBinding {
    path: PathBuf,
    mixer: Mixer,
    playhead: Arc<Mutex<Playhead>>,
    volume: f32,
    paused: bool,
    reporter: Reporter,
}

impl RodioBinding {
    fn head(&self) -> MutexGuard<'_, Playhead> {
        self.playhead.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Binding for RodioBinding {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.head().sink.play();
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.head().sink.pause();
        self.paused = true;
        Ok(())
    }

    fn position_ms(&self) -> u64 {
        millis(self.head().position())
    }

    fn seek(&mut self, position_ms: u64) -> Result<(), PlaybackError> {
        // Scrubbing: rebuild the sink and skip into the file.
        let target = Duration::from_millis(position_ms);
        let (sink, _) = create_sink_at(&self.mixer, &self.path, target)
            .map_err(|e| seek_failed(position_ms, e))?;
        sink.set_volume(self.volume);

        let mut head = self.head();
        head.sink.stop();
        if !self.paused {
            sink.play();
        }
        head.sink = sink;
        head.base = target;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
        self.head().sink.set_volume(volume);
        self.volume = volume;
        Ok(())
    }

    fn release(self) {
        let Self {
            playhead, reporter, ..
        } = self;
        reporter.stop();
        playhead
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
            .stop();
    }
}
