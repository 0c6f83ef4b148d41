//! Per-binding status thread.
//!
//! Samples the playhead every interval and pushes a `StatusUpdate` tagged
//! with the binding's generation. Reports completion once, then exits.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::trace;

use crate::session::{Generation, StatusUpdate};

use super::sink::Playhead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sample {
    pub position: Duration,
    pub finished: bool,
}

/// Something the reporter can poll for position and completion.
pub(crate) trait StatusProbe: Send + 'static {
    fn sample(&self) -> Sample;
}

impl StatusProbe for Arc<Mutex<Playhead>> {
    fn sample(&self) -> Sample {
        let head = self.lock().unwrap_or_else(PoisonError::into_inner);
        Sample {
            position: head.position(),
            finished: head.sink.empty(),
        }
    }
}

pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Handle to a running reporter thread.
pub(crate) struct Reporter {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Reporter {
    /// Stop the thread and wait for it. No update is sent after this returns.
    pub(crate) fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender wakes the thread out of `recv_timeout`.
        self.stop.take();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub(crate) fn spawn_reporter<P: StatusProbe>(
    probe: P,
    generation: Generation,
    duration_ms: u64,
    interval: Duration,
    tx: Sender<StatusUpdate>,
) -> Reporter {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }

            let sample = probe.sample();
            let update = StatusUpdate {
                generation,
                position_ms: millis(sample.position),
                duration_ms,
                did_finish: sample.finished,
            };
            if tx.send(update).is_err() {
                break;
            }
            if sample.finished {
                trace!(generation = generation.0, "reporter done");
                break;
            }
        }
    });

    Reporter {
        stop: Some(stop_tx),
        handle: Some(handle),
    }
}
