use super::engine::seek_failed;
use super::reporter::{Sample, StatusProbe, millis, spawn_reporter};
use crate::error::PlaybackError;
use crate::session::{Generation, StatusUpdate};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::time::Duration;

/// Advances one second per sample and finishes after `finish_after` samples.
struct CountingProbe {
    samples: Arc<AtomicU64>,
    finish_after: u64,
}

impl StatusProbe for CountingProbe {
    fn sample(&self) -> Sample {
        let n = self.samples.fetch_add(1, Ordering::SeqCst) + 1;
        Sample {
            position: Duration::from_secs(n),
            finished: n >= self.finish_after,
        }
    }
}

#[test]
fn reporter_tags_updates_and_reports_finish_once() {
    let (tx, rx) = mpsc::channel::<StatusUpdate>();
    let probe = CountingProbe {
        samples: Arc::new(AtomicU64::new(0)),
        finish_after: 3,
    };
    let reporter = spawn_reporter(probe, Generation(7), 3_000, Duration::from_millis(2), tx);

    let updates: Vec<StatusUpdate> = rx.iter().collect();
    reporter.stop();

    assert_eq!(updates.len(), 3);
    assert!(updates.iter().all(|u| u.generation == Generation(7)));
    assert!(updates.iter().all(|u| u.duration_ms == 3_000));
    assert_eq!(
        updates.iter().map(|u| u.position_ms).collect::<Vec<_>>(),
        vec![1_000, 2_000, 3_000]
    );
    assert_eq!(updates.iter().filter(|u| u.did_finish).count(), 1);
    assert!(updates.last().unwrap().did_finish);
}

#[test]
fn stopped_reporter_sends_nothing_more() {
    let (tx, rx) = mpsc::channel::<StatusUpdate>();
    let samples = Arc::new(AtomicU64::new(0));
    let probe = CountingProbe {
        samples: samples.clone(),
        finish_after: u64::MAX,
    };
    let reporter = spawn_reporter(probe, Generation(1), 0, Duration::from_secs(60), tx);

    reporter.stop();

    // The thread is joined and its sender dropped without sampling.
    assert!(rx.recv().is_err());
    assert_eq!(samples.load(Ordering::SeqCst), 0);
}

#[test]
fn reporter_exits_when_receiver_is_gone() {
    let (tx, rx) = mpsc::channel::<StatusUpdate>();
    drop(rx);
    let samples = Arc::new(AtomicU64::new(0));
    let probe = CountingProbe {
        samples: samples.clone(),
        finish_after: u64::MAX,
    };
    let reporter = spawn_reporter(probe, Generation(1), 0, Duration::from_millis(1), tx);
    // At most one sample is taken before the failed send ends the loop.
    std::thread::sleep(Duration::from_millis(20));
    reporter.stop();
    assert!(samples.load(Ordering::SeqCst) <= 1);
}

#[test]
fn millis_saturates() {
    assert_eq!(millis(Duration::from_millis(1_234)), 1_234);
    assert_eq!(millis(Duration::MAX), u64::MAX);
}

#[test]
fn failed_sink_rebuild_is_reported_as_seek_error() {
    let decode = PlaybackError::Decode {
        path: "/music/a.mp3".into(),
        reason: "unsupported".into(),
    };
    let err = seek_failed(42_000, decode);
    assert!(matches!(err, PlaybackError::Seek(_)));
    assert_eq!(
        err.to_string(),
        "seek failed: to 42000 ms: failed to decode /music/a.mp3: unsupported"
    );
}
