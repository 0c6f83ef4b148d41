use std::env;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::app::App;
use crate::audio::RodioEngine;
use crate::config::Settings;
use crate::library::{self, MetadataMap, MetadataStore};
use crate::logging;
use crate::session::{PlaybackSession, StatusUpdate};

mod event_loop;
mod settings;

#[cfg(test)]
mod tests;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();

    // Keep the guard alive so buffered log lines are flushed on exit.
    let (_log_guard, log_warning) = start_logging(&settings);
    info!("kanade starting up");

    let mut notices: Vec<String> = Vec::new();
    if let Some(msg) = config_warning {
        warn!("{msg}");
        notices.push(msg);
    }
    notices.extend(log_warning);

    let dir = settings::resolve_music_dir(env::args().nth(1), &settings);
    let store = MetadataStore::new(settings::resolve_metadata_path(&settings));

    let metadata = store.read_all().unwrap_or_else(|e| {
        warn!(error = %e, "reading metadata failed, starting without it");
        notices.push(format!("Reading metadata failed: {e}"));
        MetadataMap::new()
    });
    let tracks = library::scan(&dir, &settings.library, &metadata).unwrap_or_else(|e| {
        warn!(error = %e, "scan failed, starting with an empty library");
        notices.push(format!("Scan failed: {e}"));
        Vec::new()
    });
    info!(dir = %dir.display(), count = tracks.len(), "library scanned");

    let (status_tx, status_rx) = mpsc::channel::<StatusUpdate>();
    let engine = RodioEngine::open_default(
        status_tx,
        Duration::from_millis(settings.audio.status_interval_ms),
    )?;

    let mut session = PlaybackSession::new(engine, tracks);
    session.set_volume(settings.audio.volume)?;
    session.set_play_mode(settings.playback.play_mode.into());

    let mut app = App::new(session, store, dir, &settings);
    if !notices.is_empty() {
        app.notify(notices.join("; "));
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &status_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("kanade shutting down");
    run_result
}

/// Install file logging. A failure leaves the app running without a log file
/// and comes back as a notice.
pub(crate) fn start_logging(settings: &Settings) -> (Option<WorkerGuard>, Option<String>) {
    let Some(dir) = settings.log_dir() else {
        return (None, Some("Logging disabled: no log directory".to_string()));
    };
    match logging::init(&dir, &settings.log.level) {
        Ok(guard) => (Some(guard), None),
        Err(e) => (None, Some(format!("Logging disabled: {}: {e}", dir.display()))),
    }
}
