use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, View};
use crate::config;
use crate::session::{AudioEngine, StatusUpdate};
use crate::ui;

const LYRICS_PAGE: i32 = 10;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: drains engine status into the session, draws,
/// and handles input. Returns `Ok(())` when shutdown is requested.
pub fn run<E: AudioEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App<E>,
    status_rx: &mpsc::Receiver<StatusUpdate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState::default();

    loop {
        // Updates from released bindings are filtered by generation in the session.
        while let Ok(update) = status_rx.try_recv() {
            app.on_status_update(update);
        }

        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                &settings.ui.header_text,
                settings.controls.scrub_seconds,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, &mut state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one key press to `app`. Returns `true` when the user asked to quit.
pub(crate) fn handle_key_event<E: AudioEngine>(
    key: KeyEvent,
    app: &mut App<E>,
    state: &mut EventLoopState,
) -> bool {
    // Notices last until the next key press.
    app.clear_notice();

    if app.view == View::EditDetails {
        state.pending_gg = false;
        handle_edit_key(key, app);
        return false;
    }

    if app.view == View::Lyrics && handle_lyrics_scroll(key.code, app) {
        state.pending_gg = false;
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => app.play_selected(),
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_playback(),
        KeyCode::Char('l') => app.next_track(),
        KeyCode::Char('h') => app.prev_track(),
        KeyCode::Char('L') => app.scrub_forward(),
        KeyCode::Char('H') => app.scrub_backward(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.volume_up(),
        KeyCode::Char('-') => app.volume_down(),
        KeyCode::Char('m') => {
            app.cycle_play_mode();
        }
        KeyCode::Char('s') => app.stop(),
        KeyCode::Char('v') => app.show_lyrics(),
        KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('R') => app.rescan(),
        KeyCode::Esc => app.back(),
        _ => {}
    }

    false
}

/// Scrolling keys in the lyrics view. Returns `false` for keys it does not own.
fn handle_lyrics_scroll<E: AudioEngine>(code: KeyCode, app: &mut App<E>) -> bool {
    match code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_lyrics(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_lyrics(-1),
        KeyCode::PageDown => app.scroll_lyrics(LYRICS_PAGE),
        KeyCode::PageUp => app.scroll_lyrics(-LYRICS_PAGE),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_lyrics(i32::MIN),
        KeyCode::Char('G') | KeyCode::End => app.scroll_lyrics(i32::MAX),
        _ => return false,
    }
    true
}

fn handle_edit_key<E: AudioEngine>(key: KeyEvent, app: &mut App<E>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => app.save_edit(),
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Tab | KeyCode::BackTab => app.edit_switch_field(),
        KeyCode::Enter => app.edit_newline(),
        KeyCode::Backspace => app.edit_pop(),
        KeyCode::Char(c) if !ctrl && !c.is_control() => app.edit_push(c),
        _ => {}
    }
}
