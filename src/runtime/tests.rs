use super::event_loop::{EventLoopState, handle_key_event};
use super::settings::resolve_music_dir;
use super::start_logging;
use crate::app::{App, EditField, View};
use crate::config::Settings;
use crate::library::{MetadataStore, Track};
use crate::session::fake::{FakeEngine, catalog};
use crate::session::{PlayMode, PlayState, PlaybackSession};
use crate::ui;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};
use std::path::PathBuf;
use tempfile::TempDir;

fn app(ids: &[&str]) -> (App<FakeEngine>, TempDir) {
    app_with(catalog(ids))
}

fn app_with(tracks: Vec<Track>) -> (App<FakeEngine>, TempDir) {
    let dir = TempDir::new().unwrap();
    let session = PlaybackSession::new(FakeEngine::new(), tracks);
    let store = MetadataStore::new(dir.path().join("tracks.json"));
    let music = dir.path().to_path_buf();
    let app = App::new(session, store, music, &Settings::default());
    (app, dir)
}

fn press(app: &mut App<FakeEngine>, state: &mut EventLoopState, code: KeyCode) -> bool {
    handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app, state)
}

fn ctrl(app: &mut App<FakeEngine>, state: &mut EventLoopState, c: char) -> bool {
    handle_key_event(
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL),
        app,
        state,
    )
}

#[test]
fn q_quits_outside_the_edit_form() {
    let (mut app, _dir) = app(&["a.mp3"]);
    let mut state = EventLoopState::default();
    assert!(press(&mut app, &mut state, KeyCode::Char('q')));
}

#[test]
fn gg_and_g_jump_to_ends() {
    let (mut app, _dir) = app(&["a.mp3", "b.mp3", "c.mp3"]);
    let mut state = EventLoopState::default();

    press(&mut app, &mut state, KeyCode::Char('G'));
    assert_eq!(app.selected, 2);

    press(&mut app, &mut state, KeyCode::Char('g'));
    assert_eq!(app.selected, 2);
    press(&mut app, &mut state, KeyCode::Char('g'));
    assert_eq!(app.selected, 0);
}

#[test]
fn other_keys_cancel_pending_g() {
    let (mut app, _dir) = app(&["a.mp3", "b.mp3", "c.mp3"]);
    let mut state = EventLoopState::default();

    press(&mut app, &mut state, KeyCode::Char('G'));
    press(&mut app, &mut state, KeyCode::Char('g'));
    press(&mut app, &mut state, KeyCode::Char('k'));
    press(&mut app, &mut state, KeyCode::Char('g'));
    assert_eq!(app.selected, 1);
}

#[test]
fn player_keys_drive_the_session() {
    let (mut app, _dir) = app(&["a.mp3", "b.mp3"]);
    let mut state = EventLoopState::default();

    press(&mut app, &mut state, KeyCode::Enter);
    assert_eq!(app.session().play_state(), PlayState::Playing);
    assert_eq!(app.view, View::Lyrics);

    press(&mut app, &mut state, KeyCode::Char(' '));
    assert_eq!(app.session().play_state(), PlayState::Paused);

    press(&mut app, &mut state, KeyCode::Char('l'));
    assert_eq!(app.session().current_track().unwrap().id, "b.mp3");

    press(&mut app, &mut state, KeyCode::Char('m'));
    assert_eq!(app.session().play_mode(), PlayMode::Repeat);

    press(&mut app, &mut state, KeyCode::Char('-'));
    assert!(app.session().volume() < 1.0);

    press(&mut app, &mut state, KeyCode::Char('s'));
    assert_eq!(app.session().play_state(), PlayState::Stopped);

    press(&mut app, &mut state, KeyCode::Esc);
    assert_eq!(app.view, View::Library);
}

#[test]
fn edit_form_captures_typing_including_q() {
    let (mut app, _dir) = app(&["a.mp3"]);
    let mut state = EventLoopState::default();

    press(&mut app, &mut state, KeyCode::Char('e'));
    assert_eq!(app.view, View::EditDetails);

    press(&mut app, &mut state, KeyCode::Tab);
    assert_eq!(app.edit.as_ref().unwrap().field, EditField::Lyrics);
    for c in ['q', 's'] {
        assert!(!press(&mut app, &mut state, KeyCode::Char(c)));
    }
    press(&mut app, &mut state, KeyCode::Enter);
    press(&mut app, &mut state, KeyCode::Char('x'));
    press(&mut app, &mut state, KeyCode::Backspace);
    assert_eq!(app.edit.as_ref().unwrap().lyrics, "qs\n");

    ctrl(&mut app, &mut state, 's');
    assert!(app.edit.is_none());
    assert_eq!(app.tracks()[0].lyrics, vec!["qs", ""]);
}

#[test]
fn esc_cancels_the_edit_form() {
    let (mut app, _dir) = app(&["a.mp3"]);
    let mut state = EventLoopState::default();

    press(&mut app, &mut state, KeyCode::Char('e'));
    press(&mut app, &mut state, KeyCode::Char('z'));
    press(&mut app, &mut state, KeyCode::Esc);

    assert_eq!(app.view, View::Library);
    assert_eq!(app.tracks()[0].artist, "Unknown");
}

#[test]
fn notice_clears_on_next_key() {
    let (mut app, _dir) = app(&["a.mp3"]);
    let mut state = EventLoopState::default();

    press(&mut app, &mut state, KeyCode::Char('v'));
    assert!(app.notice().is_some());
    press(&mut app, &mut state, KeyCode::Char('j'));
    assert!(app.notice().is_none());
}

#[test]
fn music_dir_prefers_argument_then_config() {
    let mut settings = Settings::default();
    settings.library.music_dir = Some(PathBuf::from("/from/config"));

    assert_eq!(
        resolve_music_dir(Some("/from/arg".into()), &settings),
        PathBuf::from("/from/arg")
    );
    assert_eq!(
        resolve_music_dir(None, &settings),
        PathBuf::from("/from/config")
    );
}

#[test]
fn unusable_log_dir_becomes_a_notice() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("not-a-dir");
    std::fs::write(&file, b"").unwrap();

    let mut settings = Settings::default();
    settings.log.dir = Some(file.join("kanade"));
    let (guard, notice) = start_logging(&settings);

    assert!(guard.is_none());
    assert!(notice.unwrap().starts_with("Logging disabled"));
}

/// Draw `app` on an 80x24 screen and return its rows joined by newlines.
fn screen(app: &App<FakeEngine>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal.draw(|f| ui::draw(f, app, " ~ kanade ~ ", 5)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn long_song() -> Vec<Track> {
    let mut tracks = catalog(&["song.mp3"]);
    tracks[0].lyrics = (0..40).map(|i| format!("line {i}")).collect();
    tracks
}

#[test]
fn lyrics_view_scrolls_to_the_last_line() {
    let (mut app, _dir) = app_with(long_song());
    let mut state = EventLoopState::default();
    press(&mut app, &mut state, KeyCode::Enter);
    assert_eq!(app.view, View::Lyrics);

    let top = screen(&app);
    assert!(top.contains("line 0"));
    assert!(!top.contains("line 39"));

    for _ in 0..40 {
        press(&mut app, &mut state, KeyCode::Char('j'));
    }
    assert_eq!(app.lyrics_scroll(), 39);
    let bottom = screen(&app);
    assert!(bottom.contains("line 39"));
    assert!(!bottom.contains("line 0"));

    press(&mut app, &mut state, KeyCode::PageUp);
    assert_eq!(app.lyrics_scroll(), 29);
    assert!(screen(&app).contains("line 29"));

    press(&mut app, &mut state, KeyCode::Char('g'));
    assert_eq!(app.lyrics_scroll(), 0);
    assert_eq!(app.selected, 0);
}

#[test]
fn lyrics_scroll_resets_on_track_change() {
    let mut tracks = long_song();
    tracks.extend(catalog(&["two.mp3"]));
    let (mut app, _dir) = app_with(tracks);
    let mut state = EventLoopState::default();

    press(&mut app, &mut state, KeyCode::Enter);
    press(&mut app, &mut state, KeyCode::PageDown);
    assert_eq!(app.lyrics_scroll(), 10);

    press(&mut app, &mut state, KeyCode::Char('l'));
    assert_eq!(app.lyrics_scroll(), 0);
}

#[test]
fn edit_form_follows_the_last_lyrics_line() {
    let (mut app, _dir) = app_with(long_song());
    let mut state = EventLoopState::default();
    press(&mut app, &mut state, KeyCode::Enter);
    press(&mut app, &mut state, KeyCode::Char('e'));
    press(&mut app, &mut state, KeyCode::Tab);

    let shown = screen(&app);
    assert!(shown.contains("line 39_"));
    assert!(!shown.contains("line 0"));
}
