//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, EditField, EditForm, View};
use crate::library::Track;
use crate::session::{AudioEngine, PlayState};

const LIBRARY_CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("enter", "play"),
    ("space/p", "play/pause"),
    ("h/l", "prev/next"),
    ("+/-", "volume"),
    ("m", "mode"),
    ("s", "stop"),
    ("v", "lyrics"),
    ("e", "edit"),
    ("R", "rescan"),
    ("q", "quit"),
];

const EDIT_CONTROLS: &[(&str, &str)] = &[
    ("tab", "switch field"),
    ("enter", "new line"),
    ("ctrl+s", "save"),
    ("esc", "cancel"),
];

/// Render the controls help text for `view`, incorporating scrub seconds.
pub(crate) fn controls_text(view: View, scrub_seconds: u64) -> String {
    let pairs = match view {
        View::EditDetails => EDIT_CONTROLS,
        View::Library | View::Lyrics => LIBRARY_CONTROLS,
    };
    let mut parts: Vec<String> = pairs.iter().map(|(k, v)| format!("[{k}] {v}")).collect();
    if view != View::EditDetails {
        parts.insert(4, format!("[H/L] scrub -/+{scrub_seconds}s"));
    }
    if view == View::Lyrics {
        parts[0] = "[j/k/PgUp/PgDn] scroll".to_string();
        parts.push("[esc] back".to_string());
    }
    parts.join(" | ")
}

/// Format milliseconds as `m:ss`, flooring partial seconds.
pub fn format_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Fraction of the track played, in `[0, 1]`; zero while the duration is unknown.
pub(crate) fn progress_ratio(position_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    (position_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
}

/// Rows `text` takes when wrapped at `width` columns, counting characters.
pub(crate) fn wrapped_rows(text: &str, width: u16) -> usize {
    let width = usize::from(width.max(1));
    text.split('\n')
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum()
}

/// Scroll offset that keeps the last row of `text` inside a `height`-row box.
pub(crate) fn tail_scroll(text: &str, width: u16, height: u16) -> u16 {
    let overflow = wrapped_rows(text, width).saturating_sub(usize::from(height));
    u16::try_from(overflow).unwrap_or(u16::MAX)
}

fn padded<'a>(title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw<E: AudioEngine>(
    frame: &mut Frame,
    app: &App<E>,
    header_text: &str,
    scrub_seconds: u64,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" kanade ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_now_playing(frame, app, chunks[1]);
    draw_progress(frame, app, chunks[2]);

    match app.view {
        View::Library => draw_library(frame, app, chunks[3]),
        View::Lyrics => draw_lyrics(
            frame,
            app.session().current_track(),
            app.lyrics_scroll(),
            chunks[3],
        ),
        View::EditDetails => {
            if let Some(form) = app.edit.as_ref() {
                draw_edit_form(frame, form, chunks[3]);
            }
        }
    }

    let footer_text = match app.notice() {
        Some(notice) => vec![
            Line::from(notice.to_string()).bold(),
            Line::from(controls_text(app.view, scrub_seconds)),
        ],
        None => vec![Line::from(controls_text(app.view, scrub_seconds))],
    };
    let footer = Paragraph::new(footer_text)
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

fn draw_now_playing<E: AudioEngine>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let session = app.session();
    let state = match session.play_state() {
        PlayState::Playing => "Playing",
        PlayState::Paused => "Paused",
        PlayState::Stopped => "Stopped",
    };
    let song = session
        .current_track()
        .map(|t| format!("{} - {}", t.title, t.artist))
        .unwrap_or_else(|| "Nothing loaded".to_string());

    let status = [
        format!("Song: {song}"),
        state.to_string(),
        format!("MODE: {}", session.play_mode().label()),
        format!("VOL: {:.0}%", session.volume() * 100.0),
        format!("Dir: {}", app.music_dir().display()),
    ]
    .join(" • ");

    let par = Paragraph::new(status)
        .block(padded(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(par, area);
}

fn draw_progress<E: AudioEngine>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let session = app.session();
    let label = format!(
        "{} / {}",
        format_time(session.position_ms()),
        format_time(session.duration_ms())
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .ratio(progress_ratio(session.position_ms(), session.duration_ms()))
        .label(label);
    frame.render_widget(gauge, area);
}

fn draw_library<E: AudioEngine>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let tracks = app.tracks();
    let current_id = app.session().current_track().map(|t| t.id.as_str());

    // Center the selected item when possible; only build items for the visible window.
    let total = tracks.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let (start, end) = if total <= list_height || list_height == 0 {
        (0, total)
    } else {
        let half = list_height / 2;
        let mut start = app.selected.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height)
    };

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .map(|t| {
            let text = format!("{} - {}", t.title, t.artist);
            if Some(t.id.as_str()) == current_id {
                ListItem::new(text).bold()
            } else {
                ListItem::new(text)
            }
        })
        .collect();

    let title = if total == 0 {
        " tracks (none found, R rescans) ".to_string()
    } else {
        format!(" tracks ({total}) ")
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(app.selected.saturating_sub(start)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_lyrics(frame: &mut Frame, track: Option<&Track>, scroll: u16, area: Rect) {
    let (title, lines) = match track {
        Some(t) => {
            let lines: Vec<Line> = if t.lyrics.iter().all(|l| l.trim().is_empty()) {
                vec![Line::from("No lyrics yet. Press e to add some.").italic()]
            } else {
                t.lyrics.iter().map(|l| Line::from(l.as_str())).collect()
            };
            (format!(" {} · {} ", t.title, t.artist), lines)
        }
        None => (" lyrics ".to_string(), vec![Line::from("Nothing is playing")]),
    };

    let par = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(par, area);
}

fn draw_edit_form(frame: &mut Frame, form: &EditForm, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let field = |label: &str, text: &str, focused: bool, area: Rect| {
        let (title, body) = if focused {
            (format!(" > {label} "), format!("{text}_"))
        } else {
            (format!(" {label} "), text.to_string())
        };
        // Borders take two columns and two rows, padding one more column.
        let scroll = tail_scroll(
            &body,
            area.width.saturating_sub(3),
            area.height.saturating_sub(2),
        );
        Paragraph::new(body)
            .block(padded(title))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
    };

    frame.render_widget(
        field(
            &format!("artist ({})", form.title),
            &form.artist,
            form.field == EditField::Artist,
            chunks[0],
        ),
        chunks[0],
    );
    frame.render_widget(
        field(
            "lyrics",
            &form.lyrics,
            form.field == EditField::Lyrics,
            chunks[1],
        ),
        chunks[1],
    );
}
