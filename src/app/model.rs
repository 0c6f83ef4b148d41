//! Application model types: `App`, `View` and the metadata edit form.
//!
//! `App` owns the playback session and the metadata store, keeps the list
//! selection and active view, and turns failures into one-shot notices.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::{LibrarySettings, Settings};
use crate::library::{self, MetadataStore, Track, TrackMetadata};
use crate::session::{AudioEngine, Direction, PlayMode, PlaybackSession, StatusUpdate};

/// Which screen fills the main area.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Library,
    Lyrics,
    EditDetails,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditField {
    Artist,
    Lyrics,
}

/// In-progress edit of one track's artist and lyrics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditForm {
    pub track_id: String,
    pub title: String,
    pub artist: String,
    /// Lyrics as typed: one line per `\n`.
    pub lyrics: String,
    pub field: EditField,
}

impl EditForm {
    fn for_track(track: &Track) -> Self {
        Self {
            track_id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            lyrics: track.lyrics.join("\n"),
            field: EditField::Artist,
        }
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            EditField::Artist => &mut self.artist,
            EditField::Lyrics => &mut self.lyrics,
        }
    }
}

/// The main application model.
pub struct App<E: AudioEngine> {
    session: PlaybackSession<E>,
    store: MetadataStore,
    library: LibrarySettings,
    music_dir: PathBuf,

    pub selected: usize,
    pub view: View,
    pub edit: Option<EditForm>,
    notice: Option<String>,
    /// First lyric row shown in the lyrics view.
    lyrics_scroll: u16,

    lyrics_on_select: bool,
    volume_step: f32,
    scrub_ms: i64,
}

impl<E: AudioEngine> App<E> {
    pub fn new(
        session: PlaybackSession<E>,
        store: MetadataStore,
        music_dir: PathBuf,
        settings: &Settings,
    ) -> Self {
        let scrub_ms = settings
            .controls
            .scrub_seconds
            .saturating_mul(1000)
            .min(i64::MAX as u64) as i64;

        Self {
            session,
            store,
            library: settings.library.clone(),
            music_dir,
            selected: 0,
            view: View::Library,
            edit: None,
            notice: None,
            lyrics_scroll: 0,
            lyrics_on_select: settings.ui.lyrics_on_select,
            volume_step: settings.audio.volume_step,
            scrub_ms,
        }
    }

    pub fn session(&self) -> &PlaybackSession<E> {
        &self.session
    }

    pub fn tracks(&self) -> &[Track] {
        self.session.catalog()
    }

    pub fn music_dir(&self) -> &Path {
        &self.music_dir
    }

    /// Message from the last failed (or notable) action, if not yet dismissed.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn notify(&mut self, msg: impl Into<String>) {
        self.notice = Some(msg.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn report<T, Err: Display>(&mut self, what: &str, res: Result<T, Err>) -> Option<T> {
        match res {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "{what} failed");
                self.notify(format!("{what} failed: {e}"));
                None
            }
        }
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self) {
        let len = self.tracks().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self) {
        let len = self.tracks().len();
        if len > 0 {
            self.selected = if self.selected == 0 {
                len - 1
            } else {
                self.selected - 1
            };
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.tracks().len().saturating_sub(1);
    }

    /// Point the selection at the current track so the list follows playback,
    /// and start its lyrics from the top.
    fn follow_current(&mut self) {
        self.lyrics_scroll = 0;
        let Some(id) = self.session.current_track().map(|t| t.id.clone()) else {
            return;
        };
        if let Some(i) = self.tracks().iter().position(|t| t.id == id) {
            self.selected = i;
        }
    }

    /// Start the selected track from the beginning.
    pub fn play_selected(&mut self) {
        let Some(track) = self.tracks().get(self.selected).cloned() else {
            return;
        };
        let res = self.session.load(track, 0);
        if self.report("Playback", res).is_none() {
            return;
        }
        self.lyrics_scroll = 0;
        if self.lyrics_on_select {
            self.view = View::Lyrics;
        }
    }

    pub fn toggle_playback(&mut self) {
        let res = self.session.toggle_playback();
        self.report("Playback", res);
    }

    pub fn stop(&mut self) {
        self.session.stop();
    }

    pub fn next_track(&mut self) {
        self.skip(Direction::Next);
    }

    pub fn prev_track(&mut self) {
        self.skip(Direction::Previous);
    }

    fn skip(&mut self, direction: Direction) {
        let res = self.session.advance(direction);
        if self.report("Playback", res).is_some() {
            self.follow_current();
        }
    }

    pub fn scrub_forward(&mut self) {
        let res = self.session.seek_by(self.scrub_ms);
        self.report("Seek", res);
    }

    pub fn scrub_backward(&mut self) {
        let res = self.session.seek_by(-self.scrub_ms);
        self.report("Seek", res);
    }

    pub fn volume_up(&mut self) {
        let res = self.session.set_volume(self.session.volume() + self.volume_step);
        self.report("Volume change", res);
    }

    pub fn volume_down(&mut self) {
        let res = self.session.set_volume(self.session.volume() - self.volume_step);
        self.report("Volume change", res);
    }

    pub fn cycle_play_mode(&mut self) -> PlayMode {
        self.session.toggle_play_mode()
    }

    /// Feed one engine report into the session.
    pub fn on_status_update(&mut self, update: StatusUpdate) {
        let before = self.session.generation();
        let res = self.session.on_status_update(update);
        if self.report("Playback", res).is_some() && self.session.generation() != before {
            self.follow_current();
        }
    }

    pub fn show_lyrics(&mut self) {
        if self.session.current_track().is_some() {
            self.view = View::Lyrics;
            self.lyrics_scroll = 0;
        } else {
            self.notify("Nothing is playing");
        }
    }

    pub fn lyrics_scroll(&self) -> u16 {
        self.lyrics_scroll
    }

    /// Move the lyrics view by `delta` rows, stopping at the first and last line.
    pub fn scroll_lyrics(&mut self, delta: i32) {
        let last = self
            .session
            .current_track()
            .map_or(0, |t| t.lyrics.len().saturating_sub(1));
        let last = i64::try_from(last).unwrap_or(i64::MAX);
        let next = (i64::from(self.lyrics_scroll) + i64::from(delta)).clamp(0, last);
        self.lyrics_scroll = u16::try_from(next).unwrap_or(u16::MAX);
    }

    /// Leave the lyrics view (or abandon an edit).
    pub fn back(&mut self) {
        match self.view {
            View::EditDetails => self.cancel_edit(),
            View::Lyrics | View::Library => self.view = View::Library,
        }
    }

    /// Open the edit form for the playing track in the lyrics view,
    /// otherwise for the selected track.
    pub fn begin_edit(&mut self) {
        let target = match self.view {
            View::Lyrics => self.session.current_track(),
            _ => self.tracks().get(self.selected),
        };
        let Some(form) = target.map(EditForm::for_track) else {
            self.notify("No track to edit");
            return;
        };
        self.edit = Some(form);
        self.view = View::EditDetails;
    }

    pub fn edit_push(&mut self, c: char) {
        if let Some(form) = self.edit.as_mut() {
            form.active_mut().push(c);
        }
    }

    pub fn edit_pop(&mut self) {
        if let Some(form) = self.edit.as_mut() {
            form.active_mut().pop();
        }
    }

    /// Enter: a new lyrics line, or from the artist field move to the lyrics.
    pub fn edit_newline(&mut self) {
        if let Some(form) = self.edit.as_mut() {
            match form.field {
                EditField::Artist => form.field = EditField::Lyrics,
                EditField::Lyrics => form.lyrics.push('\n'),
            }
        }
    }

    pub fn edit_switch_field(&mut self) {
        if let Some(form) = self.edit.as_mut() {
            form.field = match form.field {
                EditField::Artist => EditField::Lyrics,
                EditField::Lyrics => EditField::Artist,
            };
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
        self.view = self.view_after_edit();
    }

    fn view_after_edit(&self) -> View {
        if self.session.current_track().is_some() {
            View::Lyrics
        } else {
            View::Library
        }
    }

    /// Persist the form. On failure the form stays open with a notice.
    pub fn save_edit(&mut self) {
        let Some(form) = self.edit.as_ref() else {
            return;
        };
        let id = form.track_id.clone();
        let title = form.title.clone();
        let meta = TrackMetadata::from_form(&form.artist, &form.lyrics);

        let res = self.store.upsert(&id, meta.clone());
        if self.report("Save", res).is_none() {
            return;
        }

        self.session.apply_metadata(&id, &meta);
        self.edit = None;
        self.lyrics_scroll = 0;
        self.view = self.view_after_edit();
        self.notify(format!("Saved details for {title}"));
    }

    /// Scan the music directory again. On failure the old catalog stays.
    pub fn rescan(&mut self) {
        let res = self.store.read_all();
        let Some(metadata) = self.report("Reading metadata", res) else {
            return;
        };
        let res = library::scan(&self.music_dir, &self.library, &metadata);
        let Some(tracks) = self.report("Scan", res) else {
            return;
        };

        let count = tracks.len();
        self.session.replace_catalog(tracks);
        self.selected = self.selected.min(count.saturating_sub(1));
        self.notify(format!("Found {count} tracks"));
    }
}
