use std::path::PathBuf;

use serde::Deserialize;

use crate::session::PlayMode;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/kanade/config.toml`
/// or `~/.config/kanade/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `KANADE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub metadata: MetadataSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial volume in `[0.0, 1.0]`.
    pub volume: f32,
    /// How often the engine reports position for the loaded track (milliseconds).
    pub status_interval_ms: u64,
    /// Volume change applied by `+` / `-`.
    pub volume_step: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            status_interval_ms: 1000,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Play mode the session starts in.
    pub play_mode: PlayModeSetting,
}

#[derive(Debug, Copy, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayModeSetting {
    #[default]
    Normal,
    #[serde(alias = "repeat-one", alias = "repeat_one", alias = "loop-one")]
    Repeat,
    #[serde(alias = "random")]
    Shuffle,
}

impl From<PlayModeSetting> for PlayMode {
    fn from(s: PlayModeSetting) -> Self {
        match s {
            PlayModeSetting::Normal => PlayMode::Normal,
            PlayModeSetting::Repeat => PlayMode::Repeat,
            PlayModeSetting::Shuffle => PlayMode::Shuffle,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory to scan when none is given on the command line.
    pub music_dir: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            music_dir: None,
            extensions: vec!["mp3".into(), "wav".into(), "m4a".into()],
            recursive: false,
            include_hidden: false,
            follow_links: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Location of the artist/lyrics document. Defaults to the XDG data dir.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Switch to the lyrics view when a track is started from the list.
    pub lyrics_on_select: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ kanade ~ ".to_string(),
            lyrics_on_select: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive used when `KANADE_LOG` is unset.
    pub level: String,
    /// Directory for the rolling log file. Defaults to the XDG state dir.
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}
