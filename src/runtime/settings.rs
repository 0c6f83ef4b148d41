use std::path::PathBuf;

use crate::config;

/// Load settings, falling back to defaults when the file or environment is unusable.
///
/// Logging is not up yet when this runs, so the reason for a fallback is
/// returned for the caller to log and show once the UI exists.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}

/// The directory to scan: command-line argument, then `library.music_dir`, then `~/Music`.
pub fn resolve_music_dir(arg: Option<String>, settings: &config::Settings) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| settings.library.music_dir.clone())
        .or_else(config::default_music_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Where the metadata document lives; the working directory when no home is known.
pub fn resolve_metadata_path(settings: &config::Settings) -> PathBuf {
    settings
        .metadata_path()
        .unwrap_or_else(|| PathBuf::from("tracks.json"))
}
