//! File logging through `tracing`.
//!
//! The terminal belongs to the TUI, so all output goes to a daily rolling
//! file under the configured log directory.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter that overrides `log.level`.
pub const LOG_ENV: &str = "KANADE_LOG";

const LOG_FILE: &str = "kanade.log";
const FALLBACK_LEVEL: &str = "info";

/// Build the filter from `KANADE_LOG`, then `level`, then plain `info`.
pub(crate) fn build_filter(env: Option<&str>, level: &str) -> EnvFilter {
    env.and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_LEVEL))
}

/// Install the global subscriber writing to `dir/kanade.log.<date>`.
///
/// The returned guard flushes buffered lines on drop; keep it alive for the
/// lifetime of the program.
pub fn init(dir: &Path, level: &str) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(env.as_deref(), level);

    tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(guard)
}

#[cfg(test)]
mod tests;
