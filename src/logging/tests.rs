use super::{build_filter, init};
use tracing_subscriber::filter::LevelFilter;

#[test]
fn env_directive_wins_over_level() {
    let filter = build_filter(Some("kanade=trace"), "warn");
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
}

#[test]
fn level_is_used_without_env() {
    let filter = build_filter(None, "debug");
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
}

#[test]
fn invalid_directives_fall_back() {
    let filter = build_filter(Some("kanade=loud"), "debug");
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

    let filter = build_filter(None, "kanade=loud");
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
}

#[test]
fn init_fails_when_the_log_dir_is_under_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain");
    std::fs::write(&file, b"").unwrap();

    assert!(init(&file.join("logs"), "info").is_err());
}
