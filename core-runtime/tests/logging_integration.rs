//! Integration tests for logging system

use core_runtime::logging::{
    init_logging, loggable_path, strip_path, LogFormat, LogLevel, LoggingConfig,
};
use std::path::Path;

#[test]
fn test_logging_initialization_only_once() {
    // A process gets exactly one global subscriber.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    assert!(init_logging(config.clone()).is_ok());
    assert!(init_logging(config).is_err());

    tracing::info!("logging initialized for integration test");
}

#[test]
fn test_default_configuration() {
    let config = LoggingConfig::default();

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(config.redact_paths);
    assert!(config.filter.is_none());
}

#[test]
fn test_path_stripping() {
    // Unix paths
    assert_eq!(strip_path("/home/user/music/song.mp3"), "song.mp3");
    assert_eq!(strip_path("/var/log/app.log"), "app.log");

    // Windows paths
    assert_eq!(strip_path("C:\\Users\\John\\Music\\song.mp3"), "song.mp3");
    assert_eq!(strip_path("D:\\data\\file.txt"), "file.txt");

    // Already basename
    assert_eq!(strip_path("filename.txt"), "filename.txt");

    // Edge cases
    assert_eq!(strip_path("/var/log/"), "");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_loggable_path_redaction_toggle() {
    let path = Path::new("/srv/audio/set.ogg");

    assert_eq!(loggable_path(path, true), "set.ogg");
    assert_eq!(loggable_path(path, false), "/srv/audio/set.ogg");
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Pretty)
        .with_level(LogLevel::Trace)
        .with_path_redaction(false)
        .with_spans(true)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.level, LogLevel::Trace);
    assert!(!config.redact_paths);
    assert!(config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
