//! Integration tests for logging functionality
//!
//! A global subscriber can be installed once per process, so everything that
//! needs an installed logger lives in a single test.

use hourglass::config::LoggingConfig;
use hourglass::logging::structured::LOG_FILE_PREFIX;
use hourglass::logging::{init_logging, parse_log_level};
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert!(!LoggingConfig::console_only().local_enabled);
}

#[test]
fn test_parse_log_level_rejects_unknown() {
    assert!(parse_log_level("INFO").is_ok());
    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn test_file_logging_writes_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("info", &config).unwrap();
    assert!(guard.has_file_writer());
    tracing::info!(target: "hourglass::tests", table = "events", "window exported");

    // Flushes the background writer
    drop(guard);

    let contents = std::fs::read_to_string(log_path.join(LOG_FILE_PREFIX)).unwrap();
    let line = contents
        .lines()
        .find(|l| l.contains("window exported"))
        .unwrap();
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["fields"]["table"], "events");
    assert_eq!(event["level"], "INFO");

    // A second subscriber cannot be installed
    assert!(init_logging("info", &LoggingConfig::console_only()).is_err());
}
