//! Unit tests for RuntimeConfig loading

use core_types::{ConfigError, RuntimeConfig, DEFAULT_STACK_SIZE};
use std::io::Write;

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "enable_management": false, "max_stack_depth": 4, "java_version": 17 }}"#
    )
    .unwrap();

    let config = RuntimeConfig::from_file(file.path()).unwrap();
    assert!(!config.enable_management);
    assert_eq!(config.max_stack_depth, 4);
    assert_eq!(config.java_version, 17);
    assert!(config.implicit_exception_profiling);
}

#[test]
fn test_config_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = RuntimeConfig::from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_empty_object_is_default() {
    let config = RuntimeConfig::from_json_str("{}").unwrap();
    assert_eq!(config, RuntimeConfig::default());
    assert_eq!(config.max_stack_depth, DEFAULT_STACK_SIZE);
}

#[test]
fn test_config_serializes_round_trip_through_json() {
    let config = RuntimeConfig {
        java_version: 8,
        ..RuntimeConfig::default()
    };
    let text = serde_json::to_string(&config).unwrap();
    assert_eq!(RuntimeConfig::from_json_str(&text).unwrap(), config);
}
