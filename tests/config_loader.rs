use std::fs;

use tempfile::TempDir;
use waypoint::config::{self, Config, ConfigError, DiagnosticsConfig};

/// Test that Config::default() produces the expected values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.logging.filter, "info");
    assert!(config.logging.file.is_none());
    assert!(config.logging.ansi);

    assert!(!config.diagnostics.trace_channels);
    assert!(!config.diagnostics.log_lifecycle);
    assert!(config.diagnostics.warn_unhandled_effect_errors);
}

/// Test that Config::config_path() returns a path ending with the expected filename.
#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("waypoint/config.toml"));
}

/// Test that a missing file yields the defaults.
#[test]
fn test_load_missing_file_returns_default() {
    let dir = TempDir::new().unwrap();

    let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

    assert_eq!(config, Config::default());
}

/// Test that a partial file keeps defaults for everything it omits.
#[test]
fn test_load_partial_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[logging]
filter = "waypoint=debug"
file = "/tmp/waypoint.log"

[diagnostics]
log_lifecycle = true
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.logging.filter, "waypoint=debug");
    assert_eq!(
        config.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/waypoint.log"))
    );
    assert!(config.logging.ansi);
    assert!(config.diagnostics.log_lifecycle);
    assert!(!config.diagnostics.trace_channels);
    assert!(config.diagnostics.warn_unhandled_effect_errors);
}

/// Test that malformed TOML is reported as a parse error.
#[test]
fn test_load_invalid_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[logging\nfilter = ").unwrap();

    match Config::load_from(&path) {
        Err(ConfigError::ParseError { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

/// Test that a bad log filter fails validation.
#[test]
fn test_validation_fails_bad_filter() {
    let mut config = Config::default();
    config.logging.filter = "waypoint=loudest".to_string();

    match config.validate() {
        Err(ConfigError::ValidationError { message }) => {
            assert!(message.contains("Invalid log filter"));
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

/// Test that a config round-trips through TOML.
#[test]
fn test_config_serializes_to_toml() {
    let mut config = Config::default();
    config.diagnostics.trace_channels = true;

    let text = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();

    assert_eq!(parsed, config);
}

/// Test that installed diagnostics are visible to the runtime.
#[test]
fn test_install_updates_diagnostics() {
    let mut config = Config::default();
    config.diagnostics.log_lifecycle = true;

    config::install(&config);
    assert!(config::diagnostics().log_lifecycle);

    config::install(&Config::default());
    assert_eq!(config::diagnostics(), DiagnosticsConfig::default());
}
