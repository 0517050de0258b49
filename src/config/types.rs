use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"waypoint=debug"`.
    pub filter: String,
    /// Log file path prefix. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
    /// Colored output (stderr only).
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
            ansi: true,
        }
    }
}

/// Runtime diagnostics switches, read on hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Trace every channel delivery.
    pub trace_channels: bool,
    /// Log view model creation and release.
    pub log_lifecycle: bool,
    /// Warn when an effect fails without a `catch` handler.
    pub warn_unhandled_effect_errors: bool,
}

impl DiagnosticsConfig {
    pub const DEFAULT: DiagnosticsConfig = DiagnosticsConfig {
        trace_channels: false,
        log_lifecycle: false,
        warn_unhandled_effect_errors: true,
    };
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
