//! Configuration loading and the process-wide diagnostics switches.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, DiagnosticsConfig, LoggingConfig};

use parking_lot::RwLock;

static DIAGNOSTICS: RwLock<DiagnosticsConfig> = parking_lot::const_rwlock(DiagnosticsConfig::DEFAULT);

/// Make `config`'s diagnostics switches visible to the runtime.
pub fn install(config: &Config) {
    *DIAGNOSTICS.write() = config.diagnostics;
}

/// Current diagnostics switches.
pub fn diagnostics() -> DiagnosticsConfig {
    *DIAGNOSTICS.read()
}
