use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Environment variable overriding [`LoggingConfig::file`].
pub const LOG_FILE_ENV: &str = "WAYPOINT_LOG";

/// Initialize tracing from `config`.
///
/// `RUST_LOG` overrides the configured filter. When `WAYPOINT_LOG` or
/// `config.file` names a path, logs go to a uniquely named file,
/// `{path}.{timestamp}.{pid}`, so concurrent runs don't clobber each other.
/// Otherwise logs go to stderr.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = std::env::var_os(LOG_FILE_ENV)
        .map(PathBuf::from)
        .or_else(|| config.file.clone());

    let Some(log_path) = log_path else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .with_target(true);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init();
        return;
    };

    let unique_path = unique_log_path(&log_path);
    let Ok(file) = std::fs::File::create(&unique_path) else {
        eprintln!("Warning: Failed to create log file: {}", unique_path.display());
        return;
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
}

fn unique_log_path(base: &std::path::Path) -> PathBuf {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!("{}.{}.{}", base.display(), timestamp, pid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_gets_timestamp_and_pid_suffix() {
        let path = unique_log_path(std::path::Path::new("/tmp/waypoint.log"));
        let name = path.to_string_lossy();
        assert!(name.starts_with("/tmp/waypoint.log."));
        assert!(name.ends_with(&format!(".{}", std::process::id())));
    }
}
