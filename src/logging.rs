//! Logging configuration using the tracing ecosystem.
//!
//! Output goes to daily-rotated files so the terminal UI is never
//! overwritten by log lines. Directory and level come from the settings
//! file and the `--log-level` flag; `RUST_LOG` takes any full filter.

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default filter when no level is configured.
const DEFAULT_LOG_FILTER: &str = "condotui=info,warn";

/// File name prefix of the rotated logs.
const LOG_FILE_PREFIX: &str = "condotui.log";

/// Where and how verbosely to log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Log directory; the platform data directory when unset.
    pub directory: Option<PathBuf>,
    /// Level from the settings file.
    pub level: Option<String>,
    /// Level from the command line. Beats `RUST_LOG` and the settings.
    pub cli_level: Option<String>,
}

/// Initialize the logging system and return the directory logs go to.
///
/// Without a configured directory, logs are stored under the platform local
/// data directory, e.g. `~/.local/share/condotui/logs/` on Linux.
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created,
/// if the filter does not parse, or if a global subscriber is already
/// installed.
pub fn init(options: &LogOptions) -> anyhow::Result<PathBuf> {
    let log_dir = resolve_directory(options)?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    let directives = filter_directives(options, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter '{directives}'"))?;

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "condotui starting up");
    tracing::debug!(log_dir = %log_dir.display(), filter = %directives, "Logging configured");

    Ok(log_dir)
}

/// The configured directory, else `<data dir>/condotui/logs`.
fn resolve_directory(options: &LogOptions) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &options.directory {
        return Ok(dir.clone());
    }
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;
    Ok(base_dir.join("condotui").join("logs"))
}

/// Pick the filter: the command line level, then `RUST_LOG`, then the
/// configured level, then the default.
fn filter_directives(options: &LogOptions, env: Option<String>) -> String {
    if let Some(level) = &options.cli_level {
        return level_directive(level);
    }
    if let Some(env) = env.filter(|e| !e.trim().is_empty()) {
        return env;
    }
    options
        .level
        .as_deref()
        .map(level_directive)
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// Our own targets at `level`; dependencies stay at `warn`.
fn level_directive(level: &str) -> String {
    format!("condotui={},warn", level.trim().to_ascii_lowercase())
}

/// Log a clean shutdown.
pub fn shutdown() {
    tracing::info!("condotui shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directory_has_expected_structure() {
        let dir = resolve_directory(&LogOptions::default()).unwrap();
        assert!(dir.ends_with("condotui/logs"));
    }

    #[test]
    fn test_configured_directory_wins() {
        let temp = tempfile::tempdir().unwrap();
        let options = LogOptions {
            directory: Some(temp.path().join("logs")),
            ..LogOptions::default()
        };
        assert_eq!(resolve_directory(&options).unwrap(), temp.path().join("logs"));
    }

    #[test]
    fn test_filter_precedence() {
        let mut options = LogOptions::default();
        assert_eq!(filter_directives(&options, None), DEFAULT_LOG_FILTER);

        options.level = Some("Debug".to_string());
        assert_eq!(filter_directives(&options, None), "condotui=debug,warn");
        assert_eq!(
            filter_directives(&options, Some("condotui::api=trace".to_string())),
            "condotui::api=trace"
        );
        // A blank RUST_LOG does not hide the configured level
        assert_eq!(
            filter_directives(&options, Some("  ".to_string())),
            "condotui=debug,warn"
        );

        options.cli_level = Some("trace".to_string());
        assert_eq!(
            filter_directives(&options, Some("condotui::api=info".to_string())),
            "condotui=trace,warn"
        );
    }

    #[test]
    fn test_directives_parse() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            assert!(EnvFilter::try_new(level_directive(level)).is_ok(), "{level}");
        }
    }
}
