//! Application settings configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::grid::DEFAULT_COMPACT_BREAKPOINT;

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// The name of the default profile to use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Terminal width (columns) at or below which records are shown as cards.
    pub compact_breakpoint: u16,
    /// UI tick interval in milliseconds.
    pub tick_rate_ms: u64,
    /// Rows per page the backend is assumed to return when it only reports a
    /// total count.
    pub page_size: u32,
    /// Verbosity of condotui's own log lines: `error`, `warn`, `info`,
    /// `debug` or `trace`.
    pub log_level: String,
    /// Directory for log files. The platform data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: None,
            compact_breakpoint: DEFAULT_COMPACT_BREAKPOINT,
            tick_rate_ms: 250,
            page_size: 10,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Settings {
    /// Reject values the UI cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick_rate_ms must be greater than zero".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "log_level '{}' is not one of error, warn, info, debug, trace",
                self.log_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.compact_breakpoint, 100);
        assert_eq!(settings.page_size, 10);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings = toml::from_str("compact_breakpoint = 80").unwrap();
        assert_eq!(settings.compact_breakpoint, 80);
        assert_eq!(settings.tick_rate_ms, 250);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let settings = Settings {
            page_size: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_log_settings() {
        let settings: Settings =
            toml::from_str("log_level = \"debug\"\nlog_dir = \"/tmp/condotui\"").unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.log_dir, Some(PathBuf::from("/tmp/condotui")));
        assert!(settings.validate().is_ok());

        let settings = Settings {
            log_level: "verbose".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
