//! Configuration management for condotui.
//!
//! The configuration is a TOML file holding application settings and one
//! or more backend profiles. API tokens are not stored here; see
//! [`crate::api::auth`].

mod profile;
mod role;
mod settings;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use profile::{Profile, DEFAULT_API_URL};
pub use role::Role;
pub use settings::Settings;

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "CONDOTUI_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration directory is unknown.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// The configuration directory could not be created.
    #[error("failed to create configuration directory: {0}")]
    CreateDirError(#[source] std::io::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    ReadError(#[source] std::io::Error),

    /// The configuration file could not be written.
    #[error("failed to write configuration file: {0}")]
    WriteError(#[source] std::io::Error),

    /// The configuration file is not valid TOML for [`Config`].
    #[error("failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The configuration is well-formed but invalid.
    #[error("invalid configuration: {0}")]
    ValidationError(String),

    /// A profile was requested that does not exist.
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The complete configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Application settings.
    #[serde(default)]
    pub settings: Settings,
    /// Backend profiles.
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Config {
    /// The configuration directory: `$CONDOTUI_CONFIG_DIR`, or the platform
    /// config directory joined with `condotui`.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        dirs::config_dir()
            .map(|dir| dir.join("condotui"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Path of the configuration file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load the configuration, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        debug!(profiles = config.profiles.len(), "Configuration loaded");
        Ok(config)
    }

    /// Save the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save the configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(ConfigError::WriteError)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Check every profile, profile name uniqueness and the settings.
    pub fn validate(&self) -> Result<()> {
        for profile in &self.profiles {
            profile.validate()?;
        }

        for (index, profile) in self.profiles.iter().enumerate() {
            if self.profiles[..index].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(default) = &self.settings.default_profile {
            if !self.profiles.iter().any(|p| &p.name == default) {
                return Err(ConfigError::ValidationError(format!(
                    "default profile '{}' does not exist",
                    default
                )));
            }
        }

        self.settings.validate()
    }

    /// Find a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// Pick the profile to run with.
    ///
    /// An explicitly requested profile must exist. Otherwise the default
    /// profile, then the first profile, then a local administrator profile
    /// is used.
    pub fn active_profile(&self, requested: Option<&str>) -> Result<Profile> {
        if let Some(name) = requested {
            return self.profile(name).cloned();
        }
        if let Some(name) = &self.settings.default_profile {
            return self.profile(name).cloned();
        }
        Ok(self.profiles.first().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn profile(name: &str, role: Role) -> Profile {
        Profile::new(name, "http://localhost:8000/api", role)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.push(profile("sede", Role::Sindico));
        config.settings.default_profile = Some("sede".to_string());
        config.settings.compact_breakpoint = 90;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_parse_minimal_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[[profiles]]
name = "portaria"
url = "https://condo.example.com/api"
role = "portaria"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.profiles[0].role, Role::Portaria);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "profiles = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_duplicate_profiles_rejected() {
        let mut config = Config::default();
        config.profiles.push(profile("a", Role::Admin));
        config.profiles.push(profile("a", Role::Morador));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate profile name"));
    }

    #[test]
    fn test_unknown_default_profile_rejected() {
        let mut config = Config::default();
        config.settings.default_profile = Some("ghost".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_active_profile_selection() {
        let mut config = Config::default();
        assert_eq!(config.active_profile(None).unwrap(), Profile::default());

        config.profiles.push(profile("a", Role::Admin));
        config.profiles.push(profile("b", Role::Morador));
        assert_eq!(config.active_profile(None).unwrap().name, "a");

        config.settings.default_profile = Some("b".to_string());
        assert_eq!(config.active_profile(None).unwrap().name, "b");
        assert_eq!(config.active_profile(Some("a")).unwrap().name, "a");
        assert!(matches!(
            config.active_profile(Some("zz")),
            Err(ConfigError::ProfileNotFound(_))
        ));
    }

    #[test]
    #[serial]
    fn test_config_dir_env_override() {
        let dir = TempDir::new().unwrap();
        std::env::set_var(CONFIG_DIR_ENV, dir.path());
        let path = Config::config_path().unwrap();
        std::env::remove_var(CONFIG_DIR_ENV);
        assert_eq!(path, dir.path().join("config.toml"));
    }
}
