//! Backend profile configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result, Role};

/// URL used when a profile does not name one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// A backend profile.
///
/// Profiles store connection details for one condominium backend. Tokens are
/// stored separately in the OS keychain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty, without whitespace, and unique across profiles.
    pub name: String,

    /// Base URL of the REST API, e.g. "https://condo.example.com/api".
    #[serde(default = "default_url")]
    pub url: String,

    /// The account name, shown in the status bar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Which screens the user can open.
    #[serde(default)]
    pub role: Role,
}

fn default_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("local", DEFAULT_API_URL, Role::Admin)
    }
}

impl Profile {
    /// Create a new profile.
    pub fn new(name: impl Into<String>, url: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: None,
            role,
        }
    }

    /// Set the account name.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Validate this profile.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` when the name is empty or
    /// contains whitespace, or when the URL is not an http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL cannot be empty",
                self.name
            )));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL must start with http:// or https://",
                self.name
            )));
        }

        Ok(())
    }

    /// Label for the status bar: the account name when known.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.name)
    }
}
