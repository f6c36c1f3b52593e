//! Authentication handling for the backend API.
//!
//! The backend uses DRF token authentication (`Authorization: Token <key>`).
//! Tokens are kept in the OS keyring, keyed by profile name, or supplied
//! through the `CONDOTUI_TOKEN` environment variable.

use tracing::debug;

use super::error::{ApiError, Result};

/// The keyring service name for condotui tokens.
const KEYRING_SERVICE: &str = "condotui";

/// Environment variable that supplies a token without the keyring.
pub const TOKEN_ENV: &str = "CONDOTUI_TOKEN";

/// Routes that are called without a token.
const PUBLIC_ROUTES: &[&str] = &["access/login/", "access/signup/", "docs/"];

/// Authentication credentials.
#[derive(Clone)]
pub struct Auth {
    /// The complete "Token ..." header value.
    header: String,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth").finish_non_exhaustive()
    }
}

impl Auth {
    /// Create credentials from a token.
    pub fn new(token: &str) -> Self {
        Self {
            header: format!("Token {}", token.trim()),
        }
    }

    /// Resolve the token for a profile: the environment variable first,
    /// then the keyring.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` when neither source has a token.
    pub fn for_profile(profile_name: &str) -> Result<Self> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                debug!("Using token from environment");
                return Ok(Self::new(&token));
            }
        }
        match get_token(profile_name) {
            Ok(token) => Ok(Self::new(&token)),
            Err(err) => {
                debug!(error = %err, "No token in keyring");
                Err(ApiError::MissingToken(profile_name.to_string()))
            }
        }
    }

    /// Get the authorization header value for HTTP requests.
    pub fn header_value(&self) -> &str {
        &self.header
    }
}

/// Whether `path` is called without authentication.
pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|route| path.contains(route))
}

/// Store an API token in the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;

    entry
        .set_password(token.trim())
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))?;

    Ok(())
}

/// Retrieve an API token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be retrieved from the keyring.
pub fn get_token(profile_name: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .get_password()
        .map_err(|e| ApiError::Keyring(format!("failed to retrieve token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_header_value_format() {
        let auth = Auth::new(" abc123\n");
        assert_eq!(auth.header_value(), "Token abc123");
    }

    #[test]
    fn test_auth_does_not_expose_token() {
        let auth = Auth::new("secret_token");
        assert!(!format!("{:?}", auth).contains("secret_token"));
    }

    #[test]
    fn test_public_routes() {
        assert!(is_public_route("/access/login/"));
        assert!(is_public_route("/docs/schema/"));
        assert!(!is_public_route("/cadastros/unidades/"));
    }

    #[test]
    #[serial]
    fn test_env_token_wins() {
        std::env::set_var(TOKEN_ENV, "from-env");
        let auth = Auth::for_profile("any");
        std::env::remove_var(TOKEN_ENV);
        assert_eq!(auth.unwrap().header_value(), "Token from-env");
    }
}
