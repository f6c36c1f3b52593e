//! API error types for the condominium backend client.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed - missing or invalid token.
    #[error("Authentication failed: check your API token")]
    Unauthorized,

    /// Permission denied - the role lacks access to the resource.
    #[error("Permission denied: you don't have access to this resource")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The backend rejected the payload (HTTP 400).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Rate limited by the backend.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// Backend server error.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Keyring error when storing/retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// No token is available for the profile.
    #[error("No API token for profile '{0}'")]
    MissingToken(String),

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            400 => ApiError::Validation(context.to_string()),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// Whether the request may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::Network(_)
        )
    }
}

/// Extract a readable message from an error body.
///
/// The backend answers with `{"error": ".."}`, `{"detail": ".."}`, or a map
/// of field names to message lists. Returns `None` when nothing usable is
/// found.
pub fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    for key in ["error", "detail"] {
        if let Some(message) = json.get(key).and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }

    let fields = json.as_object()?;
    let messages: Vec<String> = fields
        .iter()
        .map(|(field, value)| {
            let text = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()))
                    .collect::<Vec<_>>()
                    .join(" "),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}: {}", field, text)
        })
        .collect();

    (!messages.is_empty()).then(|| messages.join(", "))
}
