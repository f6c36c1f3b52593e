//! Centralized error types for condotui.
//!
//! Every layer has its own `thiserror` enum; `AppError` aggregates them and
//! turns them into the Portuguese messages shown in the UI.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::grid::GridError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Grid misuse or rejected edits.
    #[error("{0}")]
    Grid(#[from] GridError),

    /// IO errors (file system, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal-related errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        AppError::Terminal(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Não foi possível localizar o diretório de configuração.".to_string()
                }
                ConfigError::CreateDirError(_) | ConfigError::WriteError(_) => {
                    "Não foi possível salvar a configuração. Verifique as permissões.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Não foi possível ler o arquivo de configuração.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "O arquivo de configuração é inválido.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Não foi possível salvar a configuração. Erro interno.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Erro de configuração: {}", msg),
                ConfigError::ProfileNotFound(name) => {
                    format!("Perfil '{}' não encontrado.", name)
                }
            },
            AppError::Api(e) => match e {
                ApiError::Unauthorized => {
                    "Falha na autenticação. Verifique o token de acesso.".to_string()
                }
                ApiError::Forbidden => {
                    "Acesso negado. Você não tem permissão para este recurso.".to_string()
                }
                ApiError::NotFound(resource) => format!("'{}' não foi encontrado.", resource),
                ApiError::Validation(msg) => format!("Erro ao salvar: {}", msg),
                ApiError::RateLimited => {
                    "Muitas requisições. Aguarde um momento e tente novamente.".to_string()
                }
                ApiError::ServerError(_) => {
                    "Erro no servidor. Tente novamente mais tarde.".to_string()
                }
                ApiError::Network(_) => {
                    "Erro ao conectar com o servidor. Tente novamente mais tarde.".to_string()
                }
                ApiError::Keyring(_) => {
                    "Não foi possível acessar o armazenamento seguro de senhas.".to_string()
                }
                ApiError::MissingToken(profile) => {
                    format!("Nenhum token configurado para o perfil '{}'.", profile)
                }
                ApiError::InvalidResponse(_) => {
                    "Resposta inesperada do servidor. Tente novamente.".to_string()
                }
            },
            AppError::Grid(e) => e.to_string(),
            AppError::Io(_) => "Falha em operação de arquivo. Verifique as permissões.".to_string(),
            AppError::Terminal(msg) => format!("Erro de terminal: {}", msg),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Check if this error is critical and requires user acknowledgment.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Api(ApiError::Unauthorized)
                | AppError::Api(ApiError::Forbidden)
                | AppError::Api(ApiError::MissingToken(_))
                | AppError::Terminal(_)
        )
    }

    /// Check if this error is recoverable.
    ///
    /// Recoverable errors can be retried or the user can continue working.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Api(ApiError::RateLimited)
                | AppError::Api(ApiError::ServerError(_))
                | AppError::Api(ApiError::Network(_))
                | AppError::Api(ApiError::NotFound(_))
                | AppError::Api(ApiError::Validation(_))
                | AppError::Grid(_)
        )
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Api(ApiError::Unauthorized) | AppError::Api(ApiError::MissingToken(_)) => {
                Some("Execute 'condotui set-token <perfil>' para configurar o token.")
            }
            AppError::Api(ApiError::RateLimited) => {
                Some("Aguarde alguns segundos e pressione 'r' para atualizar.")
            }
            AppError::Api(ApiError::Network(_)) => {
                Some("Verifique sua conexão e a URL do perfil.")
            }
            AppError::Config(ConfigError::ParseError(_)) => {
                Some("Execute 'condotui config-path' para localizar o arquivo.")
            }
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::NoConfigDir.into();
        assert!(matches!(app_err, AppError::Config(ConfigError::NoConfigDir)));
    }

    #[test]
    fn test_app_error_from_grid_error() {
        let app_err: AppError = GridError::InvalidRange.into();
        assert!(app_err.user_message().contains("posterior"));
        assert!(app_err.is_recoverable());
    }

    #[test]
    fn test_user_message_unauthorized() {
        let msg = AppError::Api(ApiError::Unauthorized).user_message();
        assert!(msg.contains("token"));
    }

    #[test]
    fn test_user_message_validation_keeps_backend_text() {
        let err = AppError::Api(ApiError::Validation("Número já cadastrado".to_string()));
        assert_eq!(err.user_message(), "Erro ao salvar: Número já cadastrado");
    }

    #[test]
    fn test_user_message_config_validation() {
        let err = AppError::Config(ConfigError::ValidationError("duplicate profile".to_string()));
        assert!(err.user_message().contains("duplicate profile"));
    }

    #[test]
    fn test_critical_classification() {
        assert!(AppError::Api(ApiError::Unauthorized).is_critical());
        assert!(AppError::Api(ApiError::Forbidden).is_critical());
        assert!(AppError::Config(ConfigError::NoConfigDir).is_critical());
        assert!(!AppError::Api(ApiError::RateLimited).is_critical());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(AppError::Api(ApiError::RateLimited).is_recoverable());
        assert!(AppError::Api(ApiError::NotFound("x".to_string())).is_recoverable());
        assert!(!AppError::Api(ApiError::Unauthorized).is_recoverable());
    }

    #[test]
    fn test_suggested_action() {
        let action = AppError::Api(ApiError::MissingToken("sede".to_string())).suggested_action();
        assert!(action.unwrap().contains("set-token"));
        assert!(AppError::other("x").suggested_action().is_none());
    }

    #[test]
    fn test_terminal_and_other_errors() {
        assert_eq!(AppError::terminal("tty").user_message(), "Erro de terminal: tty");
        assert_eq!(AppError::other("algo").user_message(), "algo");
    }
}
