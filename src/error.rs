use crate::secrets::{IssueError, ValidationError};
use crate::vault::VaultError;
use thiserror::Error;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid secret payload: {0}")]
    Validation(#[from] ValidationError),

    /// Uniform outward result for unknown, expired, or foreign tokens.
    /// The reason is deliberately not distinguishable.
    #[error("Not found")]
    NotFound,

    #[error("Backing store error: {0}")]
    Vault(#[from] VaultError),
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::Validation(e) => Self::Validation(e),
            IssueError::Vault(e) => Self::Vault(e),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convert AppError to HTTP status codes for web responses
impl AppError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            // The store could not be reached at all
            Self::Vault(VaultError::Transport(_)) => StatusCode::SERVICE_UNAVAILABLE,
            // The store answered, but not with anything we can honor
            Self::Vault(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16()
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Validation(ValidationError::TooFewFields { min: 1, actual: 0 }).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Vault(VaultError::Forbidden).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Vault(VaultError::Status { status: 500, body: "sealed".to_string() })
                .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_not_found_message_is_uniform() {
        // Callers must not be able to tell a wrong token from an expired one
        assert_eq!(AppError::NotFound.to_string(), "Not found");
    }
}
