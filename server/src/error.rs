use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use statsd_common::ErrorResponse;
use thiserror::Error;
use tracing::error;

/// Failures surfaced by the credential and stats stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection not initialized")]
    NotInitialized,
    #[error("username already in use")]
    Duplicate,
    #[error("{0} not found")]
    NotFound(String),
    #[error("unsupported database url: {0}")]
    UnsupportedBackend(String),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("password is longer than {} bytes", crate::passwords::MAX_PASSWORD_BYTES)]
    PasswordTooLong,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Error type returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid username or password")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Store(StoreError::PasswordTooLong) => {
                (StatusCode::BAD_REQUEST, "Password is too long".to_string())
            }
            ApiError::Store(StoreError::Duplicate) => {
                (StatusCode::FORBIDDEN, "Username already in use".to_string())
            }
            ApiError::Store(StoreError::NotFound(what)) => {
                (StatusCode::NOT_FOUND, format!("{what} not found"))
            }
            ApiError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("API error: {:?}", self);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::Store(StoreError::Duplicate), StatusCode::FORBIDDEN),
            (ApiError::Store(StoreError::PasswordTooLong), StatusCode::BAD_REQUEST),
            (ApiError::Store(StoreError::NotFound("user carol".into())), StatusCode::NOT_FOUND),
            (ApiError::Store(StoreError::NotInitialized), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Store(StoreError::Sqlx(sqlx::Error::PoolClosed)), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_errors_are_sanitized() {
        let error = ApiError::Store(StoreError::UnsupportedBackend("mysql://secret@db".into()));
        let (_, message) = error.status_and_message();

        assert_eq!(message, "Internal server error");
    }
}
