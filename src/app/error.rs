use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::Error as SqlxError;

/// Application error type for unified error handling across the app.
///
/// Missing/expired session (401) and insufficient rights (403) are distinct
/// variants on purpose: callers must be able to tell them apart.
#[derive(Debug)]
pub enum AppError {
    /// Validation errors (400 Bad Request) - invalid input data
    Validation(String),

    /// No authenticated session (401 Unauthorized)
    Unauthorized,

    /// Session present but insufficient rights (403 Forbidden)
    Forbidden(String),

    /// Referenced entity not found (404 Not Found)
    NotFound(String),

    /// Database errors (500 Internal Server Error)
    Database(SqlxError),

    /// Generic internal errors (500 Internal Server Error)
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Database(err) => {
                tracing::error!(%err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}
