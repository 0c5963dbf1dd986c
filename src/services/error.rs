use super::web::ApiResponse;
use crate::db::core::DbError;
use crate::patch::PatchError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

/// Handler error, rendered as an `ApiResponse` error envelope
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// Body could not be read as JSON; keeps the rejection's status (400, 415, 422)
    #[error(transparent)]
    Body(#[from] JsonRejection),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),
}

impl ApiError {
    /// Like `From<DbError>`, but a unique-key violation reports `message`
    pub fn db_with_conflict(error: DbError, message: &str) -> Self {
        match error {
            DbError::UniqueViolation(detail) => {
                tracing::debug!(%detail, "Unique constraint violation");
                ApiError::Conflict(message.to_string())
            }
            other => ApiError::Db(other),
        }
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Patch(e) | ApiError::Db(DbError::Statement(e)) if e.is_client_error() => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Patch(e) | ApiError::Db(DbError::Statement(e)) => {
                tracing::error!(error = %e, "Refusing to execute malformed statement");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Db(DbError::UniqueViolation(_)) => (
                StatusCode::CONFLICT,
                "A record with this value already exists".to_string(),
            ),
            ApiError::Db(DbError::NotNullViolation(_)) => (
                StatusCode::BAD_REQUEST,
                "A required field is missing".to_string(),
            ),
            ApiError::Db(DbError::ForeignKeyViolation(_)) => (
                StatusCode::BAD_REQUEST,
                "Referenced record does not exist".to_string(),
            ),
            ApiError::Db(e) => {
                tracing::error!(error = %e, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                )
            }
            ApiError::Body(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Db(e) = &self {
            if e.is_constraint_violation() {
                tracing::debug!(error = %e, "Constraint violation");
            }
        }
        let (status, message) = self.status_and_message();
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
