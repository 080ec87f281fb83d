//! Error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use packing::PackingError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but not allowed to touch the target
    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalServerError,

    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl From<PackingError> for ApiError {
    fn from(err: PackingError) -> Self {
        match err {
            PackingError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PackingError::Unauthorized => ApiError::Forbidden,
            PackingError::Validation(msg) => ApiError::BadRequest(msg),
            PackingError::Store(e) => ApiError::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use packing::EntityKind;

    #[test]
    fn test_packing_errors_map_to_status_codes() {
        let cases = [
            (
                PackingError::not_found(EntityKind::List, "42"),
                StatusCode::NOT_FOUND,
            ),
            (PackingError::Unauthorized, StatusCode::FORBIDDEN),
            (
                PackingError::Validation("Name is required".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                PackingError::Store(common::error::DatabaseError::Decode("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_not_found_message_names_the_entity() {
        let err = ApiError::from(PackingError::not_found(EntityKind::Category, "abc"));
        assert_eq!(err.to_string(), "Category not found: abc");
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
