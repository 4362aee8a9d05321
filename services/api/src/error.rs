//! Custom error types for the API service

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::StoreError;
use identity::{IdentityError, validation::ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::models::InvalidValue;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Role or ownership violation
    #[error("{0}")]
    Forbidden(String),

    /// Missing user, lesson or teacher
    #[error("{0}")]
    NotFound(String),

    /// Bad input
    #[error("{0}")]
    InvalidArgument(String),

    /// Key-value store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity provider failure
    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),
}

impl ApiError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidArgument(msg.into())
    }

    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(e) => {
                error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Identity(IdentityError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            ApiError::Identity(IdentityError::Rejected(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Identity(IdentityError::Unavailable(e)) => {
                error!("Identity provider unavailable: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Identity provider unavailable".to_string(),
                )
            }
            ApiError::Identity(IdentityError::Internal(e)) => {
                error!("Identity error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidArgument(rejection.body_text())
    }
}

impl From<InvalidValue> for ApiError {
    fn from(e: InvalidValue) -> Self {
        ApiError::InvalidArgument(e.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::InvalidArgument(e.to_string())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status(ApiError::forbidden("no")), StatusCode::FORBIDDEN);
        assert_eq!(status(ApiError::not_found("gone")), StatusCode::NOT_FOUND);
        assert_eq!(status(ApiError::invalid("bad")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(StoreError::Connection("down".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(IdentityError::InvalidToken.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(IdentityError::Rejected("dup".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(IdentityError::Unavailable("timeout".into()).into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_store_details_are_hidden() {
        let (_, message) =
            ApiError::from(StoreError::Connection("redis://secret@host".into())).status_and_message();
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn test_invalid_value_message() {
        let (status, message) =
            ApiError::from(InvalidValue::new("subject", "cooking")).status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid subject: cooking");
    }
}
