//! Request-level error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::image::ImageError;
use crate::store::StoreError;

/// Error body shared by every JSON endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    /// Store, storage or other backend failure. Details are logged, not returned.
    #[error("backend error: {0}")]
    Backend(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => AppError::NotFound(format!("{} not found", entity)),
            StoreError::AlreadyExists { entity, .. } => {
                AppError::Conflict(format!("{} already exists", entity))
            }
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Forbidden { entity, .. } => {
                AppError::Forbidden(format!("{} belongs to another user", entity))
            }
            StoreError::InvalidField(msg) => AppError::Validation(msg),
            StoreError::Database(e) => AppError::Backend(e.to_string()),
            StoreError::Serialization(e) => AppError::Backend(e.to_string()),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::SizeExceeded { limit, .. } => AppError::PayloadTooLarge(format!(
                "Image size should be less than {}KB. Please compress your image.",
                limit / 1024
            )),
            ImageError::InvalidType(content_type) => {
                AppError::UnsupportedMediaType(format!("Not an image: {}", content_type))
            }
            ImageError::Storage(e) => AppError::Backend(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Backend(detail) => {
                tracing::error!(error = %detail, "backend failure");
                ErrorResponse {
                    error: "Something went wrong".to_string(),
                    message: None,
                }
            }
            other => {
                if status.is_client_error() {
                    tracing::debug!(status = %status, error = %other, "request rejected");
                }
                ErrorResponse {
                    error: other.to_string(),
                    message: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_statuses() {
        let cases: Vec<(StoreError, StatusCode)> = vec![
            (StoreError::not_found("Blog", "x"), StatusCode::NOT_FOUND),
            (StoreError::already_exists("User", "x"), StatusCode::CONFLICT),
            (StoreError::Conflict("taken".into()), StatusCode::CONFLICT),
            (StoreError::forbidden("Blog", "x"), StatusCode::FORBIDDEN),
            (StoreError::InvalidField("bad".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_image_errors_map_to_statuses() {
        let too_big = AppError::from(ImageError::SizeExceeded {
            size: 600 * 1024,
            limit: 500 * 1024,
        });
        assert_eq!(too_big.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(too_big.to_string().contains("500KB"));

        let wrong = AppError::from(ImageError::InvalidType("text/plain".into()));
        assert_eq!(wrong.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_backend_error_hides_details() {
        let response = AppError::Backend("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Something went wrong");
    }
}
