use crate::services::gallery_service::GalleryError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for request-level errors that keeps the message
/// local. Serializes as `{message}` or `{message, error}` when a raw error
/// detail is attached (500s only).
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            detail: None,
        }
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for a 500 Internal Server Error carrying the raw error
    /// string alongside a generic message.
    pub fn internal(msg: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
            detail: Some(detail.to_string()),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self.detail {
            Some(detail) => Json(json!({ "message": self.message, "error": detail })),
            None => Json(json!({ "message": self.message })),
        };

        (self.status, body).into_response()
    }
}

impl From<GalleryError> for AppError {
    fn from(err: GalleryError) -> Self {
        match err {
            GalleryError::UserNotFound(_) => AppError::not_found("User not found"),
            GalleryError::PhotoNotFoundOrForbidden
            | GalleryError::CommentNotFoundOrForbidden => AppError::not_found(err.to_string()),
            GalleryError::EmptyComment
            | GalleryError::InvalidFileType
            | GalleryError::FileTooLarge => AppError::bad_request(err.to_string()),
            GalleryError::Sqlx(ref source) => {
                tracing::error!("store failure: {}", source);
                AppError::internal("Internal server error", source)
            }
            GalleryError::Io(ref source) => {
                tracing::error!("upload I/O failure: {}", source);
                AppError::internal("Internal server error", source)
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal("Internal server error", err)
    }
}
