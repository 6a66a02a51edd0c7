use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::features::feedback::clients::TrackerError;
use crate::shared::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid ratings")]
    InvalidRatings,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The issue tracker answered with a non-success status
    #[error("Issue tracker rejected the request: {0}")]
    RelayRejected(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Rejected { body, .. } => AppError::RelayRejected(body),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse::new("Method not allowed"),
            ),
            AppError::InvalidRatings => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new("invalid_ratings"))
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details("bad_request", msg),
            ),
            AppError::RelayRejected(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("github_error", details),
            ),
            AppError::Internal(details) => {
                tracing::error!("Internal error: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("server_error", details),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
