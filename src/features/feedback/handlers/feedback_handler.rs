use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::value::RawValue;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::feedback::dtos::{FeedbackRequestDto, FeedbackResponseDto};
use crate::features::feedback::services::FeedbackService;
use crate::shared::types::ErrorResponse;

/// Submit feedback
///
/// Validates the ratings, renders the submission as an issue and forwards it
/// to the configured GitHub repository. Without relay credentials the
/// submission is accepted with `stored: false`.
#[utoipa::path(
    post,
    path = "/api/feedback",
    request_body = FeedbackRequestDto,
    responses(
        (status = 200, description = "Feedback accepted", body = FeedbackResponseDto),
        (status = 400, description = "Invalid ratings or malformed body", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Issue tracker rejected the issue or relay failed", body = ErrorResponse)
    ),
    tag = "feedback"
)]
pub async fn submit_feedback(
    State(service): State<Arc<FeedbackService>>,
    AppJson(body): AppJson<Box<RawValue>>,
) -> Result<Json<FeedbackResponseDto>> {
    let dto = FeedbackRequestDto::from_raw(&body);
    let response = service.submit(dto).await?;
    Ok(Json(response))
}

/// Fallback for every method other than POST
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
