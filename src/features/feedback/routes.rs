use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::feedback::handlers;
use crate::features::feedback::services::FeedbackService;

/// Create routes for the feedback feature
///
/// Public: the feedback form is submitted anonymously. Methods other than
/// POST get a JSON 405 instead of axum's empty default.
pub fn routes(service: Arc<FeedbackService>) -> Router {
    Router::new()
        .route(
            "/api/feedback",
            post(handlers::submit_feedback).fallback(handlers::method_not_allowed),
        )
        .with_state(service)
}
