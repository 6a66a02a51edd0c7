use utoipa::{Modify, OpenApi};

use crate::features::feedback::{dtos as feedback_dtos, handlers as feedback_handlers};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Feedback (public)
        feedback_handlers::submit_feedback,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            // Feedback
            feedback_dtos::FeedbackRequestDto,
            feedback_dtos::FeedbackResponseDto,
        )
    ),
    tags(
        (name = "feedback", description = "User feedback relayed to GitHub issues (public)"),
    ),
    info(
        title = "Feedback Relay API",
        version = "0.1.0",
        description = "Forwards user feedback to GitHub issues",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_feedback_endpoint() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/feedback"));

        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("FeedbackRequestDto"));
        assert!(schemas.contains_key("ErrorResponse"));
    }
}
