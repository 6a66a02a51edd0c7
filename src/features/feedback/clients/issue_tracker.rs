use async_trait::async_trait;
use thiserror::Error;

use crate::features::feedback::models::{CreatedIssue, IssuePayload};

#[derive(Debug, Error)]
pub enum TrackerError {
    /// The tracker answered with a non-success status; `body` is its raw response
    #[error("Issue tracker returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to reach issue tracker: {0}")]
    Transport(String),

    #[error("Failed to parse issue tracker response: {0}")]
    Decode(String),

    #[error("Invalid repository identifier: {0}")]
    InvalidRepository(String),
}

/// Outbound boundary for relaying feedback issues
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn create_issue(&self, payload: &IssuePayload) -> Result<CreatedIssue, TrackerError>;
}
