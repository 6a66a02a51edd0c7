#[cfg(test)]
use crate::features::feedback::clients::{IssueTracker, TrackerError};
#[cfg(test)]
use crate::features::feedback::models::{CreatedIssue, IssuePayload};

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use std::sync::Mutex;

/// Canned answer for [`MockIssueTracker`]
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockReply {
    Created(Option<String>),
    Rejected(u16, String),
    Transport(String),
    Panic(&'static str),
}

/// Issue tracker double that records every payload it receives
#[cfg(test)]
pub struct MockIssueTracker {
    reply: MockReply,
    calls: Mutex<Vec<IssuePayload>>,
}

#[cfg(test)]
impl MockIssueTracker {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<IssuePayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl IssueTracker for MockIssueTracker {
    async fn create_issue(&self, payload: &IssuePayload) -> Result<CreatedIssue, TrackerError> {
        self.calls.lock().unwrap().push(payload.clone());

        match &self.reply {
            MockReply::Created(url) => Ok(CreatedIssue {
                html_url: url.clone(),
                number: Some(1),
            }),
            MockReply::Rejected(status, body) => Err(TrackerError::Rejected {
                status: *status,
                body: body.clone(),
            }),
            MockReply::Transport(msg) => Err(TrackerError::Transport(msg.clone())),
            MockReply::Panic(msg) => panic!("{}", msg),
        }
    }
}
