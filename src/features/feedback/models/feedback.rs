use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four required ratings, already coerced and range-checked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratings {
    pub overall: f64,
    pub clarity: f64,
    pub functionality: f64,
    pub structure: f64,
}

/// A validated and normalized feedback submission.
///
/// Lives for the duration of one request and is never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSubmission {
    pub ratings: Ratings,
    /// Helpful selection, joined with ", " when it arrived as a list; "-" when absent
    pub helpful: String,
    /// Truncated, optionally sanitized comment; "(none)" when empty
    pub comment: String,
    pub app: Option<String>,
    pub version: Option<String>,
    pub user_agent: Option<String>,
    /// Submission time, or the time of receipt when absent or unparseable
    pub time: DateTime<Utc>,
    /// The `time` field exactly as sent
    pub raw_time: Option<String>,
}

/// Issue creation payload for the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePayload {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// The subset of the tracker's issue response the relay cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub number: Option<u64>,
}
