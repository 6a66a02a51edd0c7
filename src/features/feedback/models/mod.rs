mod feedback;

pub use feedback::{CreatedIssue, FeedbackSubmission, IssuePayload, Ratings};
