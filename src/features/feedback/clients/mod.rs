mod github_issue_client;
mod issue_tracker;

pub use github_issue_client::GithubIssueClient;
pub use issue_tracker::{IssueTracker, TrackerError};
