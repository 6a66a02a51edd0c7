use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::core::config::GithubConfig;
use crate::features::feedback::clients::{IssueTracker, TrackerError};
use crate::features::feedback::models::{CreatedIssue, IssuePayload};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Client for the GitHub issues REST API
pub struct GithubIssueClient {
    http_client: reqwest::Client,
    issues_url: String,
    token: String,
}

impl GithubIssueClient {
    pub fn new(
        api_base_url: &str,
        repo: &str,
        token: impl Into<String>,
        user_agent: &str,
    ) -> Result<Self, TrackerError> {
        let (owner, name) = repo
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| TrackerError::InvalidRepository(repo.to_string()))?;

        let issues_url = format!(
            "{}/repos/{}/{}/issues",
            api_base_url.trim_end_matches('/'),
            urlencoding::encode(owner),
            urlencoding::encode(name)
        );

        // GitHub rejects API requests without a User-Agent
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TrackerError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            issues_url,
            token: token.into(),
        })
    }

    /// Builds a client when both token and repository are configured
    pub fn from_config(config: &GithubConfig) -> Result<Option<Self>, TrackerError> {
        match config.credentials() {
            Some((token, repo)) => {
                Self::new(&config.api_base_url, repo, token, &config.user_agent).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn issues_url(&self) -> &str {
        &self.issues_url
    }
}

#[async_trait]
impl IssueTracker for GithubIssueClient {
    async fn create_issue(&self, payload: &IssuePayload) -> Result<CreatedIssue, TrackerError> {
        tracing::debug!("Creating GitHub issue at {}", self.issues_url);

        let response = self
            .http_client
            .post(&self.issues_url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send issue to GitHub: {}", e);
                TrackerError::Transport(e.to_string())
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("GitHub API error: HTTP {}", status);
            return Err(TrackerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<CreatedIssue>().await.map_err(|e| {
            tracing::error!("Failed to parse GitHub issue response: {}", e);
            TrackerError::Decode(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn payload() -> IssuePayload {
        IssuePayload {
            title: "[Feedback] app v1.0.0 – 2024-05-01T12:00:00.000Z".to_string(),
            body: "Overall: 4/5".to_string(),
            labels: vec!["feedback".to_string()],
        }
    }

    #[test]
    fn test_issues_url_encodes_segments() {
        let client =
            GithubIssueClient::new("https://api.github.com/", "octo-org/my.repo", "t", "ua")
                .unwrap();
        assert_eq!(
            client.issues_url(),
            "https://api.github.com/repos/octo-org/my.repo/issues"
        );
    }

    #[test]
    fn test_rejects_malformed_repo() {
        for repo in ["no-slash", "/repo", "owner/", "a/b/c"] {
            assert!(matches!(
                GithubIssueClient::new("https://api.github.com", repo, "t", "ua"),
                Err(TrackerError::InvalidRepository(_))
            ));
        }
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let mut config = GithubConfig {
            token: Some("t".to_string()),
            repo: None,
            api_base_url: "https://api.github.com".to_string(),
            user_agent: "ua".to_string(),
        };
        assert!(GithubIssueClient::from_config(&config).unwrap().is_none());

        config.repo = Some("octo/feedback".to_string());
        assert!(GithubIssueClient::from_config(&config).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_issue_sends_expected_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/octo/feedback/issues")
            .match_header("authorization", "token test-token")
            .match_header("accept", GITHUB_ACCEPT)
            .match_header("content-type", "application/json")
            .match_header("user-agent", "feedback-relay-test")
            .match_body(Matcher::Json(json!({
                "title": "[Feedback] app v1.0.0 – 2024-05-01T12:00:00.000Z",
                "body": "Overall: 4/5",
                "labels": ["feedback"]
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "number": 42,
                    "html_url": "https://github.com/octo/feedback/issues/42"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client =
            GithubIssueClient::new(&server.url(), "octo/feedback", "test-token", "feedback-relay-test")
                .unwrap();
        let issue = client.create_issue(&payload()).await.unwrap();

        assert_eq!(
            issue.html_url.as_deref(),
            Some("https://github.com/octo/feedback/issues/42")
        );
        assert_eq!(issue.number, Some(42));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_issue_surfaces_rejection_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/octo/feedback/issues")
            .with_status(401)
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create_async()
            .await;

        let client =
            GithubIssueClient::new(&server.url(), "octo/feedback", "bad", "ua").unwrap();
        let err = client.create_issue(&payload()).await.unwrap_err();

        match err {
            TrackerError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, r#"{"message":"Bad credentials"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_issue_undecodable_success_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/repos/octo/feedback/issues")
            .with_status(201)
            .with_body("not json")
            .create_async()
            .await;

        let client = GithubIssueClient::new(&server.url(), "octo/feedback", "t", "ua").unwrap();
        let err = client.create_issue(&payload()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Decode(_)));
    }

    #[tokio::test]
    async fn test_create_issue_unreachable_host() {
        // Port 1 on localhost is closed in any sane test environment
        let client = GithubIssueClient::new("http://127.0.0.1:1", "octo/feedback", "t", "ua")
            .unwrap();
        let err = client.create_issue(&payload()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Transport(_)));
    }
}
