use std::env;

use validator::Validate;

use crate::shared::constants::{
    DEFAULT_COMMENT_MAX_CHARS, LEGACY_RATING_MAX, STRICT_RATING_MAX,
};
use crate::shared::validation::REPO_REGEX;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub github: GithubConfig,
    pub feedback: FeedbackPolicy,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

/// Credentials and endpoint for relaying feedback as GitHub issues.
///
/// Relay is enabled only when both `token` and `repo` are present.
#[derive(Clone, Validate)]
pub struct GithubConfig {
    pub token: Option<String>,
    /// Target repository as `owner/repo`
    #[validate(regex(path = *REPO_REGEX, message = "GH_REPO must look like owner/repo"))]
    pub repo: Option<String>,
    pub api_base_url: String,
    pub user_agent: String,
}

/// Validation and rendering policy for feedback submissions.
///
/// The deployed variants of the feedback form disagree on the rating scale
/// and on how strictly the comment is sanitized, so all of it is configuration.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct FeedbackPolicy {
    /// Inclusive upper bound for every rating; the lower bound is always 1
    #[validate(range(min = 1, message = "FEEDBACK_RATING_MAX must be at least 1"))]
    pub rating_max: u32,
    /// Accept ratings sent as numeric strings such as `"4"`
    pub coerce_numeric_strings: bool,
    /// Remove C0/C1 control characters from the comment
    pub strip_control_chars: bool,
    /// Truncate the comment to this many characters; `None` keeps it whole
    pub comment_max_chars: Option<usize>,
    /// Emit `App:` and `Version:` lines in the issue's meta section
    pub include_app_meta: bool,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            github: GithubConfig::from_env()?,
            feedback: FeedbackPolicy::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 64 * 1024; // 64KB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl GithubConfig {
    const DEFAULT_API_BASE_URL: &'static str = "https://api.github.com";
    const DEFAULT_USER_AGENT: &'static str = "feedback-relay";

    pub fn from_env() -> Result<Self, String> {
        // Empty values count as unset so a blank GH_TOKEN= line disables relay
        let token = env::var("GH_TOKEN").ok().filter(|s| !s.trim().is_empty());
        let repo = env::var("GH_REPO")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let api_base_url = env::var("GITHUB_API_URL")
            .unwrap_or_else(|_| Self::DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let user_agent =
            env::var("GITHUB_USER_AGENT").unwrap_or_else(|_| Self::DEFAULT_USER_AGENT.to_string());

        let config = Self {
            token,
            repo,
            api_base_url,
            user_agent,
        };
        config.validate().map_err(|e| e.to_string())?;

        Ok(config)
    }

    /// Returns `(token, repo)` when relay is fully configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.token, &self.repo) {
            (Some(token), Some(repo)) => Some((token.as_str(), repo.as_str())),
            _ => None,
        }
    }
}

// Hand-written so the token never ends up in logs
impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("repo", &self.repo)
            .field("api_base_url", &self.api_base_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl FeedbackPolicy {
    /// 1-5 scale with string coercion, sanitizing and truncation
    pub fn strict() -> Self {
        Self {
            rating_max: STRICT_RATING_MAX,
            coerce_numeric_strings: true,
            strip_control_chars: true,
            comment_max_chars: Some(DEFAULT_COMMENT_MAX_CHARS),
            include_app_meta: true,
        }
    }

    /// 1-10 scale, native numbers only, comment passed through untouched
    pub fn legacy() -> Self {
        Self {
            rating_max: LEGACY_RATING_MAX,
            coerce_numeric_strings: false,
            strip_control_chars: false,
            comment_max_chars: None,
            include_app_meta: false,
        }
    }

    pub fn from_env() -> Result<Self, String> {
        let mut policy = match env::var("FEEDBACK_POLICY")
            .unwrap_or_else(|_| "strict".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "strict" => Self::strict(),
            "legacy" => Self::legacy(),
            other => {
                return Err(format!(
                    "FEEDBACK_POLICY must be 'strict' or 'legacy', got '{}'",
                    other
                ))
            }
        };

        if let Ok(value) = env::var("FEEDBACK_RATING_MAX") {
            policy.rating_max = value
                .parse::<u32>()
                .map_err(|_| "FEEDBACK_RATING_MAX must be a valid number".to_string())?;
        }

        if let Ok(value) = env::var("FEEDBACK_COMMENT_MAX_CHARS") {
            let max = value
                .parse::<usize>()
                .map_err(|_| "FEEDBACK_COMMENT_MAX_CHARS must be a valid number".to_string())?;
            policy.comment_max_chars = (max > 0).then_some(max);
        }

        if let Some(flag) = bool_from_env("FEEDBACK_COERCE_NUMERIC_STRINGS")? {
            policy.coerce_numeric_strings = flag;
        }
        if let Some(flag) = bool_from_env("FEEDBACK_STRIP_CONTROL_CHARS")? {
            policy.strip_control_chars = flag;
        }
        if let Some(flag) = bool_from_env("FEEDBACK_INCLUDE_APP_META")? {
            policy.include_app_meta = flag;
        }

        policy.validate().map_err(|e| e.to_string())?;

        Ok(policy)
    }
}

impl Default for FeedbackPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Feedback Relay API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Forwards user feedback to GitHub issues".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

fn bool_from_env(key: &str) -> Result<Option<bool>, String> {
    match env::var(key) {
        Ok(value) => parse_bool(&value)
            .map(Some)
            .ok_or_else(|| format!("{} must be true or false", key)),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github(token: Option<&str>, repo: Option<&str>) -> GithubConfig {
        GithubConfig {
            token: token.map(String::from),
            repo: repo.map(String::from),
            api_base_url: "https://api.github.com".to_string(),
            user_agent: "test".to_string(),
        }
    }

    #[test]
    fn test_github_credentials_require_token_and_repo() {
        assert!(github(None, None).credentials().is_none());
        assert!(github(Some("t"), None).credentials().is_none());
        assert!(github(None, Some("o/r")).credentials().is_none());
        assert_eq!(
            github(Some("t"), Some("o/r")).credentials(),
            Some(("t", "o/r"))
        );
    }

    #[test]
    fn test_github_repo_format_is_validated() {
        assert!(github(Some("t"), Some("octo-org/feedback.repo")).validate().is_ok());
        assert!(github(None, None).validate().is_ok());
        assert!(github(Some("t"), Some("just-a-name")).validate().is_err());
        assert!(github(Some("t"), Some("a/b/c")).validate().is_err());
    }

    #[test]
    fn test_github_debug_hides_token() {
        let rendered = format!("{:?}", github(Some("ghp_secret"), Some("o/r")));
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_policy_presets() {
        let strict = FeedbackPolicy::strict();
        assert_eq!(strict.rating_max, 5);
        assert!(strict.coerce_numeric_strings);
        assert!(strict.strip_control_chars);
        assert_eq!(strict.comment_max_chars, Some(5000));
        assert_eq!(FeedbackPolicy::default(), strict);

        let legacy = FeedbackPolicy::legacy();
        assert_eq!(legacy.rating_max, 10);
        assert!(!legacy.coerce_numeric_strings);
        assert!(!legacy.strip_control_chars);
        assert!(!legacy.include_app_meta);
    }

    #[test]
    fn test_policy_rejects_zero_scale() {
        let policy = FeedbackPolicy {
            rating_max: 0,
            ..FeedbackPolicy::strict()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" ON "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("nope"), None);
    }
}
