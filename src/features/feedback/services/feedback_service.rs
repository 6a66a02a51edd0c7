use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::core::config::FeedbackPolicy;
use crate::core::error::{AppError, Result};
use crate::features::feedback::clients::IssueTracker;
use crate::features::feedback::dtos::{FeedbackRequestDto, FeedbackResponseDto};
use crate::features::feedback::models::{FeedbackSubmission, IssuePayload, Ratings};
use crate::shared::constants::{
    DEFAULT_APP_NAME, DEFAULT_APP_VERSION, EMPTY_COMMENT, EMPTY_PLACEHOLDER, FEEDBACK_LABEL,
    ISSUE_TITLE_PREFIX,
};
use crate::shared::validation::{strip_control_chars, truncate_chars};

/// Validates feedback submissions and relays them to the issue tracker.
///
/// Holds no mutable state; one instance serves every request.
pub struct FeedbackService {
    policy: FeedbackPolicy,
    tracker: Option<Arc<dyn IssueTracker>>,
}

impl FeedbackService {
    /// `tracker` is `None` when relay is not configured; submissions are then
    /// accepted without being forwarded.
    pub fn new(policy: FeedbackPolicy, tracker: Option<Arc<dyn IssueTracker>>) -> Self {
        Self { policy, tracker }
    }

    pub fn policy(&self) -> &FeedbackPolicy {
        &self.policy
    }

    pub fn is_relay_enabled(&self) -> bool {
        self.tracker.is_some()
    }

    /// Validate, render and (when configured) relay one submission
    pub async fn submit(&self, dto: FeedbackRequestDto) -> Result<FeedbackResponseDto> {
        let now = Utc::now();
        let submission = self.normalize(&dto, now)?;
        let payload = self.render(&submission, now);

        tracing::debug!("Rendered feedback issue: {}", payload.title);

        let Some(tracker) = self.tracker.as_ref() else {
            tracing::debug!("Issue relay not configured, feedback accepted without forwarding");
            return Ok(FeedbackResponseDto::not_stored());
        };

        let issue = tracker.create_issue(&payload).await.map_err(AppError::from)?;

        tracing::info!(
            "Feedback relayed: number={:?}, url={}",
            issue.number,
            issue.html_url.as_deref().unwrap_or("-")
        );

        Ok(FeedbackResponseDto::relayed(issue.html_url))
    }

    /// Coerce and check the ratings, then normalize the free-form fields.
    ///
    /// Fails with `InvalidRatings` before touching anything else if any of the
    /// four ratings is missing, non-numeric or out of range.
    pub fn normalize(
        &self,
        dto: &FeedbackRequestDto,
        now: DateTime<Utc>,
    ) -> Result<FeedbackSubmission> {
        let ratings = Ratings {
            overall: self.rating(dto.overall.as_ref())?,
            clarity: self.rating(dto.clarity.as_ref())?,
            functionality: self.rating(dto.functionality.as_ref())?,
            structure: self.rating(dto.structure.as_ref())?,
        };

        let raw_time = dto.time.as_ref().and_then(loose_string);
        let time = dto.time.as_ref().and_then(parse_time).unwrap_or(now);

        Ok(FeedbackSubmission {
            ratings,
            helpful: normalize_helpful(dto.helpful.as_ref()),
            comment: self.normalize_comment(dto.comment.as_ref()),
            app: dto.app.as_ref().and_then(loose_string),
            version: dto.version.as_ref().and_then(loose_string),
            user_agent: dto.ua.as_ref().and_then(loose_string),
            time,
            raw_time,
        })
    }

    /// Render the issue title and body for a normalized submission
    pub fn render(&self, submission: &FeedbackSubmission, now: DateTime<Utc>) -> IssuePayload {
        let scale = self.policy.rating_max;
        let ratings = &submission.ratings;

        let title = format!(
            "{} {} v{} – {}",
            ISSUE_TITLE_PREFIX,
            submission.app.as_deref().unwrap_or(DEFAULT_APP_NAME),
            submission.version.as_deref().unwrap_or(DEFAULT_APP_VERSION),
            iso_timestamp(submission.time)
        );

        let mut lines = vec![
            format!("Overall: {}/{}", ratings.overall, scale),
            format!("Clarity: {}/{}", ratings.clarity, scale),
            format!("Functionality: {}/{}", ratings.functionality, scale),
            format!("Structure: {}/{}", ratings.structure, scale),
            format!("Helpful: {}", submission.helpful),
            String::new(),
            "Comment:".to_string(),
            submission.comment.clone(),
            String::new(),
            "Meta:".to_string(),
        ];

        if self.policy.include_app_meta {
            lines.push(format!(
                "App: {}",
                submission.app.as_deref().unwrap_or(EMPTY_PLACEHOLDER)
            ));
            lines.push(format!(
                "Version: {}",
                submission.version.as_deref().unwrap_or(EMPTY_PLACEHOLDER)
            ));
        }

        lines.push(format!(
            "User-Agent: {}",
            submission.user_agent.as_deref().unwrap_or(EMPTY_PLACEHOLDER)
        ));
        lines.push(format!(
            "Time: {}",
            submission
                .raw_time
                .clone()
                .unwrap_or_else(|| iso_timestamp(now))
        ));

        IssuePayload {
            title,
            body: lines.join("\n"),
            labels: vec![FEEDBACK_LABEL.to_string()],
        }
    }

    fn rating(&self, value: Option<&Value>) -> Result<f64> {
        let n = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) if self.policy.coerce_numeric_strings => {
                s.trim().parse::<f64>().ok()
            }
            _ => None,
        };

        match n {
            Some(n) if n.is_finite() && n >= 1.0 && n <= f64::from(self.policy.rating_max) => {
                Ok(n)
            }
            _ => Err(AppError::InvalidRatings),
        }
    }

    fn normalize_comment(&self, value: Option<&Value>) -> String {
        let raw = value.and_then(loose_string).unwrap_or_default();

        let truncated = match self.policy.comment_max_chars {
            Some(max) => truncate_chars(&raw, max),
            None => raw.as_str(),
        };

        let comment = if self.policy.strip_control_chars {
            strip_control_chars(truncated)
        } else {
            truncated.to_string()
        };

        if comment.is_empty() {
            EMPTY_COMMENT.to_string()
        } else {
            comment
        }
    }
}

fn normalize_helpful(value: Option<&Value>) -> String {
    let helpful = match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => scalar_string(other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => loose_string(other).unwrap_or_default(),
        None => String::new(),
    };

    if helpful.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        helpful
    }
}

/// String form of a loosely typed field, `None` for falsy values
/// (null, false, 0, NaN and the empty string).
fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f == 0.0 || f.is_nan()) => None,
        other => Some(scalar_string(other)),
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Parse the submitted time; numbers are epoch milliseconds, strings may be
/// RFC 3339, RFC 2822, a naive date-time (taken as UTC) or a bare date.
fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|ms| ms.is_finite() && *ms != 0.0)
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64)),
        Value::String(s) => parse_time_str(s.trim()),
        _ => None,
    }
}

fn parse_time_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`
fn iso_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
