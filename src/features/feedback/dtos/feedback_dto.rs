use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Inbound feedback submission.
///
/// Every field is kept as raw JSON: ratings may arrive as numbers or numeric
/// strings, `helpful` as a string or a list, and `time` as a string or epoch
/// milliseconds. Coercion happens in the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FeedbackRequestDto {
    /// Overall rating (number or numeric string)
    #[schema(value_type = Option<f64>, example = 4)]
    pub overall: Option<Value>,

    #[schema(value_type = Option<f64>, example = 5)]
    pub clarity: Option<Value>,

    #[schema(value_type = Option<f64>, example = 3)]
    pub functionality: Option<Value>,

    #[schema(value_type = Option<f64>, example = 4)]
    pub structure: Option<Value>,

    /// Single value or list of values
    #[schema(value_type = Option<Vec<String>>, example = json!(["search", "export"]))]
    pub helpful: Option<Value>,

    /// Free text, truncated to 5000 characters
    #[schema(value_type = Option<String>)]
    pub comment: Option<Value>,

    #[schema(value_type = Option<String>, example = "gpt-export-viewer")]
    pub app: Option<Value>,

    #[schema(value_type = Option<String>, example = "0.2.1")]
    pub version: Option<Value>,

    /// ISO-8601 timestamp
    #[schema(value_type = Option<String>, example = "2024-05-01T12:00:00.000Z")]
    pub time: Option<Value>,

    /// Client user agent
    #[schema(value_type = Option<String>)]
    pub ua: Option<Value>,
}

impl FeedbackRequestDto {
    /// Builds the DTO from any JSON body.
    ///
    /// Anything that is not an object is treated as an empty submission, which
    /// then fails rating validation.
    pub fn from_value(body: Value) -> Self {
        match body {
            Value::Object(_) => serde_json::from_value(body).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Builds the DTO from the raw request body.
    ///
    /// Fields are decoded one by one. A field that cannot be held as a JSON
    /// value, such as a number outside the `f64` range, is dropped, so an
    /// out-of-range rating fails rating validation rather than the whole body.
    pub fn from_raw(body: &RawValue) -> Self {
        let fields: HashMap<String, Box<RawValue>> = match serde_json::from_str(body.get()) {
            Ok(fields) => fields,
            Err(_) => return Self::default(),
        };

        let object: Map<String, Value> = fields
            .into_iter()
            .filter_map(|(key, raw)| {
                serde_json::from_str::<Value>(raw.get())
                    .ok()
                    .map(|value| (key, value))
            })
            .collect();

        Self::from_value(Value::Object(object))
    }
}

/// Response for an accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponseDto {
    pub ok: bool,
    /// `false` when relay is not configured and nothing was forwarded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<bool>,
    /// URL of the created issue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

impl FeedbackResponseDto {
    pub fn not_stored() -> Self {
        Self {
            ok: true,
            stored: Some(false),
            issue: None,
        }
    }

    pub fn relayed(issue: Option<String>) -> Self {
        Self {
            ok: true,
            stored: None,
            issue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_reads_object_fields() {
        let dto = FeedbackRequestDto::from_value(json!({
            "overall": 4,
            "clarity": "5",
            "helpful": ["a", "b"],
            "unknown": true
        }));
        assert_eq!(dto.overall, Some(json!(4)));
        assert_eq!(dto.clarity, Some(json!("5")));
        assert_eq!(dto.helpful, Some(json!(["a", "b"])));
        assert!(dto.comment.is_none());
    }

    #[test]
    fn test_from_value_ignores_non_objects() {
        let dto = FeedbackRequestDto::from_value(json!([4, 4, 4, 4]));
        assert!(dto.overall.is_none());

        let dto = FeedbackRequestDto::from_value(Value::Null);
        assert!(dto.overall.is_none());
    }

    #[test]
    fn test_from_raw_drops_out_of_range_numbers() {
        let raw = RawValue::from_string(
            r#"{"overall":1e400,"clarity":3,"helpful":[1e400],"comment":"hi"}"#.to_string(),
        )
        .unwrap();

        let dto = FeedbackRequestDto::from_raw(&raw);
        assert!(dto.overall.is_none());
        assert_eq!(dto.clarity, Some(json!(3)));
        assert!(dto.helpful.is_none());
        assert_eq!(dto.comment, Some(json!("hi")));
    }

    #[test]
    fn test_from_raw_ignores_non_objects() {
        let raw = RawValue::from_string("[1e400, 4]".to_string()).unwrap();
        assert!(FeedbackRequestDto::from_raw(&raw).overall.is_none());

        let raw = RawValue::from_string(r#""text""#.to_string()).unwrap();
        assert!(FeedbackRequestDto::from_raw(&raw).overall.is_none());
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(
            serde_json::to_value(FeedbackResponseDto::not_stored()).unwrap(),
            json!({ "ok": true, "stored": false })
        );
        assert_eq!(
            serde_json::to_value(FeedbackResponseDto::relayed(Some("https://x/1".into())))
                .unwrap(),
            json!({ "ok": true, "issue": "https://x/1" })
        );
        assert_eq!(
            serde_json::to_value(FeedbackResponseDto::relayed(None)).unwrap(),
            json!({ "ok": true })
        );
    }
}
