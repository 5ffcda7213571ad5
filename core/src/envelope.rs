//! The `{ "code": 0, "data": { ... } }` envelope both backends answer with.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ValidationError};
use crate::http::HttpResponse;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    pub fn parse(body: &str) -> Result<Self, ApiError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        if value.get("code").is_none() {
            return Err(ValidationError::MissingField {
                context: "response".to_string(),
                field: "code".to_string(),
            }
            .into());
        }
        serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// The `data` payload, or the application error a non-zero `code` means.
    pub fn into_data(self) -> Result<Value, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Application {
                code: self.code,
                message: self.message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(self.data.unwrap_or(Value::Null))
    }
}

/// Fail unless the response declares a JSON content type.
pub fn require_json_content(response: &HttpResponse) -> Result<(), ValidationError> {
    let content_type = response.content_type().unwrap_or("");
    if content_type.contains("application/json") {
        Ok(())
    } else {
        Err(ValidationError::NotJsonContent {
            content_type: content_type.to_string(),
        })
    }
}

/// Number of records in a decoded payload.
///
/// Looks at `data.list` and `data.video` first, then a top-level array, then
/// counts the keys of a top-level object.
pub fn record_count(value: &Value) -> usize {
    for pointer in ["/data/list", "/data/video"] {
        if let Some(list) = value.pointer(pointer).and_then(Value::as_array) {
            return list.len();
        }
    }
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 0,
    }
}

/// The array under `field` in `data`, or empty when absent.
pub(crate) fn array_field(data: &Value, field: &str) -> Vec<Value> {
    data.get(field)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Fail unless every named field is present on `item`.
pub(crate) fn require_fields(
    item: &Value,
    context: &str,
    fields: &[&str],
) -> Result<(), ValidationError> {
    for field in fields {
        if item.get(*field).is_none() {
            return Err(ValidationError::MissingField {
                context: context.to_string(),
                field: (*field).to_string(),
            });
        }
    }
    Ok(())
}
