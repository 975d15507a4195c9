use serde::Serialize;
use serde_json::Value;

use crate::web::error::ApiError;

#[derive(Debug, Default)]
pub struct PromptRequest {
    pub prompt: Option<Value>,
}

impl PromptRequest {
    // Only a JSON object is a valid body; arrays and scalars are rejected
    // before the prompt is looked at.
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        match body {
            Value::Object(mut fields) => Ok(Self {
                prompt: fields.remove("prompt"),
            }),
            other => Err(ApiError::InvalidBody(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    // The prompt text, if one was supplied. Missing, null, empty and
    // non-string values all count as absent.
    pub fn prompt(&self) -> Option<&str> {
        match &self.prompt {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub error: ErrorDetail,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
            },
        }
    }
}
