//! OpenAI Chat Completions request schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Request body for `POST /v1/chat/completions`.
///
/// Schema reference:
/// https://platform.openai.com/docs/api-reference/chat/create
///
/// Only the fields sqlpilot sends are typed; `extra` keeps anything else so a request captured by
/// a test server (or a compatible gateway) round-trips without losing fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    /// OpenAI docs: `string`, required.
    pub model: String,

    /// OpenAI docs: `array`, required.
    pub messages: Vec<ChatMessage>,

    /// OpenAI docs: `number`, optional, default `1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_roles_lowercase_and_skips_unset_temperature() {
        let body = ChatCompletionRequest::new(
            "gpt-4",
            vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
        );
        let value = serde_json::to_value(&body).expect("serialize request");

        assert_eq!(
            value,
            json!({
                "model": "gpt-4",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ]
            })
        );
    }

    #[test]
    fn unknown_fields_are_kept_in_extra() {
        let raw = r#"{"model":"m","messages":[],"temperature":0.2,"max_tokens":64}"#;
        let parsed: ChatCompletionRequest = serde_json::from_str(raw).expect("parse request");

        assert_eq!(parsed.temperature, Some(0.2));
        assert_eq!(parsed.extra.get("max_tokens").and_then(Value::as_u64), Some(64));
    }
}
