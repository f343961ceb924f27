//! Chat completion client seam.
//!
//! The pipeline talks to the completion API only through [`CompletionClient`],
//! so tests can swap in a stub without a network or global state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DiagnoseError, DiagnoseResult};
use crate::prompt::SYSTEM_PROMPT;

mod openai;

pub use openai::OpenAiClient;

/// Model requested for every diagnosis.
pub const MODEL: &str = "gpt-4o-mini";

/// Sampling temperature for every diagnosis.
pub const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatCompletionRequest {
    /// The fixed diagnosis request: system instruction, then the built prompt.
    pub fn diagnosis(prompt: impl Into<String>) -> Self {
        Self {
            model: MODEL.to_string(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            temperature: TEMPERATURE,
        }
    }
}

/// Subset of the completion response the pipeline reads.
///
/// Everything is optional or defaulted so a structurally incomplete reply
/// still decodes and is rejected by [`first_choice_text`] instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub message: Option<ChoiceMessage>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Response with a single assistant choice, as returned by a well-behaved API.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            model: Some(MODEL.to_string()),
            choices: vec![Choice {
                index: 0,
                message: Some(ChoiceMessage {
                    role: Some("assistant".to_string()),
                    content: Some(text.into()),
                }),
                finish_reason: Some("stop".to_string()),
            }],
        }
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn create(&self, request: &ChatCompletionRequest)
        -> DiagnoseResult<ChatCompletionResponse>;

    fn provider_name(&self) -> &'static str;
}

/// Raw text of the first choice.
pub fn first_choice_text(response: &ChatCompletionResponse) -> DiagnoseResult<&str> {
    let choice = response
        .choices
        .first()
        .ok_or_else(|| DiagnoseError::upstream("Invalid response from completion API: no choices"))?;

    choice
        .message
        .as_ref()
        .and_then(|m| m.content.as_deref())
        .ok_or_else(|| {
            DiagnoseError::upstream("Invalid response from completion API: choice has no message content")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_diagnosis_request_shape() {
        let request = ChatCompletionRequest::diagnosis("prompt body");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "prompt body");
        assert!((value["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_first_choice_text() {
        let response = ChatCompletionResponse::with_text("Healthy");
        assert_eq!(first_choice_text(&response).unwrap(), "Healthy");
    }

    #[test]
    fn test_empty_choices_is_upstream_error() {
        let response: ChatCompletionResponse =
            serde_json::from_value(json!({"id": "x", "choices": []})).unwrap();
        let err = first_choice_text(&response).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_missing_message_or_content_is_upstream_error() {
        let response: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": [{"index": 0}]})).unwrap();
        assert_eq!(
            first_choice_text(&response).unwrap_err().kind(),
            ErrorKind::Upstream
        );

        let response: ChatCompletionResponse = serde_json::from_value(
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
        )
        .unwrap();
        assert_eq!(
            first_choice_text(&response).unwrap_err().kind(),
            ErrorKind::Upstream
        );
    }

    #[test]
    fn test_response_without_choices_key_decodes() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.choices.is_empty());
    }
}
