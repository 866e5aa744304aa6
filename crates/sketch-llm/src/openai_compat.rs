//! OpenAI-compatible chat completion request/response shapes.
//!
//! Only the fields the generator reads are modelled; everything else in the payloads is
//! ignored.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{GenerationError, Result};
use crate::types::ChatMessage;

/// Build a non-streaming chat completion request body.
pub fn build_chat_body(
    model: &str,
    messages: &[ChatMessage],
    temperature: f32,
    max_tokens: u32,
) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
        "max_tokens": max_tokens,
    })
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Trimmed text of the first completion.
pub fn parse_completion_content(body: &str) -> Result<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| GenerationError::remote("Response did not contain a completion"))
}

/// Message for a non-success response: `error.message` when present, else the status code.
pub fn error_message_from_body(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|detail| detail.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("API request failed with status {}", status.as_u16()))
}
