//! Structured-output client for chat-completion language models.
//!
//! Callers describe the object they want with a JSON schema and receive the
//! parsed JSON value back. Shape validation beyond JSON parsing is left to the
//! caller, which knows what the object means.

pub mod openai;

use std::fmt;

use serde_json::Value;

pub use openai::OpenAiClient;

/// System prompt shared by every music-analysis request.
pub const MUSIC_ANALYST_PROMPT: &str = "You are a Spotify AI agent that does advanced music analysis. You have access to all the data on Spotify.";

#[derive(Debug)]
pub enum LlmError {
    Http(reqwest::Error),
    Api { status: u16, message: String },
    EmptyResponse,
    Refusal(String),
    InvalidJson(serde_json::Error),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Http(err)
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::InvalidJson(err)
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Http(e) => write!(f, "request to language model failed: {}", e),
            LlmError::Api { status, message } => {
                write!(f, "language model API error {}: {}", status, message)
            }
            LlmError::EmptyResponse => write!(f, "language model returned no content"),
            LlmError::Refusal(reason) => write!(f, "language model refused: {}", reason),
            LlmError::InvalidJson(e) => write!(f, "language model returned invalid JSON: {}", e),
        }
    }
}

impl std::error::Error for LlmError {}

/// A request for one JSON object matching `schema`.
#[derive(Debug, Clone)]
pub struct ObjectRequest<'a> {
    pub schema_name: &'a str,
    pub schema: Value,
    pub system: &'a str,
    pub prompt: String,
}

/// A language model able to produce structured JSON objects.
#[allow(async_fn_in_trait)]
pub trait CompletionModel {
    async fn generate_object(&self, request: ObjectRequest<'_>) -> Result<Value, LlmError>;
}

/// Strips Markdown code fences and line breaks from model output.
///
/// Models occasionally wrap JSON in a fenced block even when structured
/// output was requested.
pub fn clean_json(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_close = without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open);

    without_close
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string()
}

/// Parses model output into JSON after cleaning it.
pub fn parse_object(content: &str) -> Result<Value, LlmError> {
    let cleaned = clean_json(content);
    if cleaned.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(serde_json::from_str(&cleaned)?)
}
