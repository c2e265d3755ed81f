//! Outline drafting through a remote chat-completions service.
//!
//! # Responsibility
//! - Build the fixed prompt and request body for a topic.
//! - Extract the drafted outline from the service response.
//!
//! # Invariants
//! - Credentials come from `OutlineServiceConfig`, never from literals.
//! - The drafted text is returned verbatim; it is not normalized.
//! - Failures are reported once and never retried here.

use crate::config::OutlineServiceConfig;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Prompt wrapped around the user topic; `{topic}` is substituted.
pub const OUTLINE_PROMPT_TEMPLATE: &str = "Generate a structured Markdown outline for the topic below. Keep it concise and suitable for a mind map.\n\nTopic: {topic}\n\nMarkdown outline:";

/// Outline generation failure.
#[derive(Debug)]
pub enum GenerateError {
    EmptyTopic,
    MissingApiKey,
    /// Transport-level failure reported by the injected client.
    Transport(String),
    /// Request body could not be serialized.
    Encode(serde_json::Error),
    /// Response body is not valid chat-completions JSON.
    Decode(serde_json::Error),
}

impl Display for GenerateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTopic => write!(f, "topic must not be blank"),
            Self::MissingApiKey => write!(f, "outline service api key is not configured"),
            Self::Transport(message) => write!(f, "outline service request failed: {message}"),
            Self::Encode(err) => write!(f, "failed to encode outline request: {err}"),
            Self::Decode(err) => write!(f, "invalid outline service response: {err}"),
        }
    }
}

impl Error for GenerateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat-completions request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sends one JSON POST with bearer auth and returns the raw response body.
pub trait OutlineTransport {
    fn post_json(&self, endpoint: &str, api_key: &str, body: &str)
        -> Result<String, GenerateError>;
}

/// Substitutes `topic` into [`OUTLINE_PROMPT_TEMPLATE`].
pub fn build_prompt(topic: &str) -> String {
    OUTLINE_PROMPT_TEMPLATE.replace("{topic}", topic)
}

/// Builds the single-message request for `topic` under `config`.
pub fn build_request(
    config: &OutlineServiceConfig,
    topic: &str,
) -> Result<ChatRequest, GenerateError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(GenerateError::EmptyTopic);
    }
    Ok(ChatRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: build_prompt(topic),
        }],
        temperature: config.temperature,
    })
}

/// Serializes a request into the JSON body sent to the service.
pub fn encode_request(request: &ChatRequest) -> Result<String, GenerateError> {
    serde_json::to_string(request).map_err(GenerateError::Encode)
}

/// Returns the first choice's message content, or an empty string.
pub fn extract_outline(response_body: &str) -> Result<String, GenerateError> {
    let response: ChatResponse =
        serde_json::from_str(response_body).map_err(GenerateError::Decode)?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .unwrap_or_default())
}

/// Drafts markdown outlines for topics.
pub struct OutlineGenerator<T: OutlineTransport> {
    config: OutlineServiceConfig,
    transport: T,
}

impl<T: OutlineTransport> OutlineGenerator<T> {
    pub fn new(config: OutlineServiceConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Builds the request body for `topic` without sending it.
    pub fn request_for(&self, topic: &str) -> Result<ChatRequest, GenerateError> {
        build_request(&self.config, topic)
    }

    /// Requests an outline for `topic` and returns it verbatim.
    pub fn generate(&self, topic: &str) -> Result<String, GenerateError> {
        let request = self.request_for(topic)?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(GenerateError::MissingApiKey)?;
        let body = encode_request(&request)?;

        let started_at = Instant::now();
        let result = self
            .transport
            .post_json(&self.config.endpoint, api_key, &body)
            .and_then(|response| extract_outline(&response));
        match &result {
            Ok(outline) => info!(
                "event=outline_generate module=generate status=ok outline_chars={} duration_ms={}",
                outline.chars().count(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=outline_generate module=generate status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}
