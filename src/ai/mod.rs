//! AI integration module.
//!
//! Wraps an OpenAI-compatible API behind the [`AIProvider`] trait so the
//! pipeline can run against the real service, a traced wrapper or a test
//! double.
//!
//! ## Features
//!
//! - Chat completions with text and image content parts
//! - JSON mode for structured replies
//! - Assistants API runs (thread, message, run, poll)
//! - Optional LangFuse tracing of every generation

mod openai;
mod traced;

pub use openai::{OpenAIProvider, PollSchedule};
pub use traced::TracedProvider;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default limit for an assistant run.
pub const DEFAULT_ASSISTANT_TIMEOUT: Duration = Duration::from_secs(120);

/// Hard upper bound for an assistant run.
pub const MAX_ASSISTANT_TIMEOUT: Duration = Duration::from_secs(300);

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Image reference inside a content part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// HTTP URL or `data:` URI
    pub url: String,
}

/// One part of a multi-part message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Message body: plain text or a list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text of the message, ignoring images.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: MessageContent::Text(text.into()) }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: MessageContent::Text(text.into()) }
    }

    /// User message carrying a prompt and an image.
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl { image_url: ImageUrl { url: image_url.into() } },
            ]),
        }
    }
}

/// A chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Operation name used in logs and traces
    pub label: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask for a JSON object reply
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(label: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self { label: label.into(), messages, max_tokens: None, temperature: None, json_mode: false }
    }

    /// Single user message, optionally preceded by a system prompt.
    pub fn prompt(label: impl Into<String>, system: Option<&str>, user: impl Into<String>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(user));
        Self::new(label, messages)
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Trait for AI providers.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Run a chat completion and return the reply text.
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<String>;

    /// Send `content` to an assistant on a new thread and return its reply.
    async fn run_assistant(
        &self,
        assistant_id: &str,
        content: &str,
        timeout: Duration,
    ) -> anyhow::Result<String>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Model used for chat completions.
    fn model(&self) -> &str;
}

/// Provider used when no API key is configured. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredProvider;

#[async_trait]
impl AIProvider for UnconfiguredProvider {
    async fn chat(&self, _request: &ChatRequest) -> anyhow::Result<String> {
        Err(AIError::NotConfigured("OPENAI_API_KEY not set".to_string()).into())
    }

    async fn run_assistant(
        &self,
        _assistant_id: &str,
        _content: &str,
        _timeout: Duration,
    ) -> anyhow::Result<String> {
        Err(AIError::NotConfigured("OPENAI_API_KEY not set".to_string()).into())
    }

    fn name(&self) -> &str {
        "unconfigured"
    }

    fn model(&self) -> &str {
        ""
    }
}

/// AI error types.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    #[error("AI provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("No response from AI")]
    NoResponse,

    #[error("Assistant run timed out after {0}s")]
    Timeout(u64),

    #[error("Assistant run ended with status {status}: {message}")]
    RunFailed { status: String, message: String },
}
