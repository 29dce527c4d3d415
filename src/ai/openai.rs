//! OpenAI API integration.
//!
//! Implements the AIProvider trait for chat completions (text and vision)
//! and for the assistants API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AIError, AIProvider, ChatMessage, ChatRequest, MAX_ASSISTANT_TIMEOUT};

/// Polling intervals for assistant runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Interval at the start of a run
    pub initial: Duration,
    /// Interval once the run has been going for `slow_after`
    pub slow: Duration,
    pub slow_after: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(2),
            slow: Duration::from_secs(3),
            slow_after: Duration::from_secs(30),
        }
    }
}

impl PollSchedule {
    /// Interval to wait after `elapsed` time.
    pub fn interval(&self, elapsed: Duration) -> Duration {
        if elapsed > self.slow_after {
            self.slow
        } else {
            self.initial
        }
    }
}

/// OpenAI API provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    poll: PollSchedule,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    ///
    /// Reads API key from OPENAI_API_KEY environment variable.
    pub fn new() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;
        Ok(Self::with_api_key(api_key))
    }

    /// Create with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            poll: PollSchedule::default(),
        }
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create with a custom base URL (for Azure OpenAI or compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the assistant polling intervals.
    pub fn with_poll_schedule(mut self, poll: PollSchedule) -> Self {
        self.poll = poll;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode the JSON response, failing on non-2xx.
    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        builder: reqwest::RequestBuilder,
        assistants: bool,
    ) -> anyhow::Result<T> {
        let mut builder = builder
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if assistants {
            builder = builder.header("OpenAI-Beta", "assistants=v2");
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, body);
        }
        Ok(response.json().await?)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> anyhow::Result<Run> {
        self.send(self.client.get(self.url(&format!("threads/{thread_id}/runs/{run_id}"))), true)
            .await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) {
        let result: anyhow::Result<Run> = self
            .send(
                self.client.post(self.url(&format!("threads/{thread_id}/runs/{run_id}/cancel"))),
                true,
            )
            .await;
        match result {
            Ok(_) => tracing::info!(run_id, "Cancelled timed-out assistant run"),
            Err(e) => tracing::warn!(run_id, error = %e, "Could not cancel assistant run"),
        }
    }

    /// Text of the newest assistant message on a thread.
    async fn latest_assistant_text(&self, thread_id: &str) -> anyhow::Result<String> {
        let list: MessageList = self
            .send(self.client.get(self.url(&format!("threads/{thread_id}/messages?order=desc"))), true)
            .await?;

        list.data
            .iter()
            .filter(|m| m.role == "assistant")
            .map(ThreadMessage::text)
            .find(|text| !text.trim().is_empty())
            .map(|text| text.trim().to_string())
            .ok_or_else(|| AIError::NoResponse.into())
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<String> {
        let body = OpenAIRequest {
            model: self.model.clone(),
            messages: request.messages.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_mode.then(|| json!({"type": "json_object"})),
        };

        tracing::debug!(label = %request.label, model = %self.model, "Sending chat completion");
        let response: OpenAIResponse =
            self.send(self.client.post(self.url("chat/completions")).json(&body), false).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AIError::NoResponse.into())
    }

    async fn run_assistant(
        &self,
        assistant_id: &str,
        content: &str,
        timeout: Duration,
    ) -> anyhow::Result<String> {
        let timeout = timeout.min(MAX_ASSISTANT_TIMEOUT);

        let thread: Created = self.send(self.client.post(self.url("threads")).json(&json!({})), true).await?;
        let _: Created = self
            .send(
                self.client
                    .post(self.url(&format!("threads/{}/messages", thread.id)))
                    .json(&json!({"role": "user", "content": content})),
                true,
            )
            .await?;
        let mut run: Run = self
            .send(
                self.client
                    .post(self.url(&format!("threads/{}/runs", thread.id)))
                    .json(&json!({"assistant_id": assistant_id})),
                true,
            )
            .await?;

        tracing::info!(assistant_id, run_id = %run.id, "Assistant run started, polling for completion");
        let started = Instant::now();

        while run.is_pending() {
            let elapsed = started.elapsed();
            if elapsed > timeout {
                tracing::error!(run_id = %run.id, seconds = timeout.as_secs(), "Assistant run timed out");
                self.cancel_run(&thread.id, &run.id).await;
                return Err(AIError::Timeout(timeout.as_secs()).into());
            }

            tokio::time::sleep(self.poll.interval(elapsed)).await;
            run = self.retrieve_run(&thread.id, &run.id).await?;
            tracing::debug!(status = %run.status, elapsed_ms = started.elapsed().as_millis() as u64, "Assistant status");
        }

        if run.status != "completed" {
            let message = run
                .last_error
                .map(|e| e.message)
                .unwrap_or_else(|| "no error details".to_string());
            tracing::error!(status = %run.status, %message, "Assistant run did not complete");
            return Err(AIError::RunFailed { status: run.status, message }.into());
        }

        self.latest_assistant_text(&thread.id).await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Run {
    id: String,
    status: String,
    #[serde(default)]
    last_error: Option<RunError>,
}

impl Run {
    fn is_pending(&self) -> bool {
        matches!(self.status.as_str(), "queued" | "in_progress" | "cancelling")
    }
}

#[derive(Debug, Deserialize)]
struct RunError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    role: String,
    #[serde(default)]
    content: Vec<ThreadContent>,
}

impl ThreadMessage {
    fn text(&self) -> String {
        self.content.iter().filter_map(|c| c.text.as_ref().map(|t| t.value.as_str())).collect()
    }
}

#[derive(Debug, Deserialize)]
struct ThreadContent {
    #[serde(default)]
    text: Option<ThreadText>,
}

#[derive(Debug, Deserialize)]
struct ThreadText {
    value: String,
}
