//! Provider wrapper that reports every generation to LangFuse.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::{AIProvider, ChatRequest};
use crate::integrations::{Generation, LangfuseClient};

/// Wraps a provider and reports its generations.
pub struct TracedProvider {
    inner: Arc<dyn AIProvider>,
    langfuse: LangfuseClient,
}

impl TracedProvider {
    pub fn new(inner: Arc<dyn AIProvider>, langfuse: LangfuseClient) -> Self {
        Self { inner, langfuse }
    }
}

fn split_result(result: &anyhow::Result<String>) -> (Option<String>, Option<String>) {
    match result {
        Ok(text) => (Some(text.clone()), None),
        Err(e) => (None, Some(e.to_string())),
    }
}

#[async_trait]
impl AIProvider for TracedProvider {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<String> {
        let start_time = Utc::now();
        let result = self.inner.chat(request).await;
        let (output, error) = split_result(&result);

        self.langfuse.report(Generation {
            name: request.label.clone(),
            model: self.inner.model().to_string(),
            input: serde_json::to_value(&request.messages).unwrap_or_default(),
            output,
            error,
            model_parameters: json!({
                "max_tokens": request.max_tokens,
                "temperature": request.temperature,
                "json_mode": request.json_mode,
            }),
            start_time,
            end_time: Utc::now(),
        });

        result
    }

    async fn run_assistant(
        &self,
        assistant_id: &str,
        content: &str,
        timeout: Duration,
    ) -> anyhow::Result<String> {
        let start_time = Utc::now();
        let result = self.inner.run_assistant(assistant_id, content, timeout).await;
        let (output, error) = split_result(&result);

        self.langfuse.report(Generation {
            name: "assistant_run".to_string(),
            model: assistant_id.to_string(),
            input: json!(content),
            output,
            error,
            model_parameters: json!({"timeout_secs": timeout.as_secs()}),
            start_time,
            end_time: Utc::now(),
        });

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}
