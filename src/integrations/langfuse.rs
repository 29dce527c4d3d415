//! LangFuse tracing integration.
//!
//! Reports LLM generations to the LangFuse ingestion API. Reporting is
//! fire-and-forget: failures are logged and never reach the caller.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::core::LangfuseConfig;

/// A completed (or failed) LLM generation.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Operation name, e.g. `structure_solution`
    pub name: String,
    pub model: String,
    pub input: Value,
    pub output: Option<String>,
    pub error: Option<String>,
    pub model_parameters: Value,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// LangFuse API client.
#[derive(Debug, Clone)]
pub struct LangfuseClient {
    /// Base URL, e.g. https://cloud.langfuse.com
    host: String,
    public_key: String,
    secret_key: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Error types for LangFuse operations.
#[derive(Debug, thiserror::Error)]
pub enum LangfuseError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LangFuse API error: {message} (status: {status})")]
    Api { status: u16, message: String },
}

impl LangfuseClient {
    /// Create a new LangFuse client.
    pub fn new(
        host: impl Into<String>,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from configuration when both keys are set.
    pub fn from_config(config: &LangfuseConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        Some(Self::new(
            &config.host,
            config.public_key.clone().unwrap_or_default(),
            config.secret_key.clone().unwrap_or_default(),
        ))
    }

    /// Send a generation to the ingestion endpoint.
    pub async fn ingest(&self, generation: &Generation) -> Result<(), LangfuseError> {
        let response = self
            .client
            .post(format!("{}/api/public/ingestion", self.host))
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .json(&ingestion_batch(generation))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LangfuseError::Api { status: status.as_u16(), message });
        }
        Ok(())
    }

    /// Report a generation in the background.
    pub fn report(&self, generation: Generation) {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.ingest(&generation).await {
                tracing::warn!(name = %generation.name, error = %e, "LangFuse ingestion failed");
            }
        });
    }
}

fn timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the ingestion payload: one trace plus its generation.
pub fn ingestion_batch(generation: &Generation) -> Value {
    let trace_id = uuid::Uuid::new_v4().to_string();
    let level = if generation.error.is_some() { "ERROR" } else { "DEFAULT" };

    json!({
        "batch": [
            {
                "id": uuid::Uuid::new_v4().to_string(),
                "timestamp": timestamp(&generation.start_time),
                "type": "trace-create",
                "body": {
                    "id": trace_id,
                    "name": generation.name,
                    "input": generation.input,
                    "output": generation.output,
                }
            },
            {
                "id": uuid::Uuid::new_v4().to_string(),
                "timestamp": timestamp(&generation.end_time),
                "type": "generation-create",
                "body": {
                    "id": uuid::Uuid::new_v4().to_string(),
                    "traceId": trace_id,
                    "name": generation.name,
                    "model": generation.model,
                    "modelParameters": generation.model_parameters,
                    "input": generation.input,
                    "output": generation.output,
                    "level": level,
                    "statusMessage": generation.error,
                    "startTime": timestamp(&generation.start_time),
                    "endTime": timestamp(&generation.end_time),
                }
            }
        ]
    })
}
