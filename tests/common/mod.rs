//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use parking_lot::Mutex;

use nexa_studio::ai::{AIProvider, ChatRequest};
use nexa_studio::pdf::{Branding, PdfConverter, PdfError};
use nexa_studio::server::{router, AppState};
use nexa_studio::SqliteRepository;

/// Answers each request with the reply registered for its label.
#[derive(Default)]
pub struct FakeProvider {
    replies: HashMap<&'static str, String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, label: &'static str, reply: impl Into<String>) -> Self {
        self.replies.insert(label, reply.into());
        self
    }
}

#[async_trait]
impl AIProvider for FakeProvider {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<String> {
        self.calls.lock().push(request.label.clone());
        self.replies
            .get(request.label.as_str())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no reply scripted for {}", request.label))
    }

    async fn run_assistant(
        &self,
        _assistant_id: &str,
        _content: &str,
        _timeout: Duration,
    ) -> anyhow::Result<String> {
        self.calls.lock().push("assistant".to_string());
        self.replies
            .get("assistant")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no assistant reply scripted"))
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

/// Returns a fixed PDF header followed by the HTML it was given.
#[derive(Default)]
pub struct FakeConverter {
    pub last_html: Mutex<Option<String>>,
}

#[async_trait]
impl PdfConverter for FakeConverter {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        *self.last_html.lock() = Some(html.to_string());
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.extend_from_slice(html.as_bytes());
        Ok(bytes)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub struct Harness {
    pub server: TestServer,
    pub state: AppState,
    pub converter: Arc<FakeConverter>,
}

pub fn harness(provider: FakeProvider) -> Harness {
    harness_with(provider, |state| state)
}

/// Harness whose state is adjusted by `configure` before the router is built.
pub fn harness_with(provider: FakeProvider, configure: impl FnOnce(AppState) -> AppState) -> Harness {
    let converter = Arc::new(FakeConverter::default());
    let state = configure(AppState::new(
        Arc::new(provider),
        converter.clone(),
        Arc::new(SqliteRepository::in_memory().unwrap()),
        Branding::new("Dry Ground AI"),
    ));
    let server = TestServer::new(router(state.clone(), &[])).unwrap();
    Harness { server, state, converter }
}
