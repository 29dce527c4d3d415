//! Document-editing chat threads.
//!
//! A thread belongs to one session and keeps two things apart: the
//! natural-language conversation (the model's memory) and the latest edited
//! HTML of the document. HTML never enters the conversation.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::SessionError;

/// Token budget reported with the memory status.
pub const MEMORY_TOKEN_BUDGET: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasRole {
    User,
    Assistant,
}

impl CanvasRole {
    /// Speaker label used when the history is replayed to the model.
    pub fn speaker(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasMessage {
    pub role: CanvasRole,
    pub content: String,
    pub created_at: String,
}

impl CanvasMessage {
    pub fn new(role: CanvasRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), created_at: chrono::Utc::now().to_rfc3339() }
    }
}

/// Latest edited document of a thread. Each store replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlSnapshot {
    pub html: String,
    pub version: u32,
    pub summary: String,
    pub updated_at: String,
}

/// Snapshot details without the HTML itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlMetadata {
    pub thread_id: String,
    pub version: u32,
    pub last_modified: String,
    pub html_size: usize,
    pub summary: String,
}

/// Summary of a thread for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub name: String,
    pub created_at: String,
    pub last_active: String,
    pub message_count: usize,
    pub html_version: u32,
}

/// Conversation size as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStatus {
    pub message_count: usize,
    pub summary: String,
    pub token_budget: u32,
    pub has_history: bool,
}

impl MemoryStatus {
    pub fn of(messages: &[CanvasMessage]) -> Self {
        let summary = if messages.is_empty() {
            "No conversation yet".to_string()
        } else {
            format!("{} messages in conversation", messages.len())
        };
        Self {
            message_count: messages.len(),
            summary,
            token_budget: MEMORY_TOKEN_BUDGET,
            has_history: !messages.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CanvasThread {
    pub thread_id: String,
    pub session_id: String,
    pub name: String,
    pub created_at: String,
    pub last_active: String,
    pub messages: Vec<CanvasMessage>,
    pub html: Option<HtmlSnapshot>,
}

impl CanvasThread {
    fn new(thread_id: String, session_id: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            thread_id,
            session_id,
            name: "Editing conversation".to_string(),
            created_at: now.clone(),
            last_active: now,
            messages: Vec::new(),
            html: None,
        }
    }

    fn touch(&mut self) {
        self.last_active = chrono::Utc::now().to_rfc3339();
    }

    pub fn summary(&self) -> ThreadSummary {
        ThreadSummary {
            thread_id: self.thread_id.clone(),
            name: self.name.clone(),
            created_at: self.created_at.clone(),
            last_active: self.last_active.clone(),
            message_count: self.messages.len(),
            html_version: self.html.as_ref().map_or(0, |h| h.version),
        }
    }

    pub fn metadata(&self) -> Option<HtmlMetadata> {
        self.html.as_ref().map(|h| HtmlMetadata {
            thread_id: self.thread_id.clone(),
            version: h.version,
            last_modified: h.updated_at.clone(),
            html_size: h.html.len(),
            summary: h.summary.clone(),
        })
    }
}

/// Thread id: `hc_{session}_{8 hex}`.
fn new_thread_id(session_id: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("hc_{}_{}", session_id, &suffix[..8])
}

/// All canvas threads, keyed by thread id.
#[derive(Debug, Default)]
pub struct CanvasStore {
    threads: RwLock<HashMap<String, CanvasThread>>,
}

impl CanvasStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a thread on `session_id` and return its id.
    pub fn create(&self, session_id: &str) -> String {
        let thread_id = new_thread_id(session_id);
        let thread = CanvasThread::new(thread_id.clone(), session_id.to_string());
        self.threads.write().insert(thread_id.clone(), thread);
        tracing::debug!(thread_id = %thread_id, session_id, "Canvas thread created");
        thread_id
    }

    /// Clone the thread, checking that it belongs to `session_id`.
    pub fn get(&self, thread_id: &str, session_id: &str) -> Result<CanvasThread, SessionError> {
        self.threads
            .read()
            .get(thread_id)
            .filter(|t| t.session_id == session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(thread_id.to_string()))
    }

    fn update<R>(
        &self,
        thread_id: &str,
        session_id: &str,
        f: impl FnOnce(&mut CanvasThread) -> R,
    ) -> Result<R, SessionError> {
        let mut guard = self.threads.write();
        let thread = guard
            .get_mut(thread_id)
            .filter(|t| t.session_id == session_id)
            .ok_or_else(|| SessionError::NotFound(thread_id.to_string()))?;
        thread.touch();
        Ok(f(thread))
    }

    /// Append one exchange to the conversation and return the new status.
    pub fn record_exchange(
        &self,
        thread_id: &str,
        session_id: &str,
        user: &str,
        assistant: &str,
    ) -> Result<MemoryStatus, SessionError> {
        self.update(thread_id, session_id, |thread| {
            thread.messages.push(CanvasMessage::new(CanvasRole::User, user));
            thread.messages.push(CanvasMessage::new(CanvasRole::Assistant, assistant));
            MemoryStatus::of(&thread.messages)
        })
    }

    /// Replace the thread's HTML and bump its version.
    pub fn store_html(
        &self,
        thread_id: &str,
        session_id: &str,
        html: String,
        summary: &str,
    ) -> Result<HtmlMetadata, SessionError> {
        self.update(thread_id, session_id, |thread| {
            let version = thread.html.as_ref().map_or(0, |h| h.version) + 1;
            let summary = if summary.trim().is_empty() { "Document updated" } else { summary };
            thread.html = Some(HtmlSnapshot {
                html,
                version,
                summary: summary.to_string(),
                updated_at: thread.last_active.clone(),
            });
            thread.metadata()
        })?
        .ok_or_else(|| SessionError::NotFound(thread_id.to_string()))
    }

    /// Forget the conversation. Returns whether the thread existed.
    pub fn clear(&self, thread_id: &str) -> bool {
        match self.threads.write().get_mut(thread_id) {
            Some(thread) => {
                thread.messages.clear();
                tracing::info!(thread_id, "Cleared canvas thread memory");
                true
            }
            None => false,
        }
    }

    /// Threads of a session, most recently active first.
    pub fn list(&self, session_id: &str) -> Vec<ThreadSummary> {
        let mut threads: Vec<ThreadSummary> = self
            .threads
            .read()
            .values()
            .filter(|t| t.session_id == session_id)
            .map(CanvasThread::summary)
            .collect();
        threads.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        threads
    }
}
