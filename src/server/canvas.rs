//! Hyper-canvas endpoints: chat about a rendered document and let the model
//! edit its HTML.

use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::extract::Payload;
use super::pdf_service::{convert_template, HtmlRequest};
use super::{ApiError, ApiResult, AppState};
use crate::pipeline::canvas;
use crate::session::MemoryStatus;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/thread", post(create_thread).delete(clear_thread))
        .route("/quickshot", post(quickshot))
        .route("/maestro", post(maestro))
        .route("/memory", post(memory))
        .route("/html/get-latest", post(latest_html))
        .route("/html/metadata", post(html_metadata))
        .route("/html/list-threads", post(list_threads))
        .route("/template-to-pdf", post(template_to_pdf))
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{name} is required")))
}

/// Thread addressed within its session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ThreadRef {
    session_id: Option<String>,
    thread_id: Option<String>,
}

impl ThreadRef {
    fn require(&self) -> Result<(&str, &str), ApiError> {
        Ok((
            required(self.session_id.as_deref(), "sessionId")?,
            required(self.thread_id.as_deref(), "threadId")?,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuickshotRequest {
    #[serde(flatten)]
    thread: ThreadRef,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaestroRequest {
    #[serde(flatten)]
    thread: ThreadRef,
    #[serde(default)]
    current_template: Option<String>,
    #[serde(default)]
    maestro_instruction: Option<String>,
}

async fn create_thread(
    State(state): State<AppState>,
    Payload(req): Payload<ThreadRef>,
) -> ApiResult<Json<Value>> {
    let session_id = required(req.session_id.as_deref(), "sessionId")?;
    let thread_id = state.sessions.canvas.create(session_id);
    tracing::info!(thread_id = %thread_id, session_id, "Canvas thread opened");
    Ok(Json(json!({ "success": true, "threadId": thread_id, "message": "Thread created successfully" })))
}

async fn clear_thread(
    State(state): State<AppState>,
    Query(req): Query<ThreadRef>,
) -> ApiResult<Json<Value>> {
    let thread_id = required(req.thread_id.as_deref(), "threadId")?;
    if !state.sessions.canvas.clear(thread_id) {
        return Err(ApiError::NotFound(format!("Thread not found: {thread_id}")));
    }
    Ok(Json(json!({ "success": true, "message": "Thread deleted successfully" })))
}

async fn quickshot(
    State(state): State<AppState>,
    Payload(req): Payload<QuickshotRequest>,
) -> ApiResult<Json<Value>> {
    let (session_id, thread_id) = req.thread.require()?;
    let thread = state.sessions.canvas.get(thread_id, session_id)?;
    let message = req.message.as_deref().unwrap_or_default().trim();

    let reply = canvas::chat_turn(state.ai.as_ref(), &thread.messages, message).await?;
    let memory =
        state.sessions.canvas.record_exchange(thread_id, session_id, message, &reply.transcript())?;

    Ok(Json(json!({
        "success": true,
        "maestro": reply.maestro,
        "message_to_maestro": reply.message_to_maestro,
        "chat_responses": reply.chat_responses,
        "memoryState": memory,
    })))
}

async fn maestro(
    State(state): State<AppState>,
    Payload(req): Payload<MaestroRequest>,
) -> ApiResult<Json<Value>> {
    let (session_id, thread_id) = req.thread.require()?;
    let thread = state.sessions.canvas.get(thread_id, session_id)?;
    let template = req.current_template.as_deref().unwrap_or_default();
    let instruction = req.maestro_instruction.as_deref().unwrap_or_default();

    let edit = canvas::maestro_turn(state.ai.as_ref(), &thread.messages, template, instruction).await?;
    let metadata = state.sessions.canvas.store_html(
        thread_id,
        session_id,
        edit.modified_template.clone(),
        &edit.explanation,
    )?;
    tracing::info!(thread_id, version = metadata.version, size = metadata.html_size, "Stored edited HTML");

    Ok(Json(json!({
        "success": true,
        "modified_template": edit.modified_template,
        "explanation": edit.explanation,
        "version": metadata.version,
        "memoryState": MemoryStatus::of(&thread.messages),
    })))
}

async fn memory(
    State(state): State<AppState>,
    Payload(req): Payload<ThreadRef>,
) -> ApiResult<Json<Value>> {
    let (session_id, thread_id) = req.require()?;
    let thread = state.sessions.canvas.get(thread_id, session_id)?;
    Ok(Json(json!({ "success": true, "memoryState": MemoryStatus::of(&thread.messages) })))
}

async fn latest_html(
    State(state): State<AppState>,
    Payload(req): Payload<ThreadRef>,
) -> ApiResult<Json<Value>> {
    let (session_id, thread_id) = req.require()?;
    let thread = state.sessions.canvas.get(thread_id, session_id)?;
    Ok(Json(match thread.html {
        Some(snapshot) => json!({
            "success": true,
            "hasHTML": true,
            "size": snapshot.html.len(),
            "version": snapshot.version,
            "html": snapshot.html,
        }),
        None => json!({
            "success": true,
            "hasHTML": false,
            "html": null,
            "message": "No HTML found for this thread",
        }),
    }))
}

async fn html_metadata(
    State(state): State<AppState>,
    Payload(req): Payload<ThreadRef>,
) -> ApiResult<Json<Value>> {
    let (session_id, thread_id) = req.require()?;
    let metadata = state.sessions.canvas.get(thread_id, session_id)?.metadata();
    Ok(Json(json!({ "success": true, "hasHTML": metadata.is_some(), "metadata": metadata })))
}

async fn list_threads(
    State(state): State<AppState>,
    Payload(req): Payload<ThreadRef>,
) -> ApiResult<Json<Value>> {
    let session_id = required(req.session_id.as_deref(), "sessionId")?;
    let threads = state.sessions.canvas.list(session_id);
    Ok(Json(json!({ "success": true, "count": threads.len(), "threads": threads })))
}

async fn template_to_pdf(
    State(state): State<AppState>,
    Payload(req): Payload<HtmlRequest>,
) -> ApiResult<Response> {
    convert_template(&state, req, "maestro_modified.pdf").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_ref_requires_both_ids() {
        let req: ThreadRef = serde_json::from_value(json!({"sessionId": "s1", "threadId": " "})).unwrap();
        let err = req.require().unwrap_err();
        assert_eq!(err.to_string(), "threadId is required");

        let req: ThreadRef = serde_json::from_value(json!({"sessionId": "s1", "threadId": "hc_s1_0a1b2c3d"})).unwrap();
        assert_eq!(req.require().unwrap(), ("s1", "hc_s1_0a1b2c3d"));
    }

    #[test]
    fn test_maestro_request_wire_names() {
        let req: MaestroRequest = serde_json::from_value(json!({
            "sessionId": "s1",
            "threadId": "t1",
            "currentTemplate": "<html></html>",
            "maestroInstruction": "Bolder"
        }))
        .unwrap();
        assert_eq!(req.thread.require().unwrap(), ("s1", "t1"));
        assert_eq!(req.maestro_instruction.as_deref(), Some("Bolder"));
    }
}
