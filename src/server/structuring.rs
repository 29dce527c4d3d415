//! Structuring endpoints: discovery content to pain points to a solution.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::documents::{get_document, new_document, save_document, save_session};
use super::extract::{Payload, SessionRef};
use super::{ApiResult, AppState};
use crate::pipeline::{self, structuring};
use crate::session::StructuringSession;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(new_document::<StructuringSession>))
        .route("/save", post(save_document::<StructuringSession>))
        .route("/get", post(get_document::<StructuringSession>))
        .route("/analyze-pain-points", post(analyze_pain_points))
        .route("/generate-solution", post(generate_solution))
        .route("/save-session", post(save_session::<StructuringSession>))
        .route("/push-to-solutioning", post(push_to_solutioning))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(flatten)]
    session: SessionRef,
    #[serde(default)]
    content: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolutionRequest {
    #[serde(flatten)]
    session: SessionRef,
    #[serde(default)]
    pain_points: Option<Vec<String>>,
    #[serde(default = "yes")]
    include_content: bool,
    #[serde(default = "yes")]
    include_report: bool,
}

fn yes() -> bool {
    true
}

/// Text sent in place of an omitted section.
const OMITTED: &str = " ";

async fn analyze_pain_points(
    State(state): State<AppState>,
    Payload(req): Payload<AnalyzeRequest>,
) -> ApiResult<Json<Value>> {
    let id = req.session.require()?;
    let content = match req.content {
        Some(content) => content,
        None => state.sessions.structuring.get(id)?.content,
    };

    let analysis = structuring::analyze_pain_points(state.ai.as_ref(), &content).await?;

    let stored = analysis.clone();
    state.sessions.structuring.update(id, move |s| {
        s.content = content;
        s.solution_tabs = stored.pain_points.clone();
        s.pain_points = stored;
        Ok(())
    })?;

    Ok(Json(json!({
        "success": true,
        "report": analysis.report,
        "pain_points": analysis.pain_points,
    })))
}

async fn generate_solution(
    State(state): State<AppState>,
    Payload(req): Payload<SolutionRequest>,
) -> ApiResult<Json<Value>> {
    let id = req.session.require()?;
    let session = state.sessions.structuring.get(id)?;

    let pain_points = req.pain_points.unwrap_or_else(|| {
        if session.solution_tabs.is_empty() {
            session.pain_points.pain_points.clone()
        } else {
            session.solution_tabs.clone()
        }
    });
    let content = if req.include_content { session.combined_content() } else { OMITTED.to_string() };
    let report =
        if req.include_report { session.pain_points.report.clone() } else { OMITTED.to_string() };

    let solution =
        structuring::generate_solution(state.ai.as_ref(), &pain_points, &content, &report).await?;

    let stored = solution.clone();
    state.sessions.structuring.update(id, move |s| {
        s.solution_tabs = pain_points;
        s.solution = stored;
        Ok(())
    })?;

    Ok(Json(json!({
        "success": true,
        "overview": solution.overview,
        "solution_parts": solution.solution_parts,
    })))
}

async fn push_to_solutioning(
    State(state): State<AppState>,
    Payload(req): Payload<SessionRef>,
) -> ApiResult<Json<Value>> {
    let structuring = state.sessions.structuring.get(req.require()?)?;
    let mut session = pipeline::structuring_to_solution(&structuring)?;
    session.badge.row = structuring.badge.row;

    let solutioning_id = state.sessions.solutioning.insert(session.clone());
    tracing::info!(solutioning_session = %solutioning_id, "Pushed structuring to solutioning");
    Ok(Json(json!({
        "success": true,
        "solutioningSessionId": solutioning_id,
        "session": session,
    })))
}
