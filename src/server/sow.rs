//! Statement of Work endpoints.

use axum::extract::State;
use axum::response::{Html, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::documents::{get_document, new_document, save_document, save_session};
use super::extract::{Payload, SessionId, SessionRef};
use super::{file_name, pdf_response, ApiResult, AppState, Delivery};
use crate::pdf::render_sow_html;
use crate::pipeline;
use crate::session::SowSession;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(new_document::<SowSession>))
        .route("/save", post(save_document::<SowSession>))
        .route("/get", post(get_document::<SowSession>))
        .route("/save-session", post(save_session::<SowSession>))
        .route("/push-to-loe", post(push_to_loe))
        .route("/preview-html", post(preview_html).get(preview_html))
        .route("/preview-pdf", post(preview_pdf).get(preview_pdf))
        .route("/generate-pdf", post(generate_pdf).get(generate_pdf))
}

/// Estimate effort for the SoW and open the result as a new LoE session
/// linked to the same row.
async fn push_to_loe(
    State(state): State<AppState>,
    Payload(req): Payload<SessionRef>,
) -> ApiResult<Json<Value>> {
    let sow = state.sessions.sow.get(req.require()?)?;
    let mut loe = pipeline::generate_loe(state.ai.as_ref(), &sow).await?;
    loe.badge.row = sow.badge.row;

    let loe_id = state.sessions.loe.insert(loe.clone());
    tracing::info!(loe_session = %loe_id, row = loe.badge.row, "Pushed SoW to LoE");
    Ok(Json(json!({ "success": true, "loeSessionId": loe_id, "session": loe })))
}

async fn preview_html(State(state): State<AppState>, SessionId(id): SessionId) -> ApiResult<Html<String>> {
    let sow = state.sessions.sow.get(&id)?;
    Ok(Html(render_sow_html(&sow, &state.branding)))
}

async fn pdf(state: &AppState, id: &str, delivery: Delivery) -> ApiResult<Response> {
    let sow = state.sessions.sow.get(id)?;
    let bytes = state.pdf.convert(&render_sow_html(&sow, &state.branding)).await?;
    Ok(pdf_response(bytes, &file_name(&sow.project, "sow"), delivery))
}

async fn preview_pdf(State(state): State<AppState>, SessionId(id): SessionId) -> ApiResult<Response> {
    pdf(&state, &id, Delivery::Preview).await
}

async fn generate_pdf(State(state): State<AppState>, SessionId(id): SessionId) -> ApiResult<Response> {
    pdf(&state, &id, Delivery::Download).await
}
