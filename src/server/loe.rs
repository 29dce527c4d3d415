//! Level of Effort endpoints.

use axum::extract::State;
use axum::response::{Html, Response};
use axum::routing::post;
use axum::Router;

use super::documents::{get_document, new_document, save_document, save_session};
use super::extract::SessionId;
use super::{file_name, pdf_response, ApiResult, AppState, Delivery};
use crate::pdf::render_loe_html;
use crate::session::LoeSession;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(new_document::<LoeSession>))
        .route("/save", post(save_document::<LoeSession>))
        .route("/get", post(get_document::<LoeSession>))
        .route("/save-session", post(save_session::<LoeSession>))
        .route("/preview-html", post(preview_html).get(preview_html))
        .route("/preview-pdf", post(preview_pdf).get(preview_pdf))
        .route("/generate-pdf", post(generate_pdf).get(generate_pdf))
}

async fn preview_html(State(state): State<AppState>, SessionId(id): SessionId) -> ApiResult<Html<String>> {
    let loe = state.sessions.loe.get(&id)?;
    Ok(Html(render_loe_html(&loe, &state.branding)))
}

async fn pdf(state: &AppState, id: &str, delivery: Delivery) -> ApiResult<Response> {
    let loe = state.sessions.loe.get(id)?;
    let bytes = state.pdf.convert(&render_loe_html(&loe, &state.branding)).await?;
    Ok(pdf_response(bytes, &file_name(&loe.basic.project, "loe"), delivery))
}

async fn preview_pdf(State(state): State<AppState>, SessionId(id): SessionId) -> ApiResult<Response> {
    pdf(&state, &id, Delivery::Preview).await
}

async fn generate_pdf(State(state): State<AppState>, SessionId(id): SessionId) -> ApiResult<Response> {
    pdf(&state, &id, Delivery::Download).await
}
