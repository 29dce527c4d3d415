//! Stateless PDF endpoints: documents arrive complete in the request body.

use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;

use super::extract::Payload;
use super::{file_name, pdf_response, ApiError, ApiResult, AppState, Delivery};
use crate::pdf::{render_loe_html, render_solutioning_html, render_sow_html, SolutioningDocument};
use crate::session::{LoeSession, SowSession};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HtmlRequest {
    html_template: Option<String>,
}

/// A document plus optional organisation logos (base64 or data URIs).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandedRequest<T> {
    #[serde(flatten)]
    document: T,
    #[serde(default)]
    main_logo: Option<String>,
    #[serde(default)]
    second_logo: Option<String>,
}

/// Convert caller-supplied HTML and return it inline as `filename`.
pub(super) async fn convert_template(
    state: &AppState,
    req: HtmlRequest,
    filename: &str,
) -> ApiResult<Response> {
    let html = req
        .html_template
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| ApiError::validation("htmlTemplate is required"))?;

    let bytes = state.pdf.convert(&html).await?;
    tracing::info!(bytes = bytes.len(), filename, "Generated PDF from template");
    Ok(pdf_response(bytes, filename, Delivery::Preview))
}

/// Convert caller-supplied HTML.
pub async fn generate_pdf(
    State(state): State<AppState>,
    Payload(req): Payload<HtmlRequest>,
) -> ApiResult<Response> {
    convert_template(&state, req, "document.pdf").await
}

pub async fn generate_solutioning_pdf(
    State(state): State<AppState>,
    Payload(document): Payload<SolutioningDocument>,
) -> ApiResult<Response> {
    let html = render_solutioning_html(&document, &state.branding);
    let bytes = state.pdf.convert(&html).await?;
    Ok(pdf_response(bytes, &file_name(&document.basic.title, "solution"), Delivery::Download))
}

pub async fn generate_sow_pdf(
    State(state): State<AppState>,
    Payload(req): Payload<BrandedRequest<SowSession>>,
) -> ApiResult<Response> {
    let branding =
        state.branding.as_ref().clone().with_logos(req.main_logo.as_deref(), req.second_logo.as_deref());
    let bytes = state.pdf.convert(&render_sow_html(&req.document, &branding)).await?;
    Ok(pdf_response(bytes, &file_name(&req.document.project, "sow"), Delivery::Download))
}

pub async fn generate_loe_pdf(
    State(state): State<AppState>,
    Payload(req): Payload<BrandedRequest<LoeSession>>,
) -> ApiResult<Response> {
    let branding =
        state.branding.as_ref().clone().with_logos(req.main_logo.as_deref(), req.second_logo.as_deref());
    let bytes = state.pdf.convert(&render_loe_html(&req.document, &branding)).await?;
    Ok(pdf_response(bytes, &file_name(&req.document.basic.project, "loe"), Delivery::Download))
}
