//! Solutioning editor endpoints.

use axum::extract::State;
use axum::response::{Html, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::documents::save_session;
use super::extract::{Payload, SessionId, SessionRef};
use super::{file_name, pdf_response, ApiError, ApiResult, AppState, Delivery};
use crate::pdf::{render_solutioning_html, SolutioningDocument};
use crate::pipeline::{self, solutioning};
use crate::session::{SolutionBasic, SolutionSession, SolutionUpdate};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(new_session))
        .route("/save-basic-info", post(save_basic_info))
        .route("/save-additional-info", post(save_additional_info))
        .route("/enhance-explanation", post(enhance_explanation))
        .route("/analyze-image", post(analyze_image))
        .route("/upload-image", post(upload_image))
        .route("/structure-solution", post(structure_solution))
        .route("/enhance-structured-content", post(enhance_structured_content))
        .route("/generate-stack-analysis", post(generate_stack_analysis))
        .route("/update-solution-data", post(update_solution_data))
        .route("/save-layout", post(save_layout))
        .route("/next-solution", post(next_solution))
        .route("/switch-solution", post(switch_solution))
        .route("/delete-solution", post(delete_solution))
        .route("/get-session-info", post(get_session_info))
        .route("/get-solution-data", post(get_solution_data))
        .route("/save-session", post(save_session::<SolutionSession>))
        .route("/push-to-sow", post(push_to_sow))
        .route("/preview-html", post(preview_html).get(preview_html))
        .route("/preview-pdf", post(preview_pdf).get(preview_pdf))
        .route("/generate-pdf", post(generate_pdf).get(generate_pdf))
}

#[derive(Debug, Deserialize)]
struct BasicInfoRequest {
    #[serde(flatten)]
    session: SessionRef,
    #[serde(flatten)]
    basic: SolutionBasic,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AdditionalInfoRequest {
    session_id: Option<String>,
    image_link: String,
    explanation: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExplanationRequest {
    explanation: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ImageRequest {
    session_id: Option<String>,
    #[serde(alias = "imageData")]
    image: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnalysisRequest {
    session_id: Option<String>,
    ai_analysis: Option<String>,
    solution_explanation: Option<String>,
    image_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentRequest {
    title: String,
    steps: String,
    approach: String,
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    #[serde(flatten)]
    session: SessionRef,
    #[serde(flatten)]
    update: SolutionUpdate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LayoutRequest {
    session_id: Option<String>,
    layout: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SolutionNumberRequest {
    session_id: Option<String>,
    #[serde(alias = "targetSolution")]
    solution_number: Option<Value>,
}

fn required(session_id: Option<&str>) -> Result<&str, ApiError> {
    session_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::validation("Session ID is required"))
}

fn optional(session_id: Option<&str>) -> Option<&str> {
    session_id.map(str::trim).filter(|id| !id.is_empty())
}

/// Parse a solution number sent as a number or numeric string.
fn solution_number(value: Option<&Value>) -> Result<u32, ApiError> {
    value
        .and_then(crate::session::lenient::value_to_i64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ApiError::validation("Solution number is required"))
}

async fn new_session(State(state): State<AppState>) -> Json<Value> {
    let (session_id, session) = state.sessions.solutioning.create();
    Json(json!({ "success": true, "sessionId": session_id, "session": session }))
}

async fn save_basic_info(
    State(state): State<AppState>,
    Payload(req): Payload<BasicInfoRequest>,
) -> ApiResult<Json<Value>> {
    let id = req.session.require()?;
    state.sessions.solutioning.update(id, |s| {
        s.save_basic(req.basic);
        Ok(())
    })?;
    Ok(Json(json!({ "success": true, "message": "Basic information saved" })))
}

async fn save_additional_info(
    State(state): State<AppState>,
    Payload(req): Payload<AdditionalInfoRequest>,
) -> ApiResult<Json<Value>> {
    let id = required(req.session_id.as_deref())?;
    state.sessions.solutioning.update(id, |s| {
        s.save_additional(req.image_link, req.explanation);
        Ok(())
    })?;
    Ok(Json(json!({ "success": true, "message": "Additional information saved" })))
}

async fn enhance_explanation(
    State(state): State<AppState>,
    Payload(req): Payload<ExplanationRequest>,
) -> ApiResult<Json<Value>> {
    let enhanced = solutioning::enhance_explanation(state.ai.as_ref(), &req.explanation).await?;
    Ok(Json(json!({ "success": true, "enhanced_explanation": enhanced })))
}

async fn analyze_image(
    State(state): State<AppState>,
    Payload(req): Payload<ImageRequest>,
) -> ApiResult<Json<Value>> {
    let analysis = solutioning::analyze_image(state.ai.as_ref(), &req.image).await?;

    if let Some(id) = optional(req.session_id.as_deref()) {
        state.sessions.solutioning.update(id, |s| {
            s.save_image_data(req.image);
            s.current_mut().variables.ai_analysis = analysis.clone();
            Ok(())
        })?;
    }
    Ok(Json(json!({ "success": true, "analysis": analysis })))
}

async fn upload_image(
    State(state): State<AppState>,
    Payload(req): Payload<ImageRequest>,
) -> ApiResult<Json<Value>> {
    let client = state
        .imgbb
        .as_ref()
        .ok_or_else(|| ApiError::Internal("Image hosting is not configured (IMGBB_API_KEY)".into()))?;
    let url = client.upload(&req.image).await?;

    if let Some(id) = optional(req.session_id.as_deref()) {
        state.sessions.solutioning.update(id, |s| {
            let additional = &mut s.current_mut().additional;
            additional.image_link = url.clone();
            additional.image_data = req.image;
            Ok(())
        })?;
    }
    Ok(Json(json!({ "success": true, "url": url })))
}

async fn structure_solution(
    State(state): State<AppState>,
    Payload(req): Payload<AnalysisRequest>,
) -> ApiResult<Json<Value>> {
    let session_id = optional(req.session_id.as_deref());
    let current = match session_id {
        Some(id) => Some(state.sessions.solutioning.get(id)?),
        None => None,
    };

    // Texts missing from the request fall back to what the session holds.
    let variables = current.as_ref().map(|s| s.current().variables.clone()).unwrap_or_default();
    let ai_analysis = req.ai_analysis.unwrap_or(variables.ai_analysis);
    let explanation = req.solution_explanation.unwrap_or(variables.solution_explanation);

    let structured =
        solutioning::structure_solution(state.ai.as_ref(), &ai_analysis, &explanation).await?;

    if let Some(id) = session_id {
        let result = structured.clone();
        state.sessions.solutioning.update(id, move |s| {
            let solution = s.current_mut();
            solution.variables.ai_analysis = ai_analysis;
            solution.variables.solution_explanation = explanation;
            solution.structure.title = result.title;
            solution.structure.steps = result.steps;
            solution.structure.approach = result.approach;
            solution.structure.difficulty = result.difficulty;
            Ok(())
        })?;
    }

    Ok(Json(json!({
        "success": true,
        "title": structured.title,
        "steps": structured.steps,
        "approach": structured.approach,
        "difficulty": structured.difficulty,
    })))
}

async fn enhance_structured_content(
    State(state): State<AppState>,
    Payload(req): Payload<ContentRequest>,
) -> ApiResult<Json<Value>> {
    if req.title.trim().is_empty() && req.steps.trim().is_empty() && req.approach.trim().is_empty() {
        return Err(ApiError::validation("Title, steps or approach is required"));
    }
    let enhanced =
        solutioning::enhance_structured_content(state.ai.as_ref(), &req.title, &req.steps, &req.approach)
            .await;
    Ok(Json(json!({
        "success": true,
        "enhanced_title": enhanced.title,
        "enhanced_steps": enhanced.steps,
        "enhanced_approach": enhanced.approach,
    })))
}

async fn generate_stack_analysis(
    State(state): State<AppState>,
    Payload(req): Payload<AnalysisRequest>,
) -> ApiResult<Json<Value>> {
    let session_id = optional(req.session_id.as_deref());
    let current = match session_id {
        Some(id) => Some(state.sessions.solutioning.get(id)?.current().clone()),
        None => None,
    }
    .unwrap_or_default();

    let ai_analysis = req.ai_analysis.unwrap_or(current.variables.ai_analysis);
    let explanation = req.solution_explanation.unwrap_or(current.variables.solution_explanation);
    let image_link = req.image_link.unwrap_or(current.additional.image_link);

    let stack = solutioning::generate_stack_analysis(
        state.ai.as_ref(),
        &ai_analysis,
        &explanation,
        &image_link,
    )
    .await?;

    if let Some(id) = session_id {
        let stored = stack.clone();
        state.sessions.solutioning.update(id, move |s| {
            s.current_mut().structure.stack = stored;
            Ok(())
        })?;
    }
    Ok(Json(json!({ "success": true, "stack_analysis": stack })))
}

async fn update_solution_data(
    State(state): State<AppState>,
    Payload(req): Payload<UpdateRequest>,
) -> ApiResult<Json<Value>> {
    let id = req.session.require()?;
    let current = state.sessions.solutioning.update(id, |s| {
        s.update_current(req.update)?;
        Ok(s.current_number())
    })?;
    Ok(Json(json!({
        "success": true,
        "message": "Solution data updated",
        "current_solution": current,
    })))
}

async fn save_layout(
    State(state): State<AppState>,
    Payload(req): Payload<LayoutRequest>,
) -> ApiResult<Json<Value>> {
    let id = required(req.session_id.as_deref())?;
    let layout = req
        .layout
        .as_ref()
        .and_then(crate::session::lenient::value_to_i64)
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| ApiError::validation("Layout is required"))?;

    state.sessions.solutioning.update(id, |s| s.save_layout(layout))?;
    Ok(Json(json!({ "success": true, "layout": layout })))
}

async fn next_solution(
    State(state): State<AppState>,
    Payload(req): Payload<SessionRef>,
) -> ApiResult<Json<Value>> {
    let id = req.require()?;
    let (current, count) = state.sessions.solutioning.update(id, |s| Ok(s.next_solution()))?;
    Ok(Json(json!({
        "success": true,
        "current_solution": current,
        "solution_count": count,
    })))
}

async fn switch_solution(
    State(state): State<AppState>,
    Payload(req): Payload<SolutionNumberRequest>,
) -> ApiResult<Json<Value>> {
    let id = required(req.session_id.as_deref())?;
    let target = solution_number(req.solution_number.as_ref())?;
    let solution = state.sessions.solutioning.update(id, |s| {
        s.switch_to(target)?;
        Ok(s.current().clone())
    })?;
    Ok(Json(json!({
        "success": true,
        "current_solution": target,
        "data": solution,
    })))
}

async fn delete_solution(
    State(state): State<AppState>,
    Payload(req): Payload<SolutionNumberRequest>,
) -> ApiResult<Json<Value>> {
    let id = required(req.session_id.as_deref())?;
    let target = solution_number(req.solution_number.as_ref())?;
    let (current, total) = state.sessions.solutioning.update(id, |s| s.delete(target))?;
    Ok(Json(json!({
        "success": true,
        "current_solution": current,
        "new_total": total,
    })))
}

async fn get_session_info(
    State(state): State<AppState>,
    Payload(req): Payload<SessionRef>,
) -> ApiResult<Json<Value>> {
    let session = state.sessions.solutioning.get(req.require()?)?;
    let info = session.info();
    Ok(Json(json!({
        "success": true,
        "current_solution": info.current_solution,
        "total_solutions": info.total_solutions,
        "basic": info.basic,
    })))
}

async fn get_solution_data(
    State(state): State<AppState>,
    Payload(req): Payload<SolutionNumberRequest>,
) -> ApiResult<Json<Value>> {
    let session = state.sessions.solutioning.get(required(req.session_id.as_deref())?)?;
    let number = match req.solution_number.as_ref() {
        Some(_) => solution_number(req.solution_number.as_ref())?,
        None => session.current_number(),
    };
    let solution = session.get(number)?;
    Ok(Json(json!({
        "success": true,
        "solution_number": number,
        "data": solution,
    })))
}

async fn push_to_sow(
    State(state): State<AppState>,
    Payload(req): Payload<SessionRef>,
) -> ApiResult<Json<Value>> {
    let session = state.sessions.solutioning.get(req.require()?)?;
    let mut sow = pipeline::generate_sow(state.ai.as_ref(), &session).await?;
    sow.badge.row = session.badge.row;

    let sow_id = state.sessions.sow.insert(sow.clone());
    tracing::info!(sow_session = %sow_id, row = sow.badge.row, "Pushed solutioning to SoW");
    Ok(Json(json!({ "success": true, "sowSessionId": sow_id, "session": sow })))
}

fn render(state: &AppState, session: &SolutionSession) -> String {
    render_solutioning_html(&SolutioningDocument::from(session), &state.branding)
}

async fn preview_html(State(state): State<AppState>, SessionId(id): SessionId) -> ApiResult<Html<String>> {
    let session = state.sessions.solutioning.get(&id)?;
    Ok(Html(render(&state, &session)))
}

async fn pdf(state: &AppState, id: &str, delivery: Delivery) -> ApiResult<Response> {
    let session = state.sessions.solutioning.get(id)?;
    let bytes = state.pdf.convert(&render(state, &session)).await?;
    Ok(pdf_response(bytes, &file_name(&session.basic.title, "solution"), delivery))
}

async fn preview_pdf(State(state): State<AppState>, SessionId(id): SessionId) -> ApiResult<Response> {
    pdf(&state, &id, Delivery::Preview).await
}

async fn generate_pdf(State(state): State<AppState>, SessionId(id): SessionId) -> ApiResult<Response> {
    pdf(&state, &id, Delivery::Download).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_number_parsing() {
        assert_eq!(solution_number(Some(&json!(2))).unwrap(), 2);
        assert_eq!(solution_number(Some(&json!("3"))).unwrap(), 3);
        assert!(solution_number(Some(&json!(-1))).is_err());
        assert!(solution_number(None).is_err());
    }

    #[test]
    fn test_update_request_flattens_session_id() {
        let req: UpdateRequest = serde_json::from_value(json!({
            "sessionId": "abc",
            "title": "Pipeline",
            "difficulty": "70",
            "layout": 3,
            "aiAnalysis": "nodes"
        }))
        .unwrap();
        assert_eq!(req.session.require().unwrap(), "abc");
        assert_eq!(req.update.title.as_deref(), Some("Pipeline"));
        assert_eq!(req.update.layout, Some(3));
        assert_eq!(req.update.ai_analysis.as_deref(), Some("nodes"));
    }
}
