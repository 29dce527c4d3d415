//! Persisted session rows.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Map, Value};

use super::documents::Stored;
use super::{ApiResult, AppState};
use crate::session::{LoeSession, SolutionSession, SowSession, StructuringSession, VisualsSession};
use crate::store::{load_artifact, StoredSession};

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let sessions = state.with_repo(|repo| repo.list()).await?;
    Ok(Json(json!({ "success": true, "count": sessions.len(), "sessions": sessions })))
}

pub async fn load(State(state): State<AppState>, Path(row): Path<i64>) -> ApiResult<Json<Value>> {
    let stored = state.with_repo(move |repo| repo.load(row)).await?;
    Ok(Json(json!({ "success": true, "session": stored })))
}

pub async fn delete(State(state): State<AppState>, Path(row): Path<i64>) -> ApiResult<Json<Value>> {
    state.with_repo(move |repo| repo.delete(row)).await?;
    tracing::info!(row, "Deleted session row");
    Ok(Json(json!({ "success": true, "message": "Session deleted" })))
}

/// Load every artifact saved in a row into fresh in-memory sessions.
///
/// The response maps each artifact kind present in the row to its new
/// session id.
pub async fn open(State(state): State<AppState>, Path(row): Path<i64>) -> ApiResult<Json<Value>> {
    let stored = state.with_repo(move |repo| repo.load(row)).await?;

    let mut opened = Map::new();
    open_document::<SolutionSession>(&state, &stored, &mut opened)?;
    open_document::<SowSession>(&state, &stored, &mut opened)?;
    open_document::<LoeSession>(&state, &stored, &mut opened)?;
    open_document::<StructuringSession>(&state, &stored, &mut opened)?;
    open_document::<VisualsSession>(&state, &stored, &mut opened)?;

    tracing::info!(row, artifacts = opened.len(), "Opened saved session");
    Ok(Json(json!({
        "success": true,
        "row_id": row,
        "title": stored.title,
        "client": stored.client,
        "sessions": opened,
    })))
}

fn open_document<T: Stored>(
    state: &AppState,
    stored: &StoredSession,
    opened: &mut Map<String, Value>,
) -> ApiResult<()> {
    if let Some(document) = load_artifact::<T>(stored)? {
        let id = T::map(&state.sessions).insert(document);
        opened.insert(T::KIND.as_str().to_string(), Value::String(id));
    }
    Ok(())
}
