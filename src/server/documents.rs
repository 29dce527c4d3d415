//! Handlers shared by the form-style artifacts (SoW, LoE, structuring,
//! visuals): create, replace, fetch and persist a whole document.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::extract::{Payload, SessionRef};
use super::{ApiResult, AppState};
use crate::session::{
    Artifact, LoeSession, SessionMap, SessionStore, SolutionSession, SowSession, StructuringSession,
    VisualsSession,
};

/// An artifact with its own map in the [`SessionStore`].
pub trait Stored: Artifact {
    fn map(sessions: &SessionStore) -> &SessionMap<Self>;
}

impl Stored for SolutionSession {
    fn map(sessions: &SessionStore) -> &SessionMap<Self> {
        &sessions.solutioning
    }
}

impl Stored for SowSession {
    fn map(sessions: &SessionStore) -> &SessionMap<Self> {
        &sessions.sow
    }
}

impl Stored for LoeSession {
    fn map(sessions: &SessionStore) -> &SessionMap<Self> {
        &sessions.loe
    }
}

impl Stored for StructuringSession {
    fn map(sessions: &SessionStore) -> &SessionMap<Self> {
        &sessions.structuring
    }
}

impl Stored for VisualsSession {
    fn map(sessions: &SessionStore) -> &SessionMap<Self> {
        &sessions.visuals
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest<T> {
    #[serde(flatten)]
    reference: SessionRef,
    #[serde(alias = "data")]
    session: T,
}

pub async fn new_document<T: Stored>(State(state): State<AppState>) -> Json<Value> {
    let (session_id, session) = T::map(&state.sessions).create();
    Json(json!({ "success": true, "sessionId": session_id, "session": session }))
}

/// Replace the document. The stored badge is kept so that the row link and
/// glyph cannot be overwritten by the client.
pub async fn save_document<T: Stored>(
    State(state): State<AppState>,
    Payload(req): Payload<SaveRequest<T>>,
) -> ApiResult<Json<Value>> {
    let id = req.reference.require()?;
    let mut document = req.session;
    T::map(&state.sessions).update(id, |current| {
        *document.badge_mut() = current.badge().clone();
        *current = document;
        Ok(())
    })?;
    tracing::debug!(kind = %T::KIND, session_id = %id, "Document saved");
    Ok(Json(json!({ "success": true, "message": "Session updated" })))
}

pub async fn get_document<T: Stored>(
    State(state): State<AppState>,
    Payload(req): Payload<SessionRef>,
) -> ApiResult<Json<Value>> {
    let session = T::map(&state.sessions).get(req.require()?)?;
    Ok(Json(json!({ "success": true, "session": session })))
}

/// Persist the document and link it to its row.
pub async fn save_session<T: Stored>(
    State(state): State<AppState>,
    Payload(req): Payload<SessionRef>,
) -> ApiResult<Json<Value>> {
    let id = req.require()?;
    let session = T::map(&state.sessions).get(id)?;
    let inserted = !session.badge().is_saved();
    let (row, _) = state.persist(session).await?;
    T::map(&state.sessions).update(id, |s| {
        s.badge_mut().row = row;
        Ok(())
    })?;
    if inserted {
        tracing::info!(kind = %T::KIND, session_id = %id, row, "Session linked to new row");
    }
    Ok(Json(json!({ "success": true, "message": "Session saved", "row_id": row })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_request_accepts_data_alias() {
        let req: SaveRequest<SowSession> = serde_json::from_value(json!({
            "sessionId": "s1",
            "data": {"project": "Data Platform", "objectives": "Ship it"}
        }))
        .unwrap();
        assert_eq!(req.reference.require().unwrap(), "s1");
        assert_eq!(req.session.project, "Data Platform");
        assert_eq!(req.session.objectives, vec!["Ship it".to_string()]);
    }
}
