//! Visuals endpoints: ideation to diagram planning to sketch.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::documents::{get_document, new_document, save_document, save_session};
use super::extract::{Payload, SessionRef};
use super::{ApiResult, AppState};
use crate::pipeline::{self, visuals};
use crate::session::{Diagram, SessionError, VisualsSession};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(new_document::<VisualsSession>))
        .route("/save", post(save_document::<VisualsSession>))
        .route("/get", post(get_document::<VisualsSession>))
        .route("/generate-planning", post(generate_planning))
        .route("/generate-sketch", post(generate_sketch))
        .route("/save-session", post(save_session::<VisualsSession>))
        .route("/push-to-solutioning", post(push_to_solutioning))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiagramRequest {
    #[serde(flatten)]
    session: SessionRef,
    #[serde(default)]
    diagram_index: usize,
    /// Overrides the stored ideation (planning) or planning (sketch) text
    #[serde(default)]
    text: Option<String>,
}

/// Diagram `index`. The list grows by at most one empty diagram, appended
/// when `index` equals the current length.
fn diagram_mut(session: &mut VisualsSession, index: usize) -> Result<&mut Diagram, SessionError> {
    let count = session.diagrams.len();
    if index > count {
        return Err(SessionError::DiagramOutOfRange { requested: index, count });
    }
    if index == count {
        session.diagrams.push(Diagram::default());
    }
    Ok(&mut session.diagrams[index])
}

/// Stored copy of diagram `index`; empty when it would be appended.
fn stored_diagram(session: &VisualsSession, index: usize) -> Result<Diagram, SessionError> {
    let count = session.diagrams.len();
    match session.diagrams.get(index) {
        Some(diagram) => Ok(diagram.clone()),
        None if index == count => Ok(Diagram::default()),
        None => Err(SessionError::DiagramOutOfRange { requested: index, count }),
    }
}

async fn generate_planning(
    State(state): State<AppState>,
    Payload(req): Payload<DiagramRequest>,
) -> ApiResult<Json<Value>> {
    let id = req.session.require()?;
    let index = req.diagram_index;
    let stored = stored_diagram(&state.sessions.visuals.get(id)?, index)?;
    let ideation = req.text.unwrap_or(stored.ideation);

    let planning = visuals::generate_planning(state.ai.as_ref(), &ideation).await?;

    let stored = planning.clone();
    state.sessions.visuals.update(id, move |s| {
        let diagram = diagram_mut(s, index)?;
        diagram.ideation = ideation;
        diagram.planning = stored;
        Ok(())
    })?;
    Ok(Json(json!({ "success": true, "diagramIndex": index, "planning": planning })))
}

async fn generate_sketch(
    State(state): State<AppState>,
    Payload(req): Payload<DiagramRequest>,
) -> ApiResult<Json<Value>> {
    let id = req.session.require()?;
    let index = req.diagram_index;
    let stored = stored_diagram(&state.sessions.visuals.get(id)?, index)?;
    let planning = req.text.unwrap_or(stored.planning);

    let sketch = visuals::generate_sketch(
        state.ai.as_ref(),
        state.assistant_id.as_deref(),
        state.assistant_timeout,
        &planning,
    )
    .await?;

    let stored = sketch.clone();
    state.sessions.visuals.update(id, move |s| {
        let diagram = diagram_mut(s, index)?;
        diagram.planning = planning;
        diagram.sketch = stored;
        Ok(())
    })?;
    Ok(Json(json!({ "success": true, "diagramIndex": index, "sketch": sketch })))
}

async fn push_to_solutioning(
    State(state): State<AppState>,
    Payload(req): Payload<SessionRef>,
) -> ApiResult<Json<Value>> {
    let visuals = state.sessions.visuals.get(req.require()?)?;
    let mut session = pipeline::visuals_to_solution(&visuals)?;
    session.badge.row = visuals.badge.row;

    let solutioning_id = state.sessions.solutioning.insert(session.clone());
    tracing::info!(
        solutioning_session = %solutioning_id,
        solutions = session.count(),
        "Pushed visuals to solutioning"
    );
    Ok(Json(json!({
        "success": true,
        "solutioningSessionId": solutioning_id,
        "session": session,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_mut_appends_one() {
        let mut session = VisualsSession::new();
        diagram_mut(&mut session, 0).unwrap().ideation = "first".into();
        diagram_mut(&mut session, 1).unwrap().ideation = "second".into();
        assert_eq!(session.diagrams.len(), 2);

        diagram_mut(&mut session, 0).unwrap().planning = "plan".into();
        assert_eq!(session.diagrams.len(), 2);
        assert_eq!(session.diagrams[0].planning, "plan");
    }

    #[test]
    fn test_diagram_index_past_end_is_rejected() {
        let mut session = VisualsSession::new();
        for index in [2, usize::MAX] {
            let err = diagram_mut(&mut session, index).unwrap_err();
            assert!(matches!(err, SessionError::DiagramOutOfRange { count: 0, .. }));
            assert!(stored_diagram(&session, index).is_err());
        }
        assert!(session.diagrams.is_empty());
        assert_eq!(stored_diagram(&session, 0).unwrap(), Diagram::default());
    }
}
