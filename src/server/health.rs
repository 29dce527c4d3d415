use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::AppState;

/// Service banner with the route groups.
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": crate::APP_NAME,
        "version": crate::VERSION,
        "endpoints": {
            "health": "/health",
            "solutioning": "/api/solutioning/*",
            "sow": "/api/sow/*",
            "loe": "/api/loe/*",
            "structuring": "/api/structuring/*",
            "visuals": "/api/visuals/*",
            "sessions": "/api/sessions",
            "generate_pdf": "/api/generate-pdf",
            "generate_solutioning_pdf": "/api/generate-solutioning-pdf",
            "generate_sow_pdf": "/api/generate-sow-pdf",
            "generate_loe_pdf": "/api/generate-loe-pdf",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": crate::APP_NAME,
        "active_sessions": state.sessions.total(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
