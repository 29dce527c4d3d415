//! PDF rendering.
//!
//! Each artifact has an HTML template filled from its session document. The
//! finished HTML is handed to a [`PdfConverter`], either a local engine
//! reading HTML on stdin or a remote PDF service.

mod converter;
mod html;
mod loe;
mod solutioning;
mod sow;

pub use converter::{converter_from_config, CommandConverter, PdfConverter, ServiceConverter};
pub use html::{escape_html, format_display_date, format_weeks, interpolate, strip_data_uri, Branding};
pub use loe::render_loe_html;
pub use solutioning::{render_solutioning_html, SolutioningDocument, SolutioningPage};
pub use sow::render_sow_html;

use serde_json::Value;

use crate::session::{ArtifactKind, LoeSession, SessionError, SolutionSession, SowSession};

/// PDF error types.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("PDF engine not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to start PDF engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF engine exited with status {status}: {stderr}")]
    EngineFailed { status: i32, stderr: String },

    #[error("PDF engine produced no output")]
    EmptyOutput,

    #[error("PDF conversion timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PDF service error ({status}): {message}")]
    Service { status: u16, message: String },
}

/// Render a stored or exported document of `kind` to HTML.
///
/// Solutioning accepts either the session wire format (`solution_N` keys)
/// or the renderer input with a `solutions` array. Structuring and visuals
/// have no document template.
pub fn render_document_html(
    kind: ArtifactKind,
    document: Value,
    branding: &Branding,
) -> Result<String, SessionError> {
    let invalid = |e: serde_json::Error| SessionError::InvalidDocument(e.to_string());
    match kind {
        ArtifactKind::Solutioning => {
            let document = if document.get("solutions").is_some_and(Value::is_array) {
                serde_json::from_value::<SolutioningDocument>(document).map_err(invalid)?
            } else {
                let session: SolutionSession = serde_json::from_value(document).map_err(invalid)?;
                SolutioningDocument::from(&session)
            };
            Ok(render_solutioning_html(&document, branding))
        }
        ArtifactKind::Sow => {
            let sow: SowSession = serde_json::from_value(document).map_err(invalid)?;
            Ok(render_sow_html(&sow, branding))
        }
        ArtifactKind::Loe => {
            let loe: LoeSession = serde_json::from_value(document).map_err(invalid)?;
            Ok(render_loe_html(&loe, branding))
        }
        ArtifactKind::Structuring | ArtifactKind::Visuals => {
            Err(SessionError::UnknownKind(format!("{kind} has no document template")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_document_html_by_kind() {
        let branding = Branding::new("Dry Ground AI");

        let html = render_document_html(
            ArtifactKind::Sow,
            json!({"project": "Data Platform", "client": "Acme"}),
            &branding,
        )
        .unwrap();
        assert!(html.contains("Data Platform"));

        let session = json!({
            "basic": {"title": "Pipeline", "recipient": "Acme"},
            "current_solution": 1,
            "solution_count": 1,
            "solution_1": {"structure": {"title": "Ingest", "layout": 2}}
        });
        let html = render_document_html(ArtifactKind::Solutioning, session, &branding).unwrap();
        assert!(html.contains("Ingest"));

        let exported = json!({"basic": {"title": "Pipeline"}, "solutions": [{"title": "Score"}]});
        let html = render_document_html(ArtifactKind::Solutioning, exported, &branding).unwrap();
        assert!(html.contains("Score"));

        assert!(render_document_html(ArtifactKind::Visuals, json!({}), &branding).is_err());
    }
}
