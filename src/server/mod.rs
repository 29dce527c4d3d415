//! HTTP API.
//!
//! Every operation is a JSON endpoint under `/api`. Session ids travel in
//! request bodies (or the `sessionId` query parameter for previews), and
//! every response carries a `success` flag.

mod canvas;
mod documents;
mod error;
mod extract;
mod health;
mod loe;
mod pdf_service;
mod sessions;
mod solutioning;
mod sow;
mod state;
mod structuring;
mod visuals;

use std::net::SocketAddr;

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use extract::{Payload, SessionId, SessionRef};
pub use state::AppState;

/// Build the application router.
///
/// An empty `cors_origins` list allows any origin.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .nest("/api/solutioning", solutioning::routes())
        .nest("/api/sow", sow::routes())
        .nest("/api/loe", loe::routes())
        .nest("/api/structuring", structuring::routes())
        .nest("/api/visuals", visuals::routes())
        .nest("/api/hyper-canvas", canvas::routes())
        .route("/api/sessions", get(sessions::list))
        .route("/api/sessions/{row}", get(sessions::load).delete(sessions::delete))
        .route("/api/sessions/{row}/open", post(sessions::open))
        .route("/api/generate-pdf", post(pdf_service::generate_pdf))
        .route("/api/generate-solutioning-pdf", post(pdf_service::generate_solutioning_pdf))
        .route("/api/generate-sow-pdf", post(pdf_service::generate_sow_pdf))
        .route("/api/generate-loe-pdf", post(pdf_service::generate_loe_pdf))
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr, cors_origins: &[String]) -> anyhow::Result<()> {
    let app = router(state, cors_origins);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Nexa Studio listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}

/// How a generated PDF is handed to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// `Content-Disposition: attachment`
    Download,
    /// `Content-Disposition: inline`
    Preview,
}

/// Wrap PDF bytes in a response with the right headers.
pub fn pdf_response(bytes: Vec<u8>, filename: &str, delivery: Delivery) -> Response {
    let disposition = match delivery {
        Delivery::Download => format!("attachment; filename=\"{filename}\""),
        Delivery::Preview => format!("inline; filename=\"{filename}\""),
    };
    (
        [(header::CONTENT_TYPE, "application/pdf".to_string()), (header::CONTENT_DISPOSITION, disposition)],
        bytes,
    )
        .into_response()
}

/// File name for a document: `stem` reduced to a safe character set plus
/// `suffix`, e.g. `Data_Platform_sow.pdf`.
pub fn file_name(stem: &str, suffix: &str) -> String {
    let mut cleaned = String::with_capacity(stem.len());
    for c in stem.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            cleaned.push(c);
        } else if !cleaned.ends_with('_') {
            cleaned.push('_');
        }
    }
    let cleaned = cleaned.trim_matches('_');
    let stem = if cleaned.is_empty() { "document" } else { cleaned };
    format!("{stem}_{suffix}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("Data Platform: Phase 1", "sow"), "Data_Platform_Phase_1_sow.pdf");
        assert_eq!(file_name("  ", "loe"), "document_loe.pdf");
        assert_eq!(file_name("Café/Ops", "solution"), "Caf_Ops_solution.pdf");
    }

    #[test]
    fn test_pdf_response_headers() {
        let response = pdf_response(b"%PDF".to_vec(), "a_sow.pdf", Delivery::Preview);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(headers[header::CONTENT_DISPOSITION], "inline; filename=\"a_sow.pdf\"");

        let response = pdf_response(Vec::new(), "a.pdf", Delivery::Download);
        assert!(response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().starts_with("attachment"));
    }
}
