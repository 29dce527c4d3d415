#![allow(dead_code)]
#![allow(clippy::format_push_string)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

//! # Nexa Studio
//!
//! Solution diagramming to Statement of Work to Level of Effort, with
//! AI-assisted structuring and PDF rendering.
//!
//! A solutions engineer diagrams one or more solutions, has the model
//! structure them, pushes the result into a Statement of Work and from
//! there into a Level of Effort estimate. Every artifact renders to a
//! branded PDF.
//!
//! ## Features
//!
//! - **Session documents**: in-memory solutioning, structuring, SoW, LoE and visuals sessions
//! - **Transformation pipeline**: diagram to solution to SoW to LoE, with lenient model reply parsing
//! - **Document chat**: per-session threads that discuss a rendered document and let the model edit its HTML
//! - **PDF rendering**: HTML templates converted by a local engine or a PDF service
//! - **Persistence**: every artifact of an engagement in one SQLite row
//! - **HTTP API**: axum endpoints for each step
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the API on 127.0.0.1:5000
//! OPENAI_API_KEY=sk-... nexa serve
//!
//! # Render an exported SoW without the server
//! nexa render sow sow.json -o sow.pdf
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::redundant_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::redundant_clone)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::use_self)]

pub mod ai;
pub mod core;
pub mod integrations;
pub mod pdf;
pub mod pipeline;
pub mod server;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use ai::{AIProvider, OpenAIProvider, TracedProvider};
pub use core::Config;
pub use pdf::{Branding, PdfConverter};
pub use server::AppState;
pub use session::{
    ArtifactKind, LoeSession, SessionStore, SolutionSession, SowSession, StructuringSession,
    VisualsSession,
};
pub use store::{SessionRepository, SqliteRepository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "nexa-studio";

/// Binary name
pub const BIN_NAME: &str = "nexa";
