//! Transformation pipeline between session documents.
//!
//! Each step reads one artifact, optionally asks the model to fill in
//! generated content, and merges the reply into the next artifact:
//!
//! ```text
//! structuring ─┐
//!              ├─> solutioning ─> SoW ─> LoE
//! visuals ─────┘
//! ```
//!
//! Rendered documents can then be edited conversationally (`canvas`).
//!
//! Model replies are parsed leniently; when a reply cannot be parsed the
//! raw text is kept in a free-text field instead of failing the request.

pub mod canvas;
pub mod diagram;
pub mod extract;
pub mod loe;
mod prompts;
pub mod solutioning;
pub mod sow;
pub mod structuring;
pub mod visuals;

pub use diagram::{structuring_to_solution, visuals_to_solution};
pub use extract::{clean_sketch, parse_json_object, parse_string_list, ExtractError};
pub use loe::{compile_sow_brief, generate_loe};
pub use sow::{compile_solution_brief, generate_sow};

/// Pipeline error types.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    EmptyInput(String),

    #[error("AI request failed: {0}")]
    Ai(#[source] anyhow::Error),

    #[error("Invalid AI response: {0}")]
    InvalidReply(String),
}

impl PipelineError {
    pub(crate) fn empty(message: impl Into<String>) -> Self {
        Self::EmptyInput(message.into())
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(e: anyhow::Error) -> Self {
        Self::Ai(e)
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
