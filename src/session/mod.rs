//! Session documents and the in-memory session store.
//!
//! Every artifact a user works on (solutioning, structuring, SoW, LoE,
//! visuals) lives in process memory as a serde document keyed by a generated
//! session id. Documents are persisted only on an explicit save.

mod badge;
mod canvas;
pub mod lenient;
mod loe;
mod solution;
mod sow;
mod store;
mod structuring;
mod visuals;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use badge::Badge;
pub use canvas::{
    CanvasMessage, CanvasRole, CanvasStore, CanvasThread, HtmlMetadata, HtmlSnapshot, MemoryStatus,
    ThreadSummary, MEMORY_TOKEN_BUDGET,
};
pub use loe::{
    hours_to_weeks, Buffer, EffortOption, LoeBasic, LoeSession, LoeTotals, Resource, Workstream,
    HOURS_PER_WEEK,
};
pub use solution::{
    solution_key, Additional, Solution, SolutionBasic, SolutionInfo, SolutionSession,
    SolutionUpdate, Structure, Variables, MAX_LAYOUT,
};
pub use sow::{Deliverable, Phase, SowSession, Timeline};
pub use store::{new_session_id, SessionMap, SessionStore};
pub(crate) use solution::{coerce_difficulty, difficulty_lenient, layout_lenient};
pub(crate) use structuring::join_non_blank;
pub use structuring::{GeneratedSolution, PainPointAnalysis, StructuringBasic, StructuringSession};
pub use visuals::{Diagram, VisualsBasic, VisualsSession};

/// The kinds of artifact a session can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Diagram-driven solution design
    Solutioning,
    /// Pain point analysis and solution generation
    Structuring,
    /// Statement of Work
    Sow,
    /// Level of Effort estimate
    Loe,
    /// Diagram planning and sketching
    Visuals,
}

impl ArtifactKind {
    /// All artifact kinds, in workflow order.
    pub const ALL: [Self; 5] =
        [Self::Structuring, Self::Visuals, Self::Solutioning, Self::Sow, Self::Loe];

    /// Short lowercase name used in routes and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solutioning => "solutioning",
            Self::Structuring => "structuring",
            Self::Sow => "sow",
            Self::Loe => "loe",
            Self::Visuals => "visuals",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solutioning" | "solution" => Ok(Self::Solutioning),
            "structuring" => Ok(Self::Structuring),
            "sow" => Ok(Self::Sow),
            "loe" => Ok(Self::Loe),
            "visuals" => Ok(Self::Visuals),
            other => Err(SessionError::UnknownKind(other.to_string())),
        }
    }
}

/// Common behaviour of every session document.
pub trait Artifact: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Which artifact this document is.
    const KIND: ArtifactKind;

    /// Metadata block carrying the persistence row.
    fn badge(&self) -> &Badge;

    /// Mutable access to the metadata block.
    fn badge_mut(&mut self) -> &mut Badge;

    /// Title stored alongside the row for listings.
    fn title(&self) -> &str;

    /// Client name stored alongside the row for listings.
    fn client(&self) -> &str;
}

/// Session error types.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Solution {requested} does not exist (session has {count})")]
    SolutionOutOfRange { requested: u32, count: u32 },

    #[error("Diagram {requested} does not exist (session has {count})")]
    DiagramOutOfRange { requested: usize, count: usize },

    #[error("Cannot delete the last remaining solution")]
    LastSolution,

    #[error("Layout must be between 1 and {max}, got {got}")]
    InvalidLayout { got: u8, max: u8 },

    #[error("Unknown session type: {0}")]
    UnknownKind(String),

    #[error("Invalid session document: {0}")]
    InvalidDocument(String),
}
