//! Persistence of session documents.
//!
//! All artifacts of one engagement share a row of `ai_architecture_sessions`,
//! one JSON column per artifact kind. A document's `badge.row` holds the row
//! id; 0 means it has never been saved.

mod sqlite;

use serde::Serialize;
use serde_json::Value;

use crate::session::{Artifact, ArtifactKind};

pub use sqlite::SqliteRepository;

/// Store error types.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session row {0} not found")]
    NotFound(i64),

    #[error("Background task failed: {0}")]
    Join(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A persisted row with every artifact saved into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoredSession {
    pub id: i64,
    pub title: String,
    pub client: String,
    pub session_objects: Option<Value>,
    pub sow_objects: Option<Value>,
    pub loe_objects: Option<Value>,
    pub structuring_json: Option<Value>,
    pub visual_assets_json: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredSession {
    /// The saved document for `kind`, if any.
    pub fn document(&self, kind: ArtifactKind) -> Option<&Value> {
        match kind {
            ArtifactKind::Solutioning => self.session_objects.as_ref(),
            ArtifactKind::Sow => self.sow_objects.as_ref(),
            ArtifactKind::Loe => self.loe_objects.as_ref(),
            ArtifactKind::Structuring => self.structuring_json.as_ref(),
            ArtifactKind::Visuals => self.visual_assets_json.as_ref(),
        }
    }

    /// Kinds that have a saved document, in workflow order.
    pub fn kinds(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL.into_iter().filter(|k| self.document(*k).is_some()).collect()
    }
}

/// Listing entry for a persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub id: i64,
    pub title: String,
    pub client: String,
    pub artifacts: Vec<ArtifactKind>,
    pub created_at: String,
    pub updated_at: String,
}

/// Storage backend for session documents. Calls block; async callers run
/// them on the blocking pool.
pub trait SessionRepository: Send + Sync {
    /// Upsert `document` into the column for `kind`.
    ///
    /// `row == 0` inserts a new row and returns its id. Otherwise the row
    /// must exist; its column, title, client and update time are rewritten.
    fn save(
        &self,
        kind: ArtifactKind,
        row: i64,
        title: &str,
        client: &str,
        document: &Value,
    ) -> StoreResult<i64>;

    fn load(&self, row: i64) -> StoreResult<StoredSession>;

    /// All rows, most recently updated first.
    fn list(&self) -> StoreResult<Vec<SessionSummary>>;

    fn delete(&self, row: i64) -> StoreResult<()>;
}

/// Save an artifact and write the resulting row id back into its badge.
pub fn save_artifact<T: Artifact>(repo: &dyn SessionRepository, artifact: &mut T) -> StoreResult<i64> {
    let document = serde_json::to_value(&*artifact)?;
    let row = repo.save(T::KIND, artifact.badge().row, artifact.title(), artifact.client(), &document)?;
    artifact.badge_mut().row = row;
    tracing::info!(kind = %T::KIND, row, "Saved session");
    Ok(row)
}

/// Load the saved artifact of type `T` from a row, if that column is set.
pub fn load_artifact<T: Artifact>(stored: &StoredSession) -> StoreResult<Option<T>> {
    let Some(document) = stored.document(T::KIND) else {
        return Ok(None);
    };
    let mut artifact: T = serde_json::from_value(document.clone())?;
    artifact.badge_mut().row = stored.id;
    Ok(Some(artifact))
}
