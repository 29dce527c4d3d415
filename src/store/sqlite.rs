//! SQLite backend.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

use super::{SessionRepository, SessionSummary, StoreError, StoreResult, StoredSession};
use crate::session::ArtifactKind;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS ai_architecture_sessions (\
    id INTEGER PRIMARY KEY AUTOINCREMENT,\
    title TEXT NOT NULL DEFAULT '',\
    client TEXT NOT NULL DEFAULT '',\
    session_objects TEXT,\
    sow_objects TEXT,\
    loe_objects TEXT,\
    structuring_json TEXT,\
    visual_assets_json TEXT,\
    created_at TEXT NOT NULL,\
    updated_at TEXT NOT NULL\
);\
CREATE INDEX IF NOT EXISTS idx_sessions_updated ON ai_architecture_sessions(updated_at);";

const COLUMNS: &str = "id, title, client, session_objects, sow_objects, loe_objects, \
    structuring_json, visual_assets_json, created_at, updated_at";

fn column(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Solutioning => "session_objects",
        ArtifactKind::Sow => "sow_objects",
        ArtifactKind::Loe => "loe_objects",
        ArtifactKind::Structuring => "structuring_json",
        ArtifactKind::Visuals => "visual_assets_json",
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Parse a stored JSON column. Corrupt values are logged and treated as
/// absent so one bad column does not hide the rest of the row.
fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Value>> {
    let text: Option<String> = row.get(idx)?;
    Ok(text.and_then(|t| match serde_json::from_str(&t) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(column = idx, error = %e, "Ignoring unreadable session column");
            None
        }
    }))
}

fn stored_from_row(row: &Row<'_>) -> rusqlite::Result<StoredSession> {
    Ok(StoredSession {
        id: row.get(0)?,
        title: row.get(1)?,
        client: row.get(2)?,
        session_objects: json_column(row, 3)?,
        sow_objects: json_column(row, 4)?,
        loe_objects: json_column(row, 5)?,
        structuring_json: json_column(row, 6)?,
        visual_assets_json: json_column(row, 7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Session repository on a single SQLite connection.
#[derive(Clone)]
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRepository").finish_non_exhaustive()
    }
}

impl SqliteRepository {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        tracing::debug!(path = %path.display(), "Opened session database");
        Self::with_connection(conn)
    }

    /// Private in-memory database.
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }
}

impl SessionRepository for SqliteRepository {
    fn save(
        &self,
        kind: ArtifactKind,
        row: i64,
        title: &str,
        client: &str,
        document: &Value,
    ) -> StoreResult<i64> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let column = column(kind);
        let timestamp = now();

        let id = if row > 0 {
            let updated = tx.execute(
                &format!(
                    "UPDATE ai_architecture_sessions SET {column} = ?1, title = ?2, client = ?3, updated_at = ?4 WHERE id = ?5"
                ),
                params![document.to_string(), title, client, timestamp, row],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound(row));
            }
            row
        } else {
            tx.execute(
                "INSERT INTO ai_architecture_sessions (title, client, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                params![title, client, timestamp],
            )?;
            let id = tx.last_insert_rowid();

            // The stored badge should already point at its own row.
            let mut document = document.clone();
            if let Some(badge) = document.get_mut("badge").and_then(Value::as_object_mut) {
                badge.insert("row".to_string(), Value::from(id));
            }
            tx.execute(
                &format!("UPDATE ai_architecture_sessions SET {column} = ?1 WHERE id = ?2"),
                params![document.to_string(), id],
            )?;
            id
        };

        tx.commit()?;
        Ok(id)
    }

    fn load(&self, row: i64) -> StoreResult<StoredSession> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM ai_architecture_sessions WHERE id = ?1"),
            params![row],
            stored_from_row,
        )
        .optional()?
        .ok_or(StoreError::NotFound(row))
    }

    fn list(&self) -> StoreResult<Vec<SessionSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM ai_architecture_sessions ORDER BY updated_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], stored_from_row)?;

        let mut summaries = Vec::new();
        for stored in rows {
            let stored = stored?;
            summaries.push(SessionSummary {
                artifacts: stored.kinds(),
                id: stored.id,
                title: stored.title,
                client: stored.client,
                created_at: stored.created_at,
                updated_at: stored.updated_at,
            });
        }
        Ok(summaries)
    }

    fn delete(&self, row: i64) -> StoreResult<()> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM ai_architecture_sessions WHERE id = ?1", params![row])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(row));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_then_update_same_row() {
        let repo = SqliteRepository::in_memory().unwrap();
        let doc = json!({"badge": {"row": 0, "glyph": "AB12CD34"}, "project": "P"});

        let row = repo.save(ArtifactKind::Sow, 0, "P", "Acme", &doc).unwrap();
        assert_eq!(row, 1);

        let stored = repo.load(row).unwrap();
        assert_eq!(stored.sow_objects.as_ref().unwrap()["badge"]["row"], 1);
        assert!(stored.loe_objects.is_none());

        let loe = json!({"basic": {"project": "P"}});
        assert_eq!(repo.save(ArtifactKind::Loe, row, "P2", "Acme", &loe).unwrap(), row);

        let stored = repo.load(row).unwrap();
        assert_eq!(stored.title, "P2");
        assert_eq!(stored.kinds(), vec![ArtifactKind::Sow, ArtifactKind::Loe]);
    }

    #[test]
    fn test_update_missing_row_fails_without_insert() {
        let repo = SqliteRepository::in_memory().unwrap();
        let err = repo.save(ArtifactKind::Sow, 42, "P", "C", &json!({})).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_and_delete() {
        let repo = SqliteRepository::in_memory().unwrap();
        let first = repo.save(ArtifactKind::Visuals, 0, "One", "A", &json!({})).unwrap();
        let second = repo.save(ArtifactKind::Structuring, 0, "Two", "B", &json!({})).unwrap();

        let listed = repo.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[0].artifacts, vec![ArtifactKind::Structuring]);

        repo.delete(first).unwrap();
        assert!(matches!(repo.load(first), Err(StoreError::NotFound(_))));
        assert!(matches!(repo.delete(first), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.db");
        let repo = SqliteRepository::open(&path).unwrap();
        repo.save(ArtifactKind::Sow, 0, "P", "C", &json!({})).unwrap();
        assert!(path.exists());
    }
}
