//! Session badge: creation time, persistence row and display glyph.

use serde::{Deserialize, Serialize};

/// Metadata block embedded in every session document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Creation timestamp (RFC 3339, UTC)
    #[serde(rename = "created-at", default)]
    pub created_at: String,

    /// Persistence row id; 0 until the session is first saved
    #[serde(default)]
    pub row: i64,

    /// Random token shown in document footers
    #[serde(default)]
    pub glyph: String,
}

impl Badge {
    /// Create a fresh, unsaved badge.
    pub fn new() -> Self {
        Self { created_at: chrono::Utc::now().to_rfc3339(), row: 0, glyph: generate_glyph() }
    }

    /// Whether the session has a persistence row.
    pub fn is_saved(&self) -> bool {
        self.row > 0
    }
}

impl Default for Badge {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate an 8 character uppercase glyph.
fn generate_glyph() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_ascii_uppercase()
}
