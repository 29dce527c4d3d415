//! Structuring session: raw discovery content, pain points and a generated
//! solution outline.

use serde::{Deserialize, Serialize};

use super::lenient::{string_lenient, string_list_lenient};
use super::{Artifact, ArtifactKind, Badge};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuringBasic {
    #[serde(deserialize_with = "string_lenient")]
    pub title: String,

    #[serde(deserialize_with = "string_lenient")]
    pub client: String,

    #[serde(deserialize_with = "string_lenient")]
    pub date: String,
}

/// Model output of the pain point analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainPointAnalysis {
    /// Narrative analysis report
    #[serde(deserialize_with = "string_lenient")]
    pub report: String,

    #[serde(deserialize_with = "string_list_lenient")]
    pub pain_points: Vec<String>,
}

/// Model output of solution generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedSolution {
    /// HTML overview
    #[serde(deserialize_with = "string_lenient")]
    pub overview: String,

    #[serde(deserialize_with = "string_list_lenient")]
    pub solution_parts: Vec<String>,
}

impl GeneratedSolution {
    pub fn is_empty(&self) -> bool {
        self.overview.trim().is_empty() && self.solution_parts.iter().all(|p| p.trim().is_empty())
    }
}

/// In-progress structuring document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuringSession {
    pub badge: Badge,
    pub basic: StructuringBasic,

    /// Content tabs (transcripts, notes)
    #[serde(deserialize_with = "string_list_lenient")]
    pub content: Vec<String>,

    pub pain_points: PainPointAnalysis,

    /// Pain points as edited by the user, one per tab
    #[serde(deserialize_with = "string_list_lenient")]
    pub solution_tabs: Vec<String>,

    pub solution: GeneratedSolution,
}

impl StructuringSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blank content tabs joined by blank lines.
    pub fn combined_content(&self) -> String {
        join_non_blank(&self.content)
    }
}

/// Join the non-blank entries of `items` with blank lines.
pub(crate) fn join_non_blank(items: &[String]) -> String {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl Artifact for StructuringSession {
    const KIND: ArtifactKind = ArtifactKind::Structuring;

    fn badge(&self) -> &Badge {
        &self.badge
    }

    fn badge_mut(&mut self) -> &mut Badge {
        &mut self.badge
    }

    fn title(&self) -> &str {
        &self.basic.title
    }

    fn client(&self) -> &str {
        &self.basic.client
    }
}
