//! Visuals session: diagrams moving from ideation to planning to sketch.

use serde::{Deserialize, Serialize};

use super::lenient::string_lenient;
use super::{Artifact, ArtifactKind, Badge};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualsBasic {
    #[serde(deserialize_with = "string_lenient")]
    pub title: String,

    #[serde(deserialize_with = "string_lenient")]
    pub client: String,

    #[serde(deserialize_with = "string_lenient")]
    pub date: String,
}

/// One diagram and its generated texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagram {
    /// User ideation notes
    #[serde(deserialize_with = "string_lenient")]
    pub ideation: String,

    /// Generated diagram description
    #[serde(deserialize_with = "string_lenient")]
    pub planning: String,

    /// Generated diagram markup
    #[serde(deserialize_with = "string_lenient")]
    pub sketch: String,

    /// Public URL of the rendered diagram image
    #[serde(deserialize_with = "string_lenient")]
    pub image_link: String,
}

impl Diagram {
    /// Whether the diagram carries any text worth converting.
    pub fn has_text(&self) -> bool {
        !(self.ideation.trim().is_empty()
            && self.planning.trim().is_empty()
            && self.sketch.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualsSession {
    pub badge: Badge,
    pub basic: VisualsBasic,
    pub diagrams: Vec<Diagram>,
}

impl VisualsSession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Artifact for VisualsSession {
    const KIND: ArtifactKind = ArtifactKind::Visuals;

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
