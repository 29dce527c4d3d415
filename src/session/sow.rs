//! Statement of Work session.

use serde::{Deserialize, Serialize};

use super::lenient::{string_lenient, string_list_lenient, u32_lenient};
use super::{Artifact, ArtifactKind, Badge};

/// Refinement window length used when no phase has an end week.
const DEFAULT_REFINEMENT_WEEKS: u32 = 10;

/// One row of the in-scope deliverables table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deliverable {
    #[serde(deserialize_with = "string_lenient")]
    pub deliverable: String,

    #[serde(deserialize_with = "string_lenient")]
    pub key_features: String,

    #[serde(deserialize_with = "string_lenient")]
    pub primary_artifacts: String,
}

impl Deliverable {
    /// Whether every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.deliverable.trim().is_empty()
            && self.key_features.trim().is_empty()
            && self.primary_artifacts.trim().is_empty()
    }
}

/// One row of the phases and timeline table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase {
    #[serde(deserialize_with = "string_lenient")]
    pub phase: String,

    #[serde(deserialize_with = "string_lenient")]
    pub key_activities: String,

    #[serde(deserialize_with = "u32_lenient")]
    pub weeks_start: u32,

    #[serde(deserialize_with = "u32_lenient")]
    pub weeks_end: u32,
}

impl Phase {
    /// Week range as shown in documents, e.g. `1-4`.
    pub fn weeks_display(&self) -> String {
        format!("{}-{}", self.weeks_start, self.weeks_end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeline {
    pub phases: Vec<Phase>,
}

/// In-progress Statement of Work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SowSession {
    pub badge: Badge,

    #[serde(deserialize_with = "string_lenient")]
    pub project: String,

    #[serde(deserialize_with = "string_lenient")]
    pub client: String,

    #[serde(deserialize_with = "string_lenient")]
    pub prepared_by: String,

    #[serde(deserialize_with = "string_lenient")]
    pub date: String,

    #[serde(deserialize_with = "string_lenient")]
    pub project_purpose_background: String,

    #[serde(deserialize_with = "string_list_lenient")]
    pub objectives: Vec<String>,

    pub in_scope_deliverables: Vec<Deliverable>,

    #[serde(deserialize_with = "string_lenient")]
    pub out_of_scope: String,

    #[serde(deserialize_with = "string_list_lenient")]
    pub functional_requirements: Vec<String>,

    #[serde(deserialize_with = "string_list_lenient")]
    pub non_functional_requirements: Vec<String>,

    pub project_phases_timeline: Timeline,
}

impl SowSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phases(&self) -> &[Phase] {
        &self.project_phases_timeline.phases
    }

    /// Real-time refinement window as `(midpoint, end)` weeks.
    ///
    /// The end is the latest phase end week (10 when no phase has one) and
    /// the midpoint is half of it, rounded down.
    pub fn refinement_window(&self) -> (u32, u32) {
        let end = self
            .phases()
            .iter()
            .map(|p| p.weeks_end)
            .filter(|&w| w > 0)
            .max()
            .unwrap_or(DEFAULT_REFINEMENT_WEEKS);
        (end / 2, end)
    }
}

impl Artifact for SowSession {
    const KIND: ArtifactKind = ArtifactKind::Sow;

    fn badge(&self) -> &Badge {
        &self.badge
    }

    fn badge_mut(&mut self) -> &mut Badge {
        &mut self.badge
    }

    fn title(&self) -> &str {
        &self.project
    }

    fn client(&self) -> &str {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn phase(start: u32, end: u32) -> Phase {
        Phase { phase: "P".into(), key_activities: String::new(), weeks_start: start, weeks_end: end }
    }

    #[test]
    fn test_weeks_display() {
        assert_eq!(phase(1, 4).weeks_display(), "1-4");
    }

    #[test]
    fn test_refinement_window_defaults_to_ten_weeks() {
        assert_eq!(SowSession::new().refinement_window(), (5, 10));
    }

    #[test]
    fn test_refinement_window_uses_latest_phase_end() {
        let mut sow = SowSession::new();
        sow.project_phases_timeline.phases = vec![phase(0, 3), phase(3, 9), phase(2, 7)];
        assert_eq!(sow.refinement_window(), (4, 9));
    }

    #[test]
    fn test_partial_document_deserializes() {
        let sow: SowSession = serde_json::from_value(json!({
            "project": "Data Platform",
            "objectives": "Ship it",
            "project_phases_timeline": {"phases": [{"phase": "Build", "weeks_start": "1", "weeks_end": 6}]}
        }))
        .unwrap();
        assert_eq!(sow.project, "Data Platform");
        assert_eq!(sow.objectives, vec!["Ship it"]);
        assert_eq!(sow.phases()[0].weeks_start, 1);
        assert!(sow.in_scope_deliverables.is_empty());
    }

    #[test]
    fn test_blank_deliverable() {
        assert!(Deliverable::default().is_blank());
        let d = Deliverable { deliverable: "API".into(), ..Default::default() };
        assert!(!d.is_blank());
    }
}
