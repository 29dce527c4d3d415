//! Level of Effort session and its derived totals.

use serde::{Deserialize, Serialize};

use super::lenient::{f64_lenient, i64_lenient, string_lenient, string_list_lenient};
use super::{Artifact, ArtifactKind, Badge};

/// Working hours in one person-week.
pub const HOURS_PER_WEEK: f64 = 20.0;

/// Identity block copied from the Statement of Work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoeBasic {
    #[serde(deserialize_with = "string_lenient")]
    pub project: String,

    #[serde(deserialize_with = "string_lenient")]
    pub client: String,

    #[serde(deserialize_with = "string_lenient")]
    pub prepared_by: String,

    #[serde(deserialize_with = "string_lenient")]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workstream {
    #[serde(deserialize_with = "string_lenient")]
    pub workstream: String,

    #[serde(deserialize_with = "string_lenient")]
    pub activities: String,

    /// Duration in weeks; free text so ranges like `2-3` survive
    #[serde(deserialize_with = "string_lenient")]
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resource {
    #[serde(deserialize_with = "string_lenient")]
    pub role: String,

    #[serde(deserialize_with = "f64_lenient")]
    pub person_weeks: f64,

    #[serde(deserialize_with = "i64_lenient")]
    pub person_hours: i64,
}

/// Contingency applied across all roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buffer {
    #[serde(deserialize_with = "f64_lenient")]
    pub weeks: f64,

    #[serde(deserialize_with = "i64_lenient")]
    pub hours: i64,
}

/// A feature removed (good option) or added (best option).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffortOption {
    #[serde(deserialize_with = "string_lenient")]
    pub feature: String,

    #[serde(deserialize_with = "i64_lenient")]
    pub hours: i64,

    #[serde(deserialize_with = "f64_lenient")]
    pub weeks: f64,
}

/// In-progress Level of Effort estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoeSession {
    pub badge: Badge,
    pub basic: LoeBasic,

    #[serde(deserialize_with = "string_lenient")]
    pub overview: String,

    pub workstreams: Vec<Workstream>,
    pub resources: Vec<Resource>,
    pub buffer: Buffer,

    #[serde(deserialize_with = "string_list_lenient")]
    pub assumptions: Vec<String>,

    #[serde(rename = "goodOptions")]
    pub good_options: Vec<EffortOption>,

    #[serde(rename = "bestOptions")]
    pub best_options: Vec<EffortOption>,
}

/// Figures derived from resources, buffer and options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoeTotals {
    pub total_weeks: f64,
    pub total_hours: i64,
    pub good_hours: i64,
    pub good_weeks: f64,
    pub good_adjusted_hours: i64,
    pub good_adjusted_weeks: f64,
    pub best_hours: i64,
    pub best_weeks: f64,
    pub best_adjusted_hours: i64,
    pub best_adjusted_weeks: f64,
}

/// Convert hours to person-weeks, rounded to one decimal.
pub fn hours_to_weeks(hours: i64) -> f64 {
    round1(hours as f64 / HOURS_PER_WEEK)
}

fn saturating_sum(hours: impl Iterator<Item = i64>) -> i64 {
    hours.fold(0, i64::saturating_add)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl LoeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute totals and adjusted estimates.
    ///
    /// Good options reduce the total, best options extend it. Hour sums
    /// saturate instead of overflowing on absurd model figures.
    pub fn totals(&self) -> LoeTotals {
        let total_weeks =
            self.resources.iter().map(|r| r.person_weeks).sum::<f64>() + self.buffer.weeks;
        let total_hours =
            saturating_sum(self.resources.iter().map(|r| r.person_hours)).saturating_add(self.buffer.hours);

        let good_hours = saturating_sum(self.good_options.iter().map(|o| o.hours));
        let best_hours = saturating_sum(self.best_options.iter().map(|o| o.hours));
        let good_adjusted_hours = total_hours.saturating_sub(good_hours);
        let best_adjusted_hours = total_hours.saturating_add(best_hours);

        LoeTotals {
            total_weeks: round1(total_weeks),
            total_hours,
            good_hours,
            good_weeks: hours_to_weeks(good_hours),
            good_adjusted_hours,
            good_adjusted_weeks: hours_to_weeks(good_adjusted_hours),
            best_hours,
            best_weeks: hours_to_weeks(best_hours),
            best_adjusted_hours,
            best_adjusted_weeks: hours_to_weeks(best_adjusted_hours),
        }
    }
}

impl Artifact for LoeSession {
    const KIND: ArtifactKind = ArtifactKind::Loe;

    fn badge(&self) -> &Badge {
        &self.badge
    }

    fn badge_mut(&mut self) -> &mut Badge {
        &mut self.badge
    }

    fn title(&self) -> &str {
        &self.basic.project
    }

    fn client(&self) -> &str {
        &self.basic.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> LoeSession {
        serde_json::from_value(json!({
            "basic": {"project": "Data Platform", "client": "Acme"},
            "resources": [
                {"role": "Engineer", "personWeeks": 10, "personHours": 400},
                {"role": "Designer", "personWeeks": "2.5", "personHours": "100"}
            ],
            "buffer": {"weeks": 1.5, "hours": 60},
            "goodOptions": [{"feature": "Reporting", "hours": 40}, {"feature": "SSO", "hours": 30}],
            "bestOptions": [{"feature": "Mobile app", "hours": 90}]
        }))
        .unwrap()
    }

    #[test]
    fn test_totals_include_buffer() {
        let totals = sample().totals();
        assert!((totals.total_weeks - 14.0).abs() < 1e-9);
        assert_eq!(totals.total_hours, 560);
    }

    #[test]
    fn test_option_adjustments() {
        let totals = sample().totals();
        assert_eq!(totals.good_hours, 70);
        assert!((totals.good_weeks - 3.5).abs() < 1e-9);
        assert_eq!(totals.good_adjusted_hours, 490);
        assert!((totals.good_adjusted_weeks - 24.5).abs() < 1e-9);

        assert_eq!(totals.best_hours, 90);
        assert!((totals.best_weeks - 4.5).abs() < 1e-9);
        assert_eq!(totals.best_adjusted_hours, 650);
        assert!((totals.best_adjusted_weeks - 32.5).abs() < 1e-9);
    }

    #[test]
    fn test_hours_to_weeks_rounds_to_one_decimal() {
        assert!((hours_to_weeks(33) - 1.7).abs() < 1e-9);
        assert!(hours_to_weeks(0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_session_totals_are_zero() {
        let totals = LoeSession::new().totals();
        assert_eq!(totals.total_hours, 0);
        assert_eq!(totals.best_adjusted_hours, 0);
    }

    #[test]
    fn test_oversized_hours_saturate() {
        let loe: LoeSession = serde_json::from_value(json!({
            "resources": [{"role": "Engineer", "personHours": 1e300}, {"role": "Lead", "personHours": "9e18"}],
            "buffer": {"hours": 60},
            "goodOptions": [{"feature": "Cut", "hours": -1e300}],
            "bestOptions": [{"feature": "Add", "hours": 40}]
        }))
        .unwrap();

        let totals = loe.totals();
        assert_eq!(totals.total_hours, i64::MAX);
        assert_eq!(totals.good_hours, i64::MIN);
        assert_eq!(totals.good_adjusted_hours, i64::MAX);
        assert_eq!(totals.best_adjusted_hours, i64::MAX);
        assert!(totals.best_adjusted_weeks > 0.0);
    }

    #[test]
    fn test_option_wire_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["goodOptions"].is_array());
        assert_eq!(json["resources"][0]["personHours"], 400);
        assert_eq!(json["basic"]["prepared_by"], "");
    }
}
