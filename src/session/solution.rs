//! Solutioning session: one or more diagrammed solutions under a shared header.
//!
//! On the wire each solution is a top-level `solution_N` key next to
//! `current_solution` and `solution_count`. In memory the solutions are kept
//! as a vector so that the keys are contiguous by construction.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::lenient::{string_lenient, value_to_i64};
use super::{Artifact, ArtifactKind, Badge, SessionError};

/// Highest selectable page layout.
pub const MAX_LAYOUT: u8 = 5;

/// Wire key for solution `n`.
pub fn solution_key(n: u32) -> String {
    format!("solution_{n}")
}

/// Header shared by every solution in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionBasic {
    /// Document date, usually `YYYY-MM-DD`
    #[serde(deserialize_with = "string_lenient")]
    pub date: String,

    /// Project title
    #[serde(deserialize_with = "string_lenient")]
    pub title: String,

    /// Client the document is prepared for
    #[serde(deserialize_with = "string_lenient")]
    pub recipient: String,

    /// Solutions engineer
    #[serde(deserialize_with = "string_lenient")]
    pub engineer: String,
}

/// User supplied inputs for a solution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Additional {
    /// Public URL of the uploaded diagram
    #[serde(deserialize_with = "string_lenient")]
    pub image_link: String,

    /// Inline diagram data (data URI or bare base64)
    #[serde(deserialize_with = "string_lenient")]
    pub image_data: String,

    /// Free-text explanation written by the engineer
    #[serde(deserialize_with = "string_lenient")]
    pub explanation: String,
}

/// AI generated and user refined texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Variables {
    #[serde(deserialize_with = "string_lenient")]
    pub ai_analysis: String,

    #[serde(deserialize_with = "string_lenient")]
    pub solution_explanation: String,
}

/// Structured form of a solution, rendered into the PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Structure {
    #[serde(deserialize_with = "string_lenient")]
    pub title: String,

    #[serde(deserialize_with = "string_lenient")]
    pub steps: String,

    #[serde(deserialize_with = "string_lenient")]
    pub approach: String,

    /// Estimated difficulty, 0..=100
    #[serde(deserialize_with = "difficulty_lenient")]
    pub difficulty: u8,

    /// Page layout, 1..=5
    #[serde(deserialize_with = "layout_lenient")]
    pub layout: u8,

    /// Technology stack analysis
    #[serde(deserialize_with = "string_lenient")]
    pub stack: String,
}

impl Default for Structure {
    fn default() -> Self {
        Self {
            title: String::new(),
            steps: String::new(),
            approach: String::new(),
            difficulty: 0,
            layout: 1,
            stack: String::new(),
        }
    }
}

/// Clamp a loosely typed difficulty into 0..=100.
pub(crate) fn coerce_difficulty(value: &Value) -> Option<u8> {
    value_to_i64(value).map(|n| n.clamp(0, 100) as u8)
}

pub(crate) fn difficulty_lenient<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_difficulty(&value).unwrap_or(0))
}

pub(crate) fn layout_lenient<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_i64(&value)
        .filter(|n| (1..=i64::from(MAX_LAYOUT)).contains(n))
        .map_or(1, |n| n as u8))
}

/// A single solution entry (`solution_N`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Solution {
    pub additional: Additional,
    pub variables: Variables,
    pub structure: Structure,
}

impl Solution {
    /// Whether the engineer has entered anything for this solution.
    pub fn is_blank(&self) -> bool {
        self.additional.explanation.trim().is_empty()
            && self.additional.image_link.trim().is_empty()
            && self.additional.image_data.trim().is_empty()
            && self.variables.ai_analysis.trim().is_empty()
            && self.variables.solution_explanation.trim().is_empty()
            && self.structure.title.trim().is_empty()
    }
}

/// Partial update of the current solution. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolutionUpdate {
    pub title: Option<String>,
    pub steps: Option<String>,
    pub approach: Option<String>,
    /// Number or numeric string; unparseable values are ignored
    pub difficulty: Option<Value>,
    pub layout: Option<u8>,
    pub stack: Option<String>,
    pub ai_analysis: Option<String>,
    pub solution_explanation: Option<String>,
}

/// Position summary returned to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionInfo {
    pub current_solution: u32,
    pub total_solutions: u32,
    pub basic: SolutionBasic,
}

/// In-progress solutioning document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionSession {
    pub badge: Badge,
    pub basic: SolutionBasic,
    current: u32,
    solutions: Vec<Solution>,
}

impl Default for SolutionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SolutionSession {
    /// Create a session with one empty solution.
    pub fn new() -> Self {
        Self { badge: Badge::new(), basic: SolutionBasic::default(), current: 1, solutions: vec![Solution::default()] }
    }

    /// Build a session from already prepared solutions. An empty list still
    /// yields one blank solution.
    pub fn from_solutions(basic: SolutionBasic, solutions: Vec<Solution>) -> Self {
        let mut session = Self { basic, ..Self::new() };
        if !solutions.is_empty() {
            session.solutions = solutions;
        }
        session
    }

    /// Number of solutions (`solution_count`).
    pub fn count(&self) -> u32 {
        self.solutions.len() as u32
    }

    /// One-based index of the solution being edited.
    pub fn current_number(&self) -> u32 {
        self.current
    }

    /// All solutions in order.
    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    /// The solution being edited.
    pub fn current(&self) -> &Solution {
        &self.solutions[self.current_index()]
    }

    /// Mutable access to the solution being edited.
    pub fn current_mut(&mut self) -> &mut Solution {
        let index = self.current_index();
        &mut self.solutions[index]
    }

    /// Solution `n` (one-based).
    pub fn get(&self, n: u32) -> Result<&Solution, SessionError> {
        self.check_range(n)?;
        Ok(&self.solutions[(n - 1) as usize])
    }

    pub fn save_basic(&mut self, basic: SolutionBasic) {
        self.basic = basic;
    }

    /// Record the diagram link and explanation of the current solution.
    pub fn save_additional(&mut self, image_link: impl Into<String>, explanation: impl Into<String>) {
        let additional = &mut self.current_mut().additional;
        additional.image_link = image_link.into();
        additional.explanation = explanation.into();
    }

    /// Attach inline image data to the current solution.
    pub fn save_image_data(&mut self, image_data: impl Into<String>) {
        self.current_mut().additional.image_data = image_data.into();
    }

    pub fn save_layout(&mut self, layout: u8) -> Result<(), SessionError> {
        validate_layout(layout)?;
        self.current_mut().structure.layout = layout;
        Ok(())
    }

    /// Apply an editor update to the current solution.
    pub fn update_current(&mut self, update: SolutionUpdate) -> Result<(), SessionError> {
        if let Some(layout) = update.layout {
            validate_layout(layout)?;
        }

        let solution = self.current_mut();
        let structure = &mut solution.structure;
        if let Some(title) = update.title {
            structure.title = title;
        }
        if let Some(steps) = update.steps {
            structure.steps = steps;
        }
        if let Some(approach) = update.approach {
            structure.approach = approach;
        }
        if let Some(difficulty) = update.difficulty.as_ref().and_then(coerce_difficulty) {
            structure.difficulty = difficulty;
        }
        if let Some(layout) = update.layout {
            structure.layout = layout;
        }
        if let Some(stack) = update.stack {
            structure.stack = stack;
        }
        if let Some(ai_analysis) = update.ai_analysis {
            solution.variables.ai_analysis = ai_analysis;
        }
        if let Some(explanation) = update.solution_explanation {
            solution.variables.solution_explanation = explanation;
        }
        Ok(())
    }

    /// Append an empty solution and make it current. Returns
    /// `(current_solution, solution_count)`.
    pub fn next_solution(&mut self) -> (u32, u32) {
        self.solutions.push(Solution::default());
        self.current = self.count();
        (self.current, self.count())
    }

    pub fn switch_to(&mut self, n: u32) -> Result<(), SessionError> {
        self.check_range(n)?;
        self.current = n;
        Ok(())
    }

    /// Remove solution `n`, shifting every later solution down one slot.
    /// Returns `(current_solution, solution_count)` after the removal.
    pub fn delete(&mut self, n: u32) -> Result<(u32, u32), SessionError> {
        if self.count() <= 1 {
            return Err(SessionError::LastSolution);
        }
        self.check_range(n)?;

        self.solutions.remove((n - 1) as usize);
        if self.current > n {
            self.current -= 1;
        } else if self.current == n {
            self.current = n.saturating_sub(1).max(1);
        }
        self.current = self.current.clamp(1, self.count());

        tracing::debug!(deleted = n, current = self.current, count = self.count(), "Deleted solution");
        Ok((self.current, self.count()))
    }

    pub fn info(&self) -> SolutionInfo {
        SolutionInfo {
            current_solution: self.current,
            total_solutions: self.count(),
            basic: self.basic.clone(),
        }
    }

    fn current_index(&self) -> usize {
        (self.current.clamp(1, self.count().max(1)) - 1) as usize
    }

    fn check_range(&self, n: u32) -> Result<(), SessionError> {
        if n == 0 || n > self.count() {
            return Err(SessionError::SolutionOutOfRange { requested: n, count: self.count() });
        }
        Ok(())
    }

    /// Rebuild a session from its wire map.
    ///
    /// `solution_N` keys are read in numeric order and compacted, so a
    /// document with gaps (`solution_1`, `solution_3`) loads as two
    /// contiguous solutions.
    fn from_map(mut map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let badge = match map.remove("badge") {
            Some(value) if !value.is_null() => serde_json::from_value(value)?,
            _ => Badge::new(),
        };
        let basic = match map.remove("basic") {
            Some(value) if !value.is_null() => serde_json::from_value(value)?,
            _ => SolutionBasic::default(),
        };
        let requested_current = map.get("current_solution").and_then(value_to_i64).unwrap_or(1);

        let mut numbered = BTreeMap::new();
        for (key, value) in map {
            let Some(n) = key.strip_prefix("solution_").and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            numbered.insert(n, serde_json::from_value::<Solution>(value)?);
        }

        let mut solutions: Vec<Solution> = numbered.into_values().collect();
        if solutions.is_empty() {
            solutions.push(Solution::default());
        }
        let count = solutions.len() as i64;

        Ok(Self { badge, basic, current: requested_current.clamp(1, count) as u32, solutions })
    }
}

fn validate_layout(layout: u8) -> Result<(), SessionError> {
    if !(1..=MAX_LAYOUT).contains(&layout) {
        return Err(SessionError::InvalidLayout { got: layout, max: MAX_LAYOUT });
    }
    Ok(())
}

impl Serialize for SolutionSession {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4 + self.solutions.len()))?;
        map.serialize_entry("badge", &self.badge)?;
        map.serialize_entry("basic", &self.basic)?;
        map.serialize_entry("current_solution", &self.current)?;
        map.serialize_entry("solution_count", &self.count())?;
        for (i, solution) in self.solutions.iter().enumerate() {
            map.serialize_entry(&solution_key(i as u32 + 1), solution)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SolutionSession {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(map).map_err(D::Error::custom)
    }
}

impl Artifact for SolutionSession {
    const KIND: ArtifactKind = ArtifactKind::Solutioning;

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
        &self.basic.recipient
    }
}
