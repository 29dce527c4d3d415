//! Discovery content to pain points to a proposed solution.

use serde_json::Value;

use super::extract::{parse_json_object, string_field};
use super::sow::list_field;
use super::{prompts, PipelineError, PipelineResult};
use crate::ai::{AIProvider, ChatRequest};
use crate::session::{join_non_blank, GeneratedSolution, PainPointAnalysis};

/// Identify pain points across the non-empty content tabs.
pub async fn analyze_pain_points(
    ai: &dyn AIProvider,
    content: &[String],
) -> PipelineResult<PainPointAnalysis> {
    let transcript = join_non_blank(content);
    if transcript.is_empty() {
        return Err(PipelineError::empty("All content tabs are empty"));
    }

    let request = ChatRequest::prompt(
        "analyze_pain_points",
        Some(prompts::PAIN_POINTS_SYSTEM),
        prompts::analyze_pain_points(&transcript),
    )
    .max_tokens(3000)
    .json();

    let reply = ai.chat(&request).await?;
    let map = parse_json_object(&reply).map_err(|e| PipelineError::InvalidReply(e.to_string()))?;

    let analysis = PainPointAnalysis {
        report: string_field(&map, "report").unwrap_or_default(),
        pain_points: list_field(&map, "pain_points"),
    };
    tracing::info!(pain_points = analysis.pain_points.len(), "Analyzed pain points");
    Ok(analysis)
}

/// Propose a solution for the selected pain points.
///
/// `content` and `report` are passed as given; callers substitute a single
/// space when the user opted out of sending them.
pub async fn generate_solution(
    ai: &dyn AIProvider,
    pain_points: &[String],
    content: &str,
    report: &str,
) -> PipelineResult<GeneratedSolution> {
    let joined = join_non_blank(pain_points);
    if joined.is_empty() {
        return Err(PipelineError::empty("Select at least one pain point"));
    }

    let request = ChatRequest::prompt(
        "generate_solution",
        Some(prompts::SOLUTION_SYSTEM),
        prompts::generate_solution(&joined, content, report),
    )
    .max_tokens(3000)
    .json();

    let reply = ai.chat(&request).await?;
    let map = parse_json_object(&reply).map_err(|e| PipelineError::InvalidReply(e.to_string()))?;

    let Some(Value::String(overview)) = map.get("overview") else {
        return Err(PipelineError::InvalidReply("missing overview".into()));
    };
    if !matches!(map.get("solution_parts"), Some(Value::Array(_))) {
        return Err(PipelineError::InvalidReply("missing solution_parts".into()));
    }

    Ok(GeneratedSolution {
        overview: overview.clone(),
        solution_parts: list_field(&map, "solution_parts"),
    })
}
