//! Conversions into a solutioning session. No model calls.

use super::{PipelineError, PipelineResult};
use crate::session::{
    Additional, Solution, SolutionBasic, SolutionSession, StructuringSession, Variables,
    VisualsSession,
};

fn first_non_blank<'a>(candidates: &[&'a str]) -> &'a str {
    candidates.iter().copied().find(|s| !s.trim().is_empty()).unwrap_or_default()
}

/// Turn every diagram that carries text into one solution.
///
/// The explanation is the planning text (or the ideation when there is no
/// plan), the analysis is the generated sketch. The result is a new artifact
/// with its own badge.
pub fn visuals_to_solution(visuals: &VisualsSession) -> PipelineResult<SolutionSession> {
    let solutions: Vec<Solution> = visuals
        .diagrams
        .iter()
        .filter(|d| d.has_text())
        .map(|diagram| {
            let explanation = first_non_blank(&[diagram.planning.as_str(), diagram.ideation.as_str()]).to_string();
            Solution {
                additional: Additional {
                    image_link: diagram.image_link.clone(),
                    image_data: String::new(),
                    explanation: explanation.clone(),
                },
                variables: Variables {
                    ai_analysis: diagram.sketch.clone(),
                    solution_explanation: explanation,
                },
                ..Default::default()
            }
        })
        .collect();

    if solutions.is_empty() {
        return Err(PipelineError::empty("No diagrams with content to convert"));
    }

    let basic = SolutionBasic {
        date: visuals.basic.date.clone(),
        title: visuals.basic.title.clone(),
        recipient: visuals.basic.client.clone(),
        engineer: String::new(),
    };
    tracing::info!(solutions = solutions.len(), "Converted diagrams to solutions");
    Ok(SolutionSession::from_solutions(basic, solutions))
}

/// Turn a generated structuring solution into a single-solution session.
pub fn structuring_to_solution(structuring: &StructuringSession) -> PipelineResult<SolutionSession> {
    let generated = &structuring.solution;
    if generated.is_empty() {
        return Err(PipelineError::empty("Generate a solution before pushing to solutioning"));
    }

    let mut sections = Vec::new();
    if !generated.overview.trim().is_empty() {
        sections.push(generated.overview.trim().to_string());
    }
    sections.extend(
        generated
            .solution_parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .enumerate()
            .map(|(i, part)| format!("{}. {part}", i + 1)),
    );
    let explanation = sections.join("\n\n");

    let solution = Solution {
        additional: Additional { explanation: explanation.clone(), ..Default::default() },
        variables: Variables { solution_explanation: explanation, ..Default::default() },
        ..Default::default()
    };
    let basic = SolutionBasic {
        date: structuring.basic.date.clone(),
        title: structuring.basic.title.clone(),
        recipient: structuring.basic.client.clone(),
        engineer: String::new(),
    };
    Ok(SolutionSession::from_solutions(basic, vec![solution]))
}
