//! Solutioning session to Statement of Work.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::extract::{parse_json_object, string_field};
use super::{prompts, PipelineError, PipelineResult};
use crate::ai::{AIProvider, ChatRequest};
use crate::session::lenient::value_to_string_list;
use crate::session::{Deliverable, Phase, SolutionSession, SowSession};

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Today's date as `YYYY-MM-DD`.
pub(crate) fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Flatten a solutioning session into labelled text lines for the model.
///
/// Empty fields are skipped and image data is never included.
pub fn compile_solution_brief(session: &SolutionSession) -> String {
    let basic = &session.basic;
    let mut sections = vec![
        format!("PROJECT: {}", or_placeholder(&basic.title, "Untitled Project")),
        format!("CLIENT: {}", or_placeholder(&basic.recipient, "Client TBD")),
        format!("ENGINEER: {}", or_placeholder(&basic.engineer, "Engineer TBD")),
        format!("DATE: {}", or_placeholder(&basic.date, "Date TBD")),
    ];

    for (i, solution) in session.solutions().iter().enumerate() {
        sections.push(format!("--- SOLUTION {} ---", i + 1));

        let structure = &solution.structure;
        let labelled = [
            ("EXPLANATION", solution.variables.solution_explanation.as_str()),
            ("AI ANALYSIS", solution.variables.ai_analysis.as_str()),
            ("TITLE", structure.title.as_str()),
            ("IMPLEMENTATION STEPS", structure.steps.as_str()),
            ("TECHNICAL APPROACH", structure.approach.as_str()),
            ("TECHNOLOGY STACK", structure.stack.as_str()),
        ];
        let explanation_fallback = solution.additional.explanation.trim();
        for (label, value) in labelled {
            let value = if label == "EXPLANATION" && value.trim().is_empty() {
                explanation_fallback
            } else {
                value.trim()
            };
            if !value.is_empty() {
                sections.push(format!("{label}: {value}"));
            }
        }
        if structure.difficulty > 0 {
            sections.push(format!("COMPLEXITY LEVEL: {}%", structure.difficulty));
        }
    }

    sections.join("\n\n")
}

/// Non-blank strings of a reply field.
pub(crate) fn list_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .map(value_to_string_list)
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Rows of a reply table; objects are decoded leniently, bare strings go
/// through `from_text`, anything else is dropped.
pub(crate) fn rows<T: DeserializeOwned>(value: Option<&Value>, from_text: impl Fn(String) -> T) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(_) => serde_json::from_value(item.clone()).ok(),
            Value::String(s) if !s.trim().is_empty() => Some(from_text(s.trim().to_string())),
            _ => None,
        })
        .collect()
}

/// Merge a parsed model reply into `sow`. Identity fields are left alone.
fn merge_reply(sow: &mut SowSession, map: &Map<String, Value>) {
    sow.project_purpose_background =
        string_field(map, "project_purpose_background").unwrap_or_default();
    sow.objectives = list_field(map, "objectives");
    sow.in_scope_deliverables = rows(map.get("in_scope_deliverables"), |text| Deliverable {
        deliverable: text,
        ..Default::default()
    });
    sow.out_of_scope = string_field(map, "out_of_scope").unwrap_or_default();
    sow.functional_requirements = list_field(map, "functional_requirements");
    sow.non_functional_requirements = list_field(map, "non_functional_requirements");

    let phases = match map.get("project_phases_timeline") {
        Some(Value::Object(timeline)) => timeline.get("phases"),
        Some(array @ Value::Array(_)) => Some(array),
        _ => map.get("phases"),
    };
    sow.project_phases_timeline.phases =
        rows(phases, |text| Phase { phase: text, ..Default::default() });
}

/// Generate a Statement of Work from a solutioning session.
///
/// Project, client, author and date always come from the solution. When the
/// reply is not a JSON object the whole reply becomes the background text.
pub async fn generate_sow(ai: &dyn AIProvider, session: &SolutionSession) -> PipelineResult<SowSession> {
    if session.solutions().iter().all(|s| s.is_blank()) {
        return Err(PipelineError::empty("Solutioning session has no content to convert"));
    }

    let brief = compile_solution_brief(session);
    let request =
        ChatRequest::prompt("generate_sow", Some(prompts::SOW_SYSTEM), prompts::generate_sow(&brief))
            .max_tokens(4000)
            .json();
    let reply = ai.chat(&request).await?;

    let basic = &session.basic;
    let mut sow = SowSession {
        project: basic.title.clone(),
        client: basic.recipient.clone(),
        prepared_by: basic.engineer.clone(),
        date: if basic.date.trim().is_empty() { today() } else { basic.date.clone() },
        ..SowSession::new()
    };

    match parse_json_object(&reply) {
        Ok(map) => merge_reply(&mut sow, &map),
        Err(e) => {
            tracing::warn!(error = %e, "SoW reply was not JSON, keeping raw text as background");
            sow.project_purpose_background = reply.trim().to_string();
        }
    }

    tracing::info!(
        objectives = sow.objectives.len(),
        deliverables = sow.in_scope_deliverables.len(),
        phases = sow.phases().len(),
        "Generated SoW"
    );
    Ok(sow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fake::ScriptedProvider;
    use crate::session::{SolutionBasic, SolutionUpdate};

    fn solution_session() -> SolutionSession {
        let mut session = SolutionSession::new();
        session.save_basic(SolutionBasic {
            date: "2024-05-01".into(),
            title: "Data Platform".into(),
            recipient: "Acme".into(),
            engineer: "Sam Rivera".into(),
        });
        session.save_additional("https://i.ibb.co/x.png", "Ingest then score");
        session.save_image_data("data:image/png;base64,SECRET");
        session
            .update_current(SolutionUpdate {
                title: Some("Lead Scoring".into()),
                difficulty: Some(serde_json::json!(45)),
                ..Default::default()
            })
            .unwrap();
        session
    }

    #[test]
    fn test_brief_lists_fields_and_skips_images() {
        let brief = compile_solution_brief(&solution_session());
        assert!(brief.starts_with("PROJECT: Data Platform\n\nCLIENT: Acme"));
        assert!(brief.contains("--- SOLUTION 1 ---"));
        assert!(brief.contains("EXPLANATION: Ingest then score"));
        assert!(brief.contains("TITLE: Lead Scoring"));
        assert!(brief.contains("COMPLEXITY LEVEL: 45%"));
        assert!(!brief.contains("TECHNICAL APPROACH"));
        assert!(!brief.contains("SECRET"));
    }

    #[test]
    fn test_brief_placeholders() {
        let brief = compile_solution_brief(&SolutionSession::new());
        assert!(brief.contains("PROJECT: Untitled Project"));
        assert!(brief.contains("ENGINEER: Engineer TBD"));
    }

    #[tokio::test]
    async fn test_generate_sow_merges_reply_and_keeps_identity() {
        let ai = ScriptedProvider::replying(&[r#"Here is the SoW:
        {
            "project": "Something Else",
            "project_purpose_background": "Acme needs scoring.",
            "objectives": ["Reduce manual review", ""],
            "in_scope_deliverables": [{"deliverable": "API", "key_features": "REST", "primary_artifacts": "Code"}, "Dashboard"],
            "out_of_scope": "Mobile",
            "functional_requirements": "Score every lead",
            "project_phases_timeline": {"phases": [{"phase": "Build", "key_activities": "Code", "weeks_start": "1", "weeks_end": 6}]}
        }"#]);

        let sow = generate_sow(&ai, &solution_session()).await.unwrap();
        assert_eq!(sow.project, "Data Platform");
        assert_eq!(sow.client, "Acme");
        assert_eq!(sow.prepared_by, "Sam Rivera");
        assert_eq!(sow.date, "2024-05-01");
        assert_eq!(sow.objectives, vec!["Reduce manual review"]);
        assert_eq!(sow.in_scope_deliverables.len(), 2);
        assert_eq!(sow.in_scope_deliverables[1].deliverable, "Dashboard");
        assert_eq!(sow.functional_requirements, vec!["Score every lead"]);
        assert_eq!(sow.phases()[0].weeks_display(), "1-6");
        assert_eq!(sow.badge.row, 0);
    }

    #[tokio::test]
    async fn test_generate_sow_keeps_unparseable_reply_as_background() {
        let ai = ScriptedProvider::replying(&["The project modernises lead scoring."]);
        let sow = generate_sow(&ai, &solution_session()).await.unwrap();
        assert_eq!(sow.project_purpose_background, "The project modernises lead scoring.");
        assert!(sow.objectives.is_empty());
        assert_eq!(sow.client, "Acme");
    }

    #[tokio::test]
    async fn test_generate_sow_propagates_ai_failure() {
        let ai = ScriptedProvider::failing("rate limited");
        let err = generate_sow(&ai, &solution_session()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Ai(_)));
    }

    #[tokio::test]
    async fn test_generate_sow_requires_content() {
        let ai = ScriptedProvider::default();
        let err = generate_sow(&ai, &SolutionSession::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput(_)));
    }
}
