//! Statement of Work to Level of Effort.

use serde_json::{Map, Value};

use super::extract::{parse_json_object, parse_string_list, string_field};
use super::sow::{list_field, rows, today};
use super::{prompts, PipelineError, PipelineResult};
use crate::ai::{AIProvider, ChatRequest};
use crate::session::{
    hours_to_weeks, Buffer, EffortOption, LoeBasic, LoeSession, Resource, SowSession, Workstream,
};

/// Flatten a Statement of Work into labelled text lines for the model.
pub fn compile_sow_brief(sow: &SowSession) -> String {
    let mut sections = vec![
        format!("PROJECT: {}", sow.project),
        format!("CLIENT: {}", sow.client),
        format!("ENGINEER: {}", sow.prepared_by),
        format!("DATE: {}", sow.date),
    ];
    let mut push = |label: &str, value: &str| {
        if !value.trim().is_empty() {
            sections.push(format!("{label}: {}", value.trim()));
        }
    };

    push("BACKGROUND", &sow.project_purpose_background);
    for objective in &sow.objectives {
        push("OBJECTIVE", objective);
    }
    for deliverable in &sow.in_scope_deliverables {
        push("DELIVERABLE", &deliverable.deliverable);
        push("FEATURES", &deliverable.key_features);
        push("ARTIFACTS", &deliverable.primary_artifacts);
    }
    push("OUT OF SCOPE", &sow.out_of_scope);
    for requirement in &sow.functional_requirements {
        push("FUNCTIONAL REQ", requirement);
    }
    for requirement in &sow.non_functional_requirements {
        push("NON-FUNCTIONAL REQ", requirement);
    }
    for phase in sow.phases() {
        if !phase.phase.trim().is_empty() {
            push("PHASE", &format!("{} (Week {})", phase.phase.trim(), phase.weeks_display()));
        }
        push("ACTIVITIES", &phase.key_activities);
    }

    sections.join("\n\n")
}

fn has_content(sow: &SowSession) -> bool {
    !sow.project_purpose_background.trim().is_empty()
        || sow.objectives.iter().any(|o| !o.trim().is_empty())
        || sow.in_scope_deliverables.iter().any(|d| !d.is_blank())
        || sow.functional_requirements.iter().any(|r| !r.trim().is_empty())
        || !sow.phases().is_empty()
}

fn options(map: &Map<String, Value>, camel: &str, snake: &str) -> Vec<EffortOption> {
    let mut options = rows(map.get(camel).or_else(|| map.get(snake)), |text| EffortOption {
        feature: text,
        ..Default::default()
    });
    for option in &mut options {
        if option.weeks == 0.0 && option.hours > 0 {
            option.weeks = hours_to_weeks(option.hours);
        }
    }
    options
}

fn merge_reply(loe: &mut LoeSession, map: &Map<String, Value>) {
    loe.overview = string_field(map, "overview").unwrap_or_default();
    loe.workstreams = rows(map.get("workstreams"), |text| Workstream {
        workstream: text,
        ..Default::default()
    });
    loe.resources = rows(map.get("resources"), |text| Resource { role: text, ..Default::default() });
    loe.buffer = map
        .get("buffer")
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value::<Buffer>(v.clone()).ok())
        .unwrap_or_default();
    loe.assumptions = list_field(map, "assumptions");
    loe.good_options = options(map, "goodOptions", "good_options");
    loe.best_options = options(map, "bestOptions", "best_options");
}

/// Generate a Level of Effort estimate from a Statement of Work.
///
/// The LoE identity (project, client, author, date) is always copied from the
/// SoW. A reply that is not a JSON object becomes the overview text, and the
/// assumptions fall back to the reply parsed as a list.
pub async fn generate_loe(ai: &dyn AIProvider, sow: &SowSession) -> PipelineResult<LoeSession> {
    if !has_content(sow) {
        return Err(PipelineError::empty("Statement of Work has no content to estimate"));
    }

    let brief = compile_sow_brief(sow);
    let request =
        ChatRequest::prompt("generate_loe", Some(prompts::LOE_SYSTEM), prompts::generate_loe(&brief))
            .max_tokens(4000)
            .json();
    let reply = ai.chat(&request).await?;

    let mut loe = LoeSession {
        basic: LoeBasic {
            project: sow.project.clone(),
            client: sow.client.clone(),
            prepared_by: sow.prepared_by.clone(),
            date: if sow.date.trim().is_empty() { today() } else { sow.date.clone() },
        },
        ..LoeSession::new()
    };

    match parse_json_object(&reply) {
        Ok(map) => merge_reply(&mut loe, &map),
        Err(e) => {
            tracing::warn!(error = %e, "LoE reply was not JSON, keeping raw text as overview");
            loe.overview = reply.trim().to_string();
            loe.assumptions = parse_string_list(&reply);
        }
    }

    let totals = loe.totals();
    tracing::info!(
        resources = loe.resources.len(),
        total_hours = totals.total_hours,
        "Generated LoE"
    );
    Ok(loe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fake::ScriptedProvider;
    use crate::session::{Deliverable, Phase};

    fn sow() -> SowSession {
        let mut sow = SowSession {
            project: "Data Platform".into(),
            client: "Acme".into(),
            prepared_by: "Sam Rivera".into(),
            date: "2024-05-01".into(),
            project_purpose_background: "Acme needs scoring.".into(),
            objectives: vec!["Reduce review time".into(), " ".into()],
            in_scope_deliverables: vec![Deliverable {
                deliverable: "API".into(),
                key_features: "REST".into(),
                primary_artifacts: String::new(),
            }],
            ..SowSession::new()
        };
        sow.project_phases_timeline.phases = vec![Phase {
            phase: "Build".into(),
            key_activities: "Code".into(),
            weeks_start: 1,
            weeks_end: 6,
        }];
        sow
    }

    #[test]
    fn test_sow_brief_lines() {
        let brief = compile_sow_brief(&sow());
        assert!(brief.contains("BACKGROUND: Acme needs scoring."));
        assert!(brief.contains("OBJECTIVE: Reduce review time"));
        assert!(brief.contains("DELIVERABLE: API\n\nFEATURES: REST"));
        assert!(!brief.contains("ARTIFACTS"));
        assert!(brief.contains("PHASE: Build (Week 1-6)\n\nACTIVITIES: Code"));
        assert_eq!(brief.matches("OBJECTIVE").count(), 1);
    }

    #[tokio::test]
    async fn test_generate_loe_keeps_sow_identity() {
        let ai = ScriptedProvider::replying(&[r#"{
            "basic": {"project": "Wrong", "client": "Wrong"},
            "overview": "Six weeks of build.",
            "workstreams": [{"workstream": "Backend", "activities": "API", "duration": 4}],
            "resources": [{"role": "Engineer", "personWeeks": "6", "personHours": 120}],
            "buffer": {"weeks": 1, "hours": "20"},
            "assumptions": ["Data access on day one"],
            "goodOptions": [{"feature": "Drop reporting", "hours": 30}],
            "bestOptions": [{"feature": "Mobile", "hours": 40, "weeks": 2}]
        }"#]);

        let loe = generate_loe(&ai, &sow()).await.unwrap();
        assert_eq!(loe.basic.project, "Data Platform");
        assert_eq!(loe.basic.client, "Acme");
        assert_eq!(loe.basic.prepared_by, "Sam Rivera");
        assert_eq!(loe.workstreams[0].duration, "4");
        assert_eq!(loe.resources[0].person_hours, 120);
        assert_eq!(loe.buffer.hours, 20);
        assert!((loe.good_options[0].weeks - 1.5).abs() < 1e-9);
        assert!((loe.best_options[0].weeks - 2.0).abs() < 1e-9);
        assert_eq!(loe.totals().total_hours, 140);
    }

    #[tokio::test]
    async fn test_generate_loe_unparseable_reply() {
        let ai = ScriptedProvider::replying(&["Roughly eight weeks with two engineers."]);
        let loe = generate_loe(&ai, &sow()).await.unwrap();
        assert_eq!(loe.overview, "Roughly eight weeks with two engineers.");
        assert_eq!(loe.assumptions, vec!["Roughly eight weeks with two engineers."]);
        assert_eq!(loe.basic.client, "Acme");
        assert!(loe.resources.is_empty());
    }

    #[tokio::test]
    async fn test_generate_loe_requires_content() {
        let ai = ScriptedProvider::default();
        let empty = SowSession { project: "Data Platform".into(), ..SowSession::new() };
        assert!(matches!(generate_loe(&ai, &empty).await, Err(PipelineError::EmptyInput(_))));
    }
}
