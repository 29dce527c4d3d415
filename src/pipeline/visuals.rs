//! Ideation to diagram description to draw.io sketch.

use std::time::Duration;

use super::extract::clean_sketch;
use super::{prompts, PipelineError, PipelineResult};
use crate::ai::{AIProvider, ChatRequest};

/// Describe how the diagram for an idea should be drawn.
pub async fn generate_planning(ai: &dyn AIProvider, ideation: &str) -> PipelineResult<String> {
    if ideation.trim().is_empty() {
        return Err(PipelineError::empty("Ideation content is required"));
    }

    let request = ChatRequest::prompt(
        "generate_planning",
        Some(prompts::DIAGRAM_SYSTEM),
        prompts::diagram_description(ideation),
    )
    .max_tokens(1500)
    .temperature(0.3);

    Ok(ai.chat(&request).await?.trim().to_string())
}

/// Turn a diagram description into draw.io markup.
///
/// Runs the configured assistant when there is one, otherwise asks the chat
/// model directly. Either way the reply is cleaned for embedding in XML.
pub async fn generate_sketch(
    ai: &dyn AIProvider,
    assistant_id: Option<&str>,
    timeout: Duration,
    planning: &str,
) -> PipelineResult<String> {
    if planning.trim().is_empty() {
        return Err(PipelineError::empty("Planning content is required"));
    }

    let raw = match assistant_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => ai.run_assistant(id, planning, timeout).await?,
        None => {
            tracing::debug!("No sketch assistant configured, using chat completion");
            let request =
                ChatRequest::prompt("generate_sketch", Some(prompts::SKETCH_SYSTEM), prompts::sketch(planning))
                    .max_tokens(4000);
            ai.chat(&request).await?
        }
    };

    let sketch = clean_sketch(&raw);
    if sketch.is_empty() {
        return Err(PipelineError::InvalidReply("empty sketch".into()));
    }
    Ok(sketch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fake::ScriptedProvider;

    #[tokio::test]
    async fn test_planning_settings() {
        let ai = ScriptedProvider::replying(&["  1. ALL NODES ...  "]);
        let planning = generate_planning(&ai, "An intake pipeline").await.unwrap();
        assert_eq!(planning, "1. ALL NODES ...");

        let request = ai.last_request();
        assert_eq!(request.max_tokens, Some(1500));
        assert_eq!(request.temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_sketch_uses_assistant_when_configured() {
        let ai = ScriptedProvider::replying(&["```xml\n<mxGraphModel>\n  <root/>\n</mxGraphModel>\n```"]);
        let sketch = generate_sketch(&ai, Some("asst_123"), Duration::from_secs(5), "Boxes and arrows")
            .await
            .unwrap();
        assert_eq!(sketch, "xml <mxGraphModel> <root/> </mxGraphModel>");

        let calls = ai.assistant_calls.lock();
        assert_eq!(calls[0], ("asst_123".to_string(), "Boxes and arrows".to_string()));
        assert!(ai.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_sketch_falls_back_to_chat() {
        let ai = ScriptedProvider::replying(&["<mxGraphModel/>"]);
        let sketch = generate_sketch(&ai, None, Duration::from_secs(5), "Boxes").await.unwrap();
        assert_eq!(sketch, "<mxGraphModel/>");
        assert!(ai.assistant_calls.lock().is_empty());
        assert_eq!(ai.last_request().label, "generate_sketch");
    }

    #[tokio::test]
    async fn test_sketch_requires_planning() {
        let ai = ScriptedProvider::default();
        assert!(matches!(
            generate_sketch(&ai, None, Duration::from_secs(5), "").await,
            Err(PipelineError::EmptyInput(_))
        ));
    }
}
