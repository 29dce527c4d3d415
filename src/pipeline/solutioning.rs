//! Model calls behind the solutioning editor.

use serde::Serialize;

use super::extract::{parse_json_object, string_field};
use super::{prompts, PipelineError, PipelineResult};
use crate::ai::{AIProvider, ChatMessage, ChatRequest};
use crate::session::coerce_difficulty;

/// Difficulty used when the model omits or garbles it.
pub const DEFAULT_DIFFICULTY: u8 = 50;

/// Structured form of a solution as produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredSolution {
    pub title: String,
    pub steps: String,
    pub approach: String,
    pub difficulty: u8,
}

/// HTML formatted title, steps and approach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedContent {
    pub title: String,
    pub steps: String,
    pub approach: String,
}

/// Turn an image reference into something the vision endpoint accepts.
///
/// URLs and data URIs pass through; bare base64 is wrapped as PNG.
fn image_url(image: &str) -> String {
    let image = image.trim();
    if image.starts_with("http://") || image.starts_with("https://") || image.starts_with("data:") {
        image.to_string()
    } else {
        format!("data:image/png;base64,{image}")
    }
}

/// Describe the nodes of a solution diagram.
pub async fn analyze_image(ai: &dyn AIProvider, image: &str) -> PipelineResult<String> {
    if image.trim().is_empty() {
        return Err(PipelineError::empty("No image provided for analysis"));
    }

    let request = ChatRequest::new(
        "analyze_image",
        vec![ChatMessage::user_with_image(prompts::IMAGE_ANALYSIS, image_url(image))],
    )
    .max_tokens(1000);

    let analysis = ai.chat(&request).await?;
    tracing::info!(chars = analysis.len(), "Received image analysis");
    Ok(analysis)
}

/// Rewrite an engineer's explanation in a more technical register.
pub async fn enhance_explanation(ai: &dyn AIProvider, text: &str) -> PipelineResult<String> {
    if text.trim().is_empty() {
        return Err(PipelineError::empty("No explanation provided"));
    }

    let request =
        ChatRequest::prompt("enhance_explanation", None, prompts::enhance_explanation(text))
            .max_tokens(1500);
    Ok(ai.chat(&request).await?)
}

/// Derive title, steps, approach and difficulty from the diagram analysis
/// and the explanation.
pub async fn structure_solution(
    ai: &dyn AIProvider,
    ai_analysis: &str,
    explanation: &str,
) -> PipelineResult<StructuredSolution> {
    if ai_analysis.trim().is_empty() && explanation.trim().is_empty() {
        return Err(PipelineError::empty("Analysis or explanation is required"));
    }

    let request = ChatRequest::prompt(
        "structure_solution",
        None,
        prompts::structure_solution(ai_analysis, explanation),
    )
    .max_tokens(1500)
    .json();

    let reply = ai.chat(&request).await?;
    let map = parse_json_object(&reply).map_err(|e| PipelineError::InvalidReply(e.to_string()))?;

    Ok(StructuredSolution {
        title: string_field(&map, "title").unwrap_or_default(),
        steps: string_field(&map, "steps").unwrap_or_default(),
        approach: string_field(&map, "approach").unwrap_or_default(),
        difficulty: map
            .get("difficulty")
            .and_then(coerce_difficulty)
            .unwrap_or(DEFAULT_DIFFICULTY),
    })
}

/// Add HTML formatting to the structured texts.
///
/// Never fails: any error, or any field missing from the reply, falls back
/// to the original text.
pub async fn enhance_structured_content(
    ai: &dyn AIProvider,
    title: &str,
    steps: &str,
    approach: &str,
) -> EnhancedContent {
    let original = EnhancedContent {
        title: title.to_string(),
        steps: steps.to_string(),
        approach: approach.to_string(),
    };

    let request = ChatRequest::prompt(
        "enhance_structured_content",
        None,
        prompts::enhance_structured_content(title, steps, approach),
    )
    .max_tokens(2000)
    .json();

    let reply = match ai.chat(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "Content enhancement failed, keeping original");
            return original;
        }
    };

    match parse_json_object(&reply) {
        Ok(map) => EnhancedContent {
            title: string_field(&map, "title").unwrap_or(original.title),
            steps: string_field(&map, "steps").unwrap_or(original.steps),
            approach: string_field(&map, "approach").unwrap_or(original.approach),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable enhancement reply, keeping original");
            original
        }
    }
}

/// Recommend tools and services for each node of the solution.
pub async fn generate_stack_analysis(
    ai: &dyn AIProvider,
    ai_analysis: &str,
    explanation: &str,
    image_link: &str,
) -> PipelineResult<String> {
    if ai_analysis.trim().is_empty() && explanation.trim().is_empty() {
        return Err(PipelineError::empty("Analysis or explanation is required"));
    }

    let request = ChatRequest::prompt(
        "generate_stack_analysis",
        Some(prompts::STACK_ANALYSIS_SYSTEM),
        prompts::stack_analysis(ai_analysis, explanation, image_link),
    )
    .max_tokens(1500)
    .temperature(0.3);

    Ok(ai.chat(&request).await?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ContentPart, MessageContent};
    use crate::pipeline::fake::ScriptedProvider;

    #[tokio::test]
    async fn test_analyze_image_wraps_bare_base64() {
        let ai = ScriptedProvider::replying(&["Gateway: routes requests"]);
        let analysis = analyze_image(&ai, "iVBORw0KGgo=").await.unwrap();
        assert_eq!(analysis, "Gateway: routes requests");

        let request = ai.last_request();
        assert_eq!(request.max_tokens, Some(1000));
        let MessageContent::Parts(parts) = &request.messages[0].content else {
            panic!("expected multi-part message");
        };
        assert!(matches!(
            &parts[1],
            ContentPart::ImageUrl { image_url } if image_url.url == "data:image/png;base64,iVBORw0KGgo="
        ));
    }

    #[tokio::test]
    async fn test_analyze_image_requires_input() {
        let ai = ScriptedProvider::default();
        assert!(matches!(analyze_image(&ai, " ").await, Err(PipelineError::EmptyInput(_))));
        assert!(ai.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_structure_solution_defaults_missing_fields() {
        let ai = ScriptedProvider::replying(&[r#"{"title": "Lead Scoring", "difficulty": "seventy"}"#]);
        let structured = structure_solution(&ai, "nodes", "explain").await.unwrap();
        assert_eq!(structured.title, "Lead Scoring");
        assert_eq!(structured.steps, "");
        assert_eq!(structured.difficulty, DEFAULT_DIFFICULTY);
        assert!(ai.last_request().json_mode);
    }

    #[tokio::test]
    async fn test_structure_solution_coerces_difficulty() {
        let ai = ScriptedProvider::replying(&[
            "```json\n{\"title\": \"T\", \"steps\": \"1. a\", \"approach\": \"b\", \"difficulty\": \"63\"}\n```",
        ]);
        let structured = structure_solution(&ai, "nodes", "explain").await.unwrap();
        assert_eq!(structured.difficulty, 63);
        assert_eq!(structured.steps, "1. a");
    }

    #[tokio::test]
    async fn test_structure_solution_rejects_non_json() {
        let ai = ScriptedProvider::replying(&["I cannot help with that"]);
        let err = structure_solution(&ai, "nodes", "explain").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidReply(_)));
    }

    #[tokio::test]
    async fn test_enhance_structured_content_falls_back_on_error() {
        let ai = ScriptedProvider::failing("upstream 500");
        let enhanced = enhance_structured_content(&ai, "Title", "Steps", "Approach").await;
        assert_eq!(enhanced.title, "Title");
        assert_eq!(enhanced.approach, "Approach");
    }

    #[tokio::test]
    async fn test_enhance_structured_content_merges_partial_reply() {
        let ai = ScriptedProvider::replying(&[r#"{"title": "<strong>Title</strong>"}"#]);
        let enhanced = enhance_structured_content(&ai, "Title", "Steps", "Approach").await;
        assert_eq!(enhanced.title, "<strong>Title</strong>");
        assert_eq!(enhanced.steps, "Steps");
    }

    #[tokio::test]
    async fn test_stack_analysis_uses_system_prompt() {
        let ai = ScriptedProvider::replying(&["  Gateway\n  - Recommended Stack: Kong  \n"]);
        let stack = generate_stack_analysis(&ai, "nodes", "explain", "").await.unwrap();
        assert_eq!(stack, "Gateway\n  - Recommended Stack: Kong");

        let request = ai.last_request();
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.messages.len(), 2);
    }
}
