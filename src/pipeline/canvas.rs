//! Conversational document editing.
//!
//! A quick chat turn answers the user and decides whether the document must
//! change; a maestro turn rewrites the document HTML for that instruction.
//! Both read the thread's conversation, which never contains HTML.

use serde::Serialize;
use serde_json::Value;

use super::extract::{parse_json_object, string_field};
use super::{prompts, PipelineError, PipelineResult};
use crate::ai::{AIProvider, ChatRequest};
use crate::session::lenient::value_to_string_list;
use crate::session::CanvasMessage;

/// Messages of the conversation replayed to the maestro.
const MAESTRO_CONTEXT_MESSAGES: usize = 10;

/// Longest message kept in the maestro context.
const MAESTRO_MESSAGE_LIMIT: usize = 10_000;

/// Characters of context passed as the summary.
const SUMMARY_CHARS: usize = 500;

/// Reply to a chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickshotReply {
    /// Whether the document should be edited
    pub maestro: bool,
    /// Edit instruction for the maestro turn
    pub message_to_maestro: Option<String>,
    pub chat_responses: Vec<String>,
}

impl QuickshotReply {
    /// Reply used when the model answer cannot be understood.
    pub fn fallback() -> Self {
        Self {
            maestro: false,
            message_to_maestro: None,
            chat_responses: vec![
                "I'm having trouble processing that request right now".to_string(),
                "Let me try to understand what you're looking for...".to_string(),
                "Could you rephrase that for me?".to_string(),
            ],
        }
    }

    /// Text recorded in the conversation for this reply.
    pub fn transcript(&self) -> String {
        self.chat_responses.join("\n")
    }
}

/// Result of a maestro turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaestroEdit {
    pub modified_template: String,
    pub explanation: String,
}

fn render_history<'a>(messages: impl Iterator<Item = &'a CanvasMessage>) -> String {
    messages.map(|m| format!("{}: {}", m.role.speaker(), m.content)).collect::<Vec<_>>().join("\n")
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Recent natural-language messages for the maestro, oldest first.
pub fn maestro_context(history: &[CanvasMessage]) -> String {
    let kept: Vec<&CanvasMessage> = history
        .iter()
        .filter(|m| {
            !m.content.contains("<html")
                && !m.content.contains("<!DOCTYPE")
                && m.content.len() < MAESTRO_MESSAGE_LIMIT
        })
        .collect();
    let skip = kept.len().saturating_sub(MAESTRO_CONTEXT_MESSAGES);
    render_history(kept.into_iter().skip(skip))
}

fn bool_field(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Answer a chat message and decide whether the document should change.
///
/// A reply that cannot be parsed yields [`QuickshotReply::fallback`].
pub async fn chat_turn(
    ai: &dyn AIProvider,
    history: &[CanvasMessage],
    input: &str,
) -> PipelineResult<QuickshotReply> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PipelineError::empty("Message must be a non-empty string"));
    }

    let summary = if history.is_empty() {
        String::new()
    } else {
        format!("{} messages in conversation", history.len())
    };
    let request = ChatRequest::prompt(
        "canvas_chat",
        Some(prompts::QUICKSHOT_SYSTEM),
        prompts::quickshot(&summary, &render_history(history.iter()), input),
    )
    .max_tokens(800)
    .temperature(0.7)
    .json();

    let reply = ai.chat(&request).await?;
    let Ok(map) = parse_json_object(&reply) else {
        tracing::warn!(chars = reply.len(), "Unparseable chat reply, using fallback");
        return Ok(QuickshotReply::fallback());
    };

    let chat_responses: Vec<String> = map
        .get("chat_responses")
        .map(value_to_string_list)
        .unwrap_or_default()
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
    if chat_responses.is_empty() {
        tracing::warn!("Chat reply has no chat_responses, using fallback");
        return Ok(QuickshotReply::fallback());
    }

    let maestro = bool_field(map.get("maestro"));
    let message_to_maestro = maestro.then(|| {
        string_field(&map, "message_to_maestro")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| input.to_string())
    });

    tracing::info!(maestro, responses = chat_responses.len(), "Chat turn completed");
    Ok(QuickshotReply { maestro, message_to_maestro, chat_responses })
}

/// Rewrite `template` according to `instruction`.
pub async fn maestro_turn(
    ai: &dyn AIProvider,
    history: &[CanvasMessage],
    template: &str,
    instruction: &str,
) -> PipelineResult<MaestroEdit> {
    if template.trim().is_empty() {
        return Err(PipelineError::empty("currentTemplate is required"));
    }
    if instruction.trim().is_empty() {
        return Err(PipelineError::empty("maestroInstruction is required"));
    }

    let context = maestro_context(history);
    let request = ChatRequest::prompt(
        "canvas_maestro",
        Some(prompts::MAESTRO_SYSTEM),
        prompts::maestro(truncate_chars(&context, SUMMARY_CHARS), &context, template, instruction),
    )
    .max_tokens(16_000)
    .temperature(0.3)
    .json();

    let reply = ai.chat(&request).await?;
    let edit = parse_edit(&reply)
        .ok_or_else(|| PipelineError::InvalidReply("missing modified_template".into()))?;

    tracing::info!(
        template_chars = template.len(),
        modified_chars = edit.modified_template.len(),
        "Maestro edit completed"
    );
    Ok(edit)
}

const DEFAULT_EXPLANATION: &str = "Document modified successfully";

/// Minimum size of HTML recovered by the field scanner.
const MIN_RECOVERED_HTML: usize = 100;

fn parse_edit(reply: &str) -> Option<MaestroEdit> {
    if let Ok(map) = parse_json_object(reply) {
        let html = string_field(&map, "modified_template").filter(|h| !h.trim().is_empty())?;
        let explanation = string_field(&map, "explanation")
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());
        return Some(MaestroEdit { modified_template: html, explanation });
    }

    tracing::warn!(chars = reply.len(), "Maestro reply is not valid JSON, scanning fields");
    let edit = scan_edit_fields(reply)?;
    let looks_like_html =
        edit.modified_template.contains("<html") || edit.modified_template.contains("<!DOCTYPE");
    (looks_like_html && edit.modified_template.len() >= MIN_RECOVERED_HTML).then_some(edit)
}

/// Index of the first unescaped `"` at or after `from`.
fn closing_quote(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Start of the string value following `key`.
fn value_start(text: &str, key: usize) -> Option<usize> {
    let colon = text[key..].find(':')? + key;
    let open = text[colon + 1..].find('"')? + colon + 1;
    Some(open + 1)
}

fn unescape(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut chars = fragment.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other @ ('"' | '\\' | '/')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Recover the two fields from a reply whose HTML broke the JSON, e.g. raw
/// newlines or unescaped quotes inside `modified_template`.
fn scan_edit_fields(text: &str) -> Option<MaestroEdit> {
    const TEMPLATE_KEY: &str = "\"modified_template\"";
    const EXPLANATION_KEY: &str = "\"explanation\"";

    let template_key = text.find(TEMPLATE_KEY)?;
    let explanation_key = text.find(EXPLANATION_KEY);
    let start = value_start(text, template_key + TEMPLATE_KEY.len())?;

    // The value runs to the last quote before the explanation key (or the
    // end of the object), so unescaped quotes inside the HTML are tolerated.
    let boundary = explanation_key.filter(|&k| k > start).unwrap_or(text.len());
    let end = text[start..boundary].rfind('"')? + start;
    let html = unescape(&text[start..end]);

    let explanation = explanation_key
        .and_then(|k| {
            let from = value_start(text, k + EXPLANATION_KEY.len())?;
            let to = closing_quote(text, from)?;
            Some(unescape(&text[from..to]).replace('\n', " "))
        })
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());

    Some(MaestroEdit { modified_template: html, explanation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fake::ScriptedProvider;
    use crate::session::CanvasRole;

    fn history(n: usize) -> Vec<CanvasMessage> {
        (0..n)
            .map(|i| {
                let role = if i % 2 == 0 { CanvasRole::User } else { CanvasRole::Assistant };
                CanvasMessage::new(role, format!("message {i}"))
            })
            .collect()
    }

    fn page(body: &str) -> String {
        format!("<!DOCTYPE html><html><head><style>body {{ color: #111; }}</style></head><body>{body}</body></html>")
    }

    #[tokio::test]
    async fn test_chat_turn_parses_decision() {
        let ai = ScriptedProvider::replying(&[r#"{"maestro": true, "message_to_maestro": "Shorten phases", "chat_responses": ["On it", "Compressing"]}"#]);
        let reply = chat_turn(&ai, &history(2), "Make the timeline aggressive").await.unwrap();
        assert!(reply.maestro);
        assert_eq!(reply.message_to_maestro.as_deref(), Some("Shorten phases"));
        assert_eq!(reply.transcript(), "On it\nCompressing");

        let request = ai.last_request();
        assert_eq!(request.label, "canvas_chat");
        assert!(request.json_mode);
        let prompt = request.messages[1].content.text();
        assert!(prompt.contains("User: message 0\nAssistant: message 1"));
        assert!(prompt.contains("2 messages in conversation"));
        assert!(prompt.contains("NEW MESSAGE: Make the timeline aggressive"));
    }

    #[tokio::test]
    async fn test_chat_turn_without_instruction_uses_input() {
        let ai = ScriptedProvider::replying(&[r#"{"maestro": "true", "message_to_maestro": null, "chat_responses": "Done"}"#]);
        let reply = chat_turn(&ai, &[], "Blue background").await.unwrap();
        assert_eq!(reply.message_to_maestro.as_deref(), Some("Blue background"));
        assert_eq!(reply.chat_responses, vec!["Done".to_string()]);
    }

    #[tokio::test]
    async fn test_chat_turn_falls_back_on_garbage() {
        let ai = ScriptedProvider::replying(&["Sure thing!"]);
        let reply = chat_turn(&ai, &[], "What is in this document?").await.unwrap();
        assert_eq!(reply, QuickshotReply::fallback());
        assert!(!reply.maestro);
    }

    #[tokio::test]
    async fn test_chat_turn_requires_message() {
        let ai = ScriptedProvider::default();
        assert!(matches!(chat_turn(&ai, &[], "   ").await, Err(PipelineError::EmptyInput(_))));
        assert!(ai.requests.lock().is_empty());
    }

    #[test]
    fn test_maestro_context_drops_html_and_keeps_last_ten() {
        let mut messages = history(14);
        messages.push(CanvasMessage::new(CanvasRole::Assistant, page("leaked")));
        messages.push(CanvasMessage::new(CanvasRole::User, "x".repeat(MAESTRO_MESSAGE_LIMIT)));

        let context = maestro_context(&messages);
        assert_eq!(context.lines().count(), 10);
        assert!(context.starts_with("User: message 4"));
        assert!(!context.contains("<html"));
    }

    #[tokio::test]
    async fn test_maestro_turn_parses_json() {
        let reply = serde_json::json!({"modified_template": page("<h1>Fast</h1>"), "explanation": "Compressed phases"}).to_string();
        let ai = ScriptedProvider::replying(&[reply.as_str()]);
        let edit = maestro_turn(&ai, &history(2), &page("<h1>Slow</h1>"), "Faster").await.unwrap();
        assert!(edit.modified_template.contains("<h1>Fast</h1>"));
        assert_eq!(edit.explanation, "Compressed phases");

        let request = ai.last_request();
        assert_eq!(request.temperature, Some(0.3));
        assert!(request.messages[1].content.text().contains("<h1>Slow</h1>"));
    }

    #[tokio::test]
    async fn test_maestro_turn_recovers_broken_json() {
        let html = page("<h1 class=\"title\">Accelerated</h1>\n<p>8 weeks</p>");
        let reply = format!("```json\n{{\"modified_template\": \"{html}\", \"explanation\": \"Tightened the \\\"timeline\\\"\"}}\n```");
        let ai = ScriptedProvider::replying(&[reply.as_str()]);

        let edit = maestro_turn(&ai, &[], &page("old"), "Faster").await.unwrap();
        assert_eq!(edit.modified_template, html);
        assert_eq!(edit.explanation, "Tightened the \"timeline\"");
    }

    #[tokio::test]
    async fn test_maestro_turn_rejects_reply_without_html() {
        let ai = ScriptedProvider::replying(&[r#"{"explanation": "nothing"}"#]);
        let err = maestro_turn(&ai, &[], &page("old"), "Faster").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidReply(_)));

        let ai = ScriptedProvider::replying(&[r#"{"modified_template": "<p>short" "#]);
        assert!(maestro_turn(&ai, &[], &page("old"), "Faster").await.is_err());
    }

    #[tokio::test]
    async fn test_maestro_turn_requires_inputs() {
        let ai = ScriptedProvider::default();
        assert!(matches!(maestro_turn(&ai, &[], " ", "Faster").await, Err(PipelineError::EmptyInput(_))));
        assert!(matches!(maestro_turn(&ai, &[], "<html></html>", "").await, Err(PipelineError::EmptyInput(_))));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"a\"b\\c\nd\q"#), "a\"b\\c\nd\\q");
    }
}
