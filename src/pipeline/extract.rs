//! Best-effort extraction of structured data from model replies.
//!
//! Models wrap JSON in prose or Markdown fences often enough that every
//! parser here tries the strict form first and then progressively looser
//! ones.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::session::lenient::{value_to_string, value_to_string_list};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)\s*```").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Extraction errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Model reply is empty")]
    Empty,

    #[error("No JSON object found in model reply")]
    NoObject,
}

/// Slice from the first `open` to the last `close`, inclusive.
fn outermost(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Candidate JSON snippets in order of preference.
fn candidates<'a>(text: &'a str, open: char, close: char) -> Vec<&'a str> {
    let mut out = vec![text];
    out.extend(CODE_FENCE.captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str()));
    if let Some(block) = outermost(text, open, close) {
        out.push(block);
    }
    out
}

/// Parse a JSON object out of a model reply.
///
/// Tries the whole text, then the contents of any Markdown code fence, then
/// the outermost `{...}` block.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>, ExtractError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }

    candidates(text, '{', '}')
        .into_iter()
        .find_map(|candidate| match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
        .ok_or(ExtractError::NoObject)
}

/// Parse a list of strings out of a model reply.
///
/// Accepts a JSON array (bare, fenced or embedded in prose) or an object
/// whose first array field holds the items. When nothing parses the trimmed
/// reply becomes a single item, so non-empty text never yields an empty list.
pub fn parse_string_list(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let parsed = candidates(text, '[', ']').into_iter().find_map(|candidate| {
        match serde_json::from_str::<Value>(candidate).ok()? {
            array @ Value::Array(_) => Some(array),
            Value::Object(map) => map.into_iter().map(|(_, v)| v).find(Value::is_array),
            _ => None,
        }
    });

    let items: Vec<String> = parsed
        .map(|value| {
            value_to_string_list(&value)
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if items.is_empty() {
        vec![text.to_string()]
    } else {
        items
    }
}

/// Read a field of a parsed reply as text. Missing and null fields are `None`.
pub fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).filter(|v| !v.is_null()).map(value_to_string)
}

/// Clean generated diagram markup so it can be embedded in XML.
///
/// Removes code fences and ampersands, unescapes quotes and collapses all
/// whitespace (including newlines) to single spaces.
pub fn clean_sketch(text: &str) -> String {
    let cleaned = text.replace("```", "").replace('&', "").replace("\\\"", "\"");
    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let map = parse_json_object(r#"{"title": "Pipeline", "difficulty": 40}"#).unwrap();
        assert_eq!(map["title"], "Pipeline");
    }

    #[test]
    fn test_parse_object_in_code_fence() {
        let reply = "Here you go:\n```json\n{\"title\": \"Fenced\"}\n```\nLet me know!";
        let map = parse_json_object(reply).unwrap();
        assert_eq!(map["title"], "Fenced");
    }

    #[test]
    fn test_parse_object_wrapped_in_prose() {
        let reply = "Sure! The SoW is {\"project\": \"Data Platform\", \"objectives\": [\"a\"]} as requested.";
        let map = parse_json_object(reply).unwrap();
        assert_eq!(map["project"], "Data Platform");
    }

    #[test]
    fn test_parse_object_failures() {
        assert!(matches!(parse_json_object("   "), Err(ExtractError::Empty)));
        assert!(matches!(parse_json_object("no json here"), Err(ExtractError::NoObject)));
        assert!(matches!(parse_json_object("[1, 2]"), Err(ExtractError::NoObject)));
    }

    #[test]
    fn test_parse_string_list_variants() {
        assert_eq!(parse_string_list(r#"["a", "b"]"#), vec!["a", "b"]);
        assert_eq!(parse_string_list("Assumptions:\n[\"x\", \" \", \"y\"]"), vec!["x", "y"]);
        assert_eq!(parse_string_list(r#"{"assumptions": ["one"]}"#), vec!["one"]);
    }

    #[test]
    fn test_unparseable_list_becomes_single_item() {
        assert_eq!(parse_string_list("  The client provides data access.  "), vec![
            "The client provides data access."
        ]);
        assert!(parse_string_list("").is_empty());
    }

    #[test]
    fn test_string_field() {
        let map = parse_json_object(r#"{"a": "x", "b": 3, "c": null}"#).unwrap();
        assert_eq!(string_field(&map, "a").as_deref(), Some("x"));
        assert_eq!(string_field(&map, "b").as_deref(), Some("3"));
        assert!(string_field(&map, "c").is_none());
        assert!(string_field(&map, "d").is_none());
    }

    #[test]
    fn test_clean_sketch() {
        let raw = "```xml\n<mxCell value=\\\"A & B\\\"/>\n\n  <mxCell/>```";
        assert_eq!(clean_sketch(raw), "xml <mxCell value=\"A B\"/> <mxCell/>");
    }
}
