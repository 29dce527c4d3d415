//! Forgiving deserializers for documents written by people and by models.
//!
//! Numbers may arrive as JSON numbers or numeric strings; string lists may
//! arrive as arrays, single strings, objects carrying a `text` field or null.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce a JSON value into an `f64`, accepting numeric strings.
pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce a JSON value into an `i64`, rounding fractional numbers.
pub fn value_to_i64(value: &Value) -> Option<i64> {
    value_to_f64(value).filter(|n| n.is_finite()).map(|n| n.round() as i64)
}

/// Coerce a JSON value into a string, rendering scalars as text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => map
            .get("text")
            .or_else(|| map.get("value"))
            .map(value_to_string)
            .unwrap_or_else(|| value.to_string()),
        Value::Array(items) => {
            items.iter().map(value_to_string).collect::<Vec<_>>().join("\n")
        }
    }
}

/// Coerce a JSON value into a list of strings.
///
/// A bare string becomes a single-item list; blank items are kept so that
/// table rows stay aligned with the form that produced them.
pub fn value_to_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(value_to_string).collect(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        other => vec![value_to_string(other)],
    }
}

/// Deserialize an `f64` from a number, a numeric string or null (0.0).
pub fn f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).unwrap_or(0.0))
}

/// Deserialize an `i64` from a number, a numeric string or null (0).
pub fn i64_lenient<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_i64(&value).unwrap_or(0))
}

/// Deserialize a `u32` week count; negatives clamp to 0.
pub fn u32_lenient<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_i64(&value).map_or(0, |n| n.clamp(0, i64::from(u32::MAX)) as u32))
}

/// Deserialize a string from any scalar, treating null as empty.
pub fn string_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

/// Deserialize a list of strings from an array, a single string or null.
pub fn string_list_lenient<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string_list(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "f64_lenient")]
        hours: f64,
        #[serde(default, deserialize_with = "u32_lenient")]
        weeks: u32,
        #[serde(default, deserialize_with = "string_list_lenient")]
        items: Vec<String>,
        #[serde(default, deserialize_with = "string_lenient")]
        label: String,
    }

    #[test]
    fn test_numbers_from_strings() {
        let s: Sample =
            serde_json::from_value(json!({"hours": "12.5", "weeks": "4", "label": 3})).unwrap();
        assert!((s.hours - 12.5).abs() < f64::EPSILON);
        assert_eq!(s.weeks, 4);
        assert_eq!(s.label, "3");
    }

    #[test]
    fn test_null_and_garbage_numbers_default_to_zero() {
        let s: Sample = serde_json::from_value(json!({"hours": null, "weeks": "soon"})).unwrap();
        assert!(s.hours.abs() < f64::EPSILON);
        assert_eq!(s.weeks, 0);
    }

    #[test]
    fn test_negative_weeks_clamp() {
        let s: Sample = serde_json::from_value(json!({"weeks": -3})).unwrap();
        assert_eq!(s.weeks, 0);
    }

    #[test]
    fn test_single_string_becomes_list() {
        let s: Sample = serde_json::from_value(json!({"items": "only one"})).unwrap();
        assert_eq!(s.items, vec!["only one"]);
    }

    #[test]
    fn test_list_of_text_objects() {
        let s: Sample =
            serde_json::from_value(json!({"items": [{"text": "a"}, "b", 3]})).unwrap();
        assert_eq!(s.items, vec!["a", "b", "3"]);
    }

    #[test]
    fn test_percent_suffix_is_accepted() {
        assert_eq!(value_to_i64(&json!("75%")), Some(75));
        assert_eq!(value_to_i64(&json!(" 42 ")), Some(42));
        assert_eq!(value_to_i64(&json!(true)), None);
    }
}
