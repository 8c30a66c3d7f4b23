//! Tolerant field decoders for model-emitted records.
//!
//! The model output is never schema-validated. A field of the wrong
//! shape decodes to its default instead of failing the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Text field: strings verbatim, numbers and booleans stringified, null empty.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_text(&Value::deserialize(d)?))
}

/// Numeric field: numbers or numeric strings (`"75"`, `"75%"`), else 0.
pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(value_to_number(&Value::deserialize(d)?).unwrap_or(0.0))
}

/// Whole percentage, rounded and clamped to 0..=100.
pub fn percentage<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = value_to_number(&Value::deserialize(d)?).unwrap_or(0.0);
    Ok(n.round().clamp(0.0, 100.0) as u32)
}

/// List of strings; non-text items are skipped.
pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .iter()
            .filter(|v| matches!(v, Value::String(_) | Value::Number(_)))
            .map(value_to_text)
            .collect(),
        _ => vec![],
    })
}

/// Parse an array leniently: skip items that fail to deserialize.
pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => vec![],
    })
}

/// Nested record; anything undecodable becomes the default record.
pub fn record<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(d)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn value_to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Fields {
        #[serde(deserialize_with = "text")]
        name: String,
        #[serde(deserialize_with = "number")]
        score: f64,
        #[serde(deserialize_with = "percentage")]
        weight: u32,
        #[serde(deserialize_with = "strings")]
        tags: Vec<String>,
        #[serde(deserialize_with = "list")]
        items: Vec<Item>,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    fn decode(json: &str) -> Fields {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn absent_fields_default() {
        assert_eq!(decode("{}"), Fields::default());
    }

    #[test]
    fn null_text_is_empty() {
        assert_eq!(decode(r#"{"name": null}"#).name, "");
    }

    #[test]
    fn number_text_is_stringified() {
        assert_eq!(decode(r#"{"name": 42}"#).name, "42");
    }

    #[test]
    fn numeric_strings_accepted() {
        let p = decode(r#"{"score": "75.5", "weight": "25%"}"#);
        assert_eq!(p.score, 75.5);
        assert_eq!(p.weight, 25);
    }

    #[test]
    fn garbage_number_is_zero() {
        let p = decode(r#"{"score": "high", "weight": -5}"#);
        assert_eq!(p.score, 0.0);
        assert_eq!(p.weight, 0);
    }

    #[test]
    fn oversized_weight_is_capped() {
        assert_eq!(decode(r#"{"weight": 3000000000}"#).weight, 100);
        assert_eq!(decode(r#"{"weight": "150%"}"#).weight, 100);
        assert_eq!(decode(r#"{"weight": 1e300}"#).weight, 100);
    }

    #[test]
    fn fractional_weight_rounds() {
        assert_eq!(decode(r#"{"weight": 24.6}"#).weight, 25);
    }

    #[test]
    fn strings_skip_objects() {
        let p = decode(r#"{"tags": ["a", {"x": 1}, 3, null]}"#);
        assert_eq!(p.tags, vec!["a".to_string(), "3".to_string()]);
    }

    #[test]
    fn non_array_list_is_empty() {
        assert!(decode(r#"{"tags": "a", "items": {"id": 1}}"#).items.is_empty());
    }

    #[test]
    fn list_skips_bad_items() {
        let p = decode(r#"{"items": [{"id": 1}, {"id": "x"}, {"id": 3}]}"#);
        assert_eq!(p.items, vec![Item { id: 1 }, Item { id: 3 }]);
    }
}
