//! Recovery of a JSON object from free-form model output.
//!
//! Three steps, each exposed for testing:
//! 1. [`strip_code_fence`]: keep the first fenced segment, drop its language tag
//! 2. [`slice_outer_braces`]: first `{` through last `}`, inclusive
//! 3. parse; failures carry a truncated copy of the offending text

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::StructuringError;

const FENCE: &str = "```";

/// Characters of offending text kept in a `MalformedResponse`.
pub const SNIPPET_CHARS: usize = 500;

static LANGUAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_+.-]*").unwrap());

/// Decode the model's reply into a JSON value. No schema validation.
pub fn recover_json(raw: &str) -> Result<Value, StructuringError> {
    let unfenced = strip_code_fence(raw);
    let candidate = slice_outer_braces(unfenced)
        .ok_or_else(|| malformed("no JSON object found", unfenced))?;

    serde_json::from_str(candidate).map_err(|e| malformed(&e.to_string(), candidate))
}

/// When the reply opens with a code fence, return the first fenced
/// segment without its language tag. Otherwise return the input unchanged.
pub fn strip_code_fence(raw: &str) -> &str {
    let Some(rest) = raw.trim_start().strip_prefix(FENCE) else {
        return raw;
    };
    let segment = rest.split(FENCE).next().unwrap_or(rest);
    let untagged = match LANGUAGE_TAG.find(segment) {
        Some(tag) => &segment[tag.end()..],
        None => segment,
    };
    untagged.trim()
}

/// Substring from the first `{` to the last `}`, if both exist in order.
pub fn slice_outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn malformed(detail: &str, text: &str) -> StructuringError {
    let snippet: String = text.chars().take(SNIPPET_CHARS).collect();
    tracing::warn!(
        detail,
        response_chars = text.chars().count(),
        "Model response not recoverable as JSON"
    );
    StructuringError::MalformedResponse {
        detail: detail.to_string(),
        snippet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_json_with_language_tag() {
        let value = recover_json("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn commentary_around_object() {
        let value = recover_json("Sure! {\"a\":1} thanks").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn no_brace_pair_is_malformed() {
        let err = recover_json("I could not find any tender data.").unwrap_err();
        assert!(matches!(err, StructuringError::MalformedResponse { .. }));
    }

    #[test]
    fn braces_in_wrong_order_are_malformed() {
        assert!(slice_outer_braces("} nothing {").is_none());
        assert!(recover_json("} nothing {").is_err());
    }

    #[test]
    fn fence_without_tag() {
        assert_eq!(strip_code_fence("```\n{\"b\":2}\n```"), "{\"b\":2}");
    }

    #[test]
    fn unclosed_fence_keeps_remainder() {
        let value = recover_json("```json\n{\"c\": [1, 2]}").unwrap();
        assert_eq!(value, json!({"c": [1, 2]}));
    }

    #[test]
    fn only_first_fenced_segment_is_kept() {
        let raw = "```json\n{\"first\":true}\n```\nand also\n```json\n{\"second\":true}\n```";
        assert_eq!(recover_json(raw).unwrap(), json!({"first": true}));
    }

    #[test]
    fn unfenced_text_is_untouched() {
        assert_eq!(strip_code_fence("plain {\"x\":1}"), "plain {\"x\":1}");
    }

    #[test]
    fn nested_objects_survive_brace_scan() {
        let raw = "Result:\n{\"category_scores\": {\"technical\": {\"score\": 80}}}\nDone.";
        let value = recover_json(raw).unwrap();
        assert_eq!(value["category_scores"]["technical"]["score"], 80);
    }

    #[test]
    fn invalid_json_carries_snippet() {
        let err = recover_json("{\"supplier_name\": \"O'Brien, \"score\": }").unwrap_err();
        match err {
            StructuringError::MalformedResponse { snippet, detail } => {
                assert!(snippet.starts_with("{\"supplier_name\""));
                assert!(!detail.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn snippet_is_truncated() {
        let raw = format!("{{\"text\": \"{}", "x".repeat(2000));
        let raw = format!("{raw} }}");
        match recover_json(&raw).unwrap_err() {
            StructuringError::MalformedResponse { snippet, .. } => {
                assert_eq!(snippet.chars().count(), SNIPPET_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn leading_whitespace_before_fence() {
        assert_eq!(recover_json("\n  ```json\n{\"a\":1}\n```").unwrap(), json!({"a": 1}));
    }
}
