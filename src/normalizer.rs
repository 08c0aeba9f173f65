//! Normalization of free-form model replies into [`PredictionResult`]s.
//!
//! Model output is untrusted text. The normalizer looks for a JSON object
//! between the first `{` and the last `}`, validates each field at runtime,
//! and falls back to a degraded result when no object can be decoded. It
//! never fails.

use crate::models::{ParsedCandidate, PredictionResult};
use serde_json::{Map, Value};

/// Longest interpretation kept on the degraded path, in characters.
pub const MAX_DEGRADED_CHARS: usize = 1000;

/// Only this many raw `lucky_numbers` elements are ever considered.
pub const MAX_LUCKY_NUMBERS: usize = 6;

/// Interpretation used when a candidate carries neither text field.
pub const NO_EXPLANATION: &str = "ไม่มีคำอธิบาย";

pub const UNKNOWN_CONFIDENCE: &str = "unknown";

/// Convert raw model text into a prediction, stamping `service` when given.
pub fn normalize(raw: &str, service: Option<&str>) -> PredictionResult {
    let service = service.map(str::to_string);

    match extract_candidate(raw) {
        Some(object) => from_candidate(object, service),
        None => degraded(raw, service),
    }
}

/// Decode the greedy `{ ... }` span of `raw` as a JSON object.
///
/// The span runs from the first `{` to the last `}`; braces are not balanced.
pub fn extract_candidate(raw: &str) -> Option<Map<String, Value>> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(object)) => Some(object),
        Ok(other) => {
            tracing::warn!("Model reply span decoded to a non-object: {}", other);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to decode JSON in model reply: {}", e);
            None
        }
    }
}

fn degraded(raw: &str, service: Option<String>) -> PredictionResult {
    tracing::debug!("No structured candidate found, returning degraded result");

    PredictionResult {
        interpretation: raw.chars().take(MAX_DEGRADED_CHARS).collect(),
        lucky_numbers: Vec::new(),
        confidence: UNKNOWN_CONFIDENCE.to_string(),
        service,
        raw: Value::String(raw.to_string()),
    }
}

fn from_candidate(object: Map<String, Value>, service: Option<String>) -> PredictionResult {
    let candidate = ParsedCandidate::from_object(&object);

    let interpretation = non_empty(candidate.interpretation)
        .or_else(|| non_empty(candidate.notes))
        .unwrap_or_else(|| NO_EXPLANATION.to_string());

    let lucky_numbers = candidate
        .lucky_numbers
        .as_deref()
        .map(coerce_lucky_numbers)
        .unwrap_or_default();

    let confidence =
        non_empty(candidate.confidence).unwrap_or_else(|| UNKNOWN_CONFIDENCE.to_string());

    PredictionResult {
        interpretation,
        lucky_numbers,
        confidence,
        service,
        raw: Value::Object(object),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Take the first six elements, coerce each to an integer, and drop zeros
/// and failures.
///
/// A drawn `0` is indistinguishable from a failed coercion and is dropped
/// too; callers rely on this.
pub fn coerce_lucky_numbers(values: &[Value]) -> Vec<i64> {
    values
        .iter()
        .take(MAX_LUCKY_NUMBERS)
        .filter_map(coerce_number)
        .filter(|n| *n != 0)
        .collect()
}

fn coerce_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_float)),
        Value::String(s) => digits_to_int(s),
        Value::Object(_) => None,
        other => digits_to_int(&string_form(other)),
    }
}

/// Truncate toward zero; values outside the `i64` range are dropped.
fn truncate_float(f: f64) -> Option<i64> {
    let t = f.trunc();
    (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
}

/// Loose string form of a JSON value: arrays join their elements with `,`,
/// nulls inside arrays become empty, objects read as `[object Object]`.
fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => string_form(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn digits_to_int(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_scenario_json_embedded_in_prose() {
        let raw = "Here is your reading:\n{\"interpretation\":\"ฝันดี\",\"lucky_numbers\":[12,34,56,78],\"confidence\":\"high\"}\nSweet dreams!";

        let result = normalize(raw, None);

        assert_eq!(result.interpretation, "ฝันดี");
        assert_eq!(result.lucky_numbers, vec![12, 34, 56, 78]);
        assert_eq!(result.confidence, "high");
        assert_eq!(result.service, None);
        assert_eq!(
            result.raw,
            json!({
                "interpretation": "ฝันดี",
                "lucky_numbers": [12, 34, 56, 78],
                "confidence": "high"
            })
        );
    }

    #[test]
    fn test_scenario_plain_text_degrades() {
        let result = normalize("error from model", Some("openai"));

        assert_eq!(
            result,
            PredictionResult {
                interpretation: "error from model".to_string(),
                lucky_numbers: vec![],
                confidence: "unknown".to_string(),
                service: Some("openai".to_string()),
                raw: json!("error from model"),
            }
        );
    }

    #[test]
    fn test_degraded_truncates_to_1000_chars() {
        let raw = "ฝ".repeat(1500);
        let result = normalize(&raw, None);

        assert_eq!(result.interpretation.chars().count(), 1000);
        assert_eq!(result.raw, Value::String(raw));
    }

    #[test]
    fn test_degraded_handles_empty_text() {
        let result = normalize("", None);
        assert_eq!(result.interpretation, "");
        assert!(result.lucky_numbers.is_empty());
        assert_eq!(result.confidence, "unknown");
    }

    #[test]
    fn test_invalid_json_span_degrades() {
        let raw = "{interpretation: not json}";
        let result = normalize(raw, None);

        assert_eq!(result.interpretation, raw);
        assert_eq!(result.confidence, "unknown");
        assert_eq!(result.raw, json!(raw));
    }

    #[test]
    fn test_closing_brace_before_opening_degrades() {
        let result = normalize("} then {", None);
        assert_eq!(result.interpretation, "} then {");
        assert_eq!(result.confidence, "unknown");
    }

    #[test]
    fn test_greedy_span_swallows_two_objects() {
        // First `{` through last `}` spans both objects, which is not valid JSON.
        let raw = r#"{"confidence":"low"} and {"confidence":"high"}"#;
        let result = normalize(raw, None);
        assert_eq!(result.confidence, "unknown");
        assert_eq!(result.interpretation, raw);
    }

    #[test]
    fn test_nested_object_is_decoded_whole() {
        let raw = r#"prefix {"interpretation":"x","meta":{"k":1}} suffix"#;
        let result = normalize(raw, None);
        assert_eq!(result.interpretation, "x");
        assert_eq!(result.raw["meta"]["k"], json!(1));
    }

    #[test]
    fn test_zero_is_dropped_and_order_kept() {
        let result = normalize(r#"{"lucky_numbers":[1,2,0,3]}"#, None);
        assert_eq!(result.lucky_numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let result = normalize(r#"{"lucky_numbers":[7,7,3]}"#, None);
        assert_eq!(result.lucky_numbers, vec![7, 7, 3]);
    }

    #[test]
    fn test_only_first_six_elements_are_considered() {
        let result = normalize(r#"{"lucky_numbers":[0,"x",3,4,5,6,7,8]}"#, None);
        // Two of the first six are dropped and the 7th and 8th never count.
        assert_eq!(result.lucky_numbers, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_eight_numbers_yield_at_most_six() {
        let result = normalize(r#"{"lucky_numbers":[11,22,33,44,55,66,77,88]}"#, None);
        assert_eq!(result.lucky_numbers, vec![11, 22, 33, 44, 55, 66]);
    }

    #[test]
    fn test_string_elements_are_coerced() {
        let result = normalize(
            r#"{"lucky_numbers":["45เด็ด","เลข 0 7","ไม่มี","",null,true,[1,2]]}"#,
            None,
        );
        assert_eq!(result.lucky_numbers, vec![45, 7]);
    }

    #[test]
    fn test_coerce_handles_nested_arrays_and_floats() {
        let values = vec![json!([1, 2]), json!(12.9), json!(0.4), json!(-5)];
        assert_eq!(coerce_lucky_numbers(&values), vec![12, 12, -5]);
    }

    #[test]
    fn test_object_elements_are_dropped() {
        let result = normalize(
            r#"{"lucky_numbers":[{"n":5},[{"a":7}],[{"a":7},3],[null,4]]}"#,
            None,
        );
        assert_eq!(result.lucky_numbers, vec![3, 4]);
    }

    #[test]
    fn test_coerce_drops_out_of_range_floats() {
        let values = vec![
            json!(1e30),
            json!(18446744073709551615u64),
            json!(-1e30),
            json!(42.5),
        ];
        assert_eq!(coerce_lucky_numbers(&values), vec![42]);
    }

    #[test]
    fn test_coerce_drops_overflowing_digit_runs() {
        let values = vec![json!("99999999999999999999999"), json!("21")];
        assert_eq!(coerce_lucky_numbers(&values), vec![21]);
    }

    #[test]
    fn test_non_array_lucky_numbers_become_empty() {
        let result = normalize(r#"{"interpretation":"x","lucky_numbers":"12 34"}"#, None);
        assert!(result.lucky_numbers.is_empty());
    }

    #[test]
    fn test_interpretation_falls_back_to_notes_then_placeholder() {
        let notes = normalize(r#"{"interpretation":"","notes":"ดูแลสุขภาพ"}"#, None);
        assert_eq!(notes.interpretation, "ดูแลสุขภาพ");

        let placeholder = normalize(r#"{"interpretation":5,"notes":""}"#, None);
        assert_eq!(placeholder.interpretation, NO_EXPLANATION);
    }

    #[test]
    fn test_confidence_passes_through_verbatim_or_unknown() {
        let custom = normalize(r#"{"confidence":"ค่อนข้างสูง"}"#, None);
        assert_eq!(custom.confidence, "ค่อนข้างสูง");

        let empty = normalize(r#"{"confidence":""}"#, None);
        assert_eq!(empty.confidence, "unknown");

        let numeric = normalize(r#"{"confidence":0.9}"#, None);
        assert_eq!(numeric.confidence, "unknown");
    }

    #[test]
    fn test_service_is_stamped() {
        let result = normalize(r#"{"interpretation":"x"}"#, Some("gemini"));
        assert_eq!(result.service.as_deref(), Some("gemini"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "",
            "no json here",
            r#"noise {"interpretation":"a","lucky_numbers":["1x",0,"9"],"confidence":"low"} noise"#,
            "{broken",
        ];
        for raw in inputs {
            assert_eq!(normalize(raw, Some("openai")), normalize(raw, Some("openai")));
        }
    }

    #[test]
    fn test_result_always_serializes() {
        let result = normalize("{\"lucky_numbers\":[\"\u{0}\"]}\u{FFFD}", None);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["lucky_numbers"].is_array());
        assert!(json["interpretation"].is_string());
    }
}
